use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, ToSchema)]
pub enum Role {
    None,
    Student,
    Admin,
}

impl Role {
    /// Indicates whether a user with this role can manage course content.
    pub fn can_manage_courses(self) -> bool {
        self >= Role::Admin
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::None
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::None => write!(f, "none"),
            Role::Student => write!(f, "student"),
            Role::Admin => write!(f, "admin"),
        }
    }
}
