use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::User;
use crate::role::Role;
use crate::security::CredentialVerifier;

#[derive(Clone, Deserialize, ToSchema)]
pub struct UserSignupData {
    pub name: String,
    #[schema(format = "email")]
    pub mail_id: String,
    #[schema(format = "password")]
    pub password: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl std::fmt::Debug for UserSignupData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserSignupData:{}", self.mail_id)
    }
}

impl UserSignupData {
    pub fn into_user(
        self,
        verifier: &dyn CredentialVerifier,
        admin_mail_ids: impl AsRef<[String]>,
    ) -> User {
        let role = if admin_mail_ids.as_ref().contains(&self.mail_id) {
            Role::Admin
        } else {
            Role::Student
        };

        User {
            id: Uuid::new_v4(),
            name: self.name,
            pw_hash: verifier.hash(&self.password),
            mail_id: self.mail_id,
            dob: self.dob,
            interests: self.interests,
            enrolled_courses: vec![],
            recommended_courses: vec![],
            role,
        }
    }
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct UserLoginData {
    #[schema(format = "email")]
    pub mail_id: String,
    #[schema(format = "password")]
    pub password: String,
}

impl std::fmt::Debug for UserLoginData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserLoginData:{}", self.mail_id)
    }
}

/// Partial profile update; absent fields are left untouched.
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct UserPatch {
    pub name: Option<String>,
    #[schema(format = "email")]
    pub mail_id: Option<String>,
    #[schema(format = "password")]
    pub password: Option<String>,
    pub dob: Option<NaiveDate>,
    pub interests: Option<Vec<String>>,
}

impl std::fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserPatch")
    }
}
