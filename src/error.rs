use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures raised by a [`CatalogStore`](crate::data::store::CatalogStore)
/// implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Serialize(#[from] bson::ser::Error),
    #[error(transparent)]
    Deserialize(#[from] bson::de::Error),
}

/// Engine failure taxonomy. Each variant maps to exactly one HTTP problem
/// response in `resp::problem`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{kind} '{id}' doesn't exist")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("user '{user}' is already enrolled in course '{course}'")]
    AlreadyEnrolled { user: Uuid, course: Uuid },

    #[error("mail address '{0}' is already registered")]
    MailRegistered(String),

    #[error("a quiz attempt must contain at least one answer")]
    EmptyAttempt,

    #[error("option {selected} is out of range for question '{question}' ({options} options)")]
    OptionOutOfRange {
        question: Uuid,
        selected: usize,
        options: usize,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    #[inline]
    pub fn not_found(kind: &'static str, id: Uuid) -> CoreError {
        CoreError::NotFound { kind, id }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    // External errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
