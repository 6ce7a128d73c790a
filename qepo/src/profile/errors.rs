use thiserror::Error;

use crate::storage::StorageError;

#[derive(Clone, Error, Debug)]
pub enum ProfileError {
    #[error("Profile not found")]
    NotFound,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Object storage error: {0}")]
    ObjectStorage(#[from] StorageError),
}

impl ProfileError {
    /// Stable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::UsernameTaken => "USERNAME_USED",
            Self::InvalidImage(_) => "INVALID_IMAGE",
            Self::Storage(_) | Self::ObjectStorage(_) => "INTERNAL",
        }
    }
}

impl From<sqlx::Error> for ProfileError {
    fn from(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => Self::UsernameTaken,
            _ => Self::Storage(err.to_string()),
        }
    }
}
