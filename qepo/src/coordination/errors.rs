//! Error types for the page flows

use thiserror::Error;

use crate::auth::AuthError;
use crate::profile::ProfileError;
use crate::session::SessionError;
use crate::storage::StorageError;
use crate::utils::UtilError;
use crate::validation::FieldErrors;

/// Errors that can occur while coordinating a page flow
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// No authenticated user
    #[error("Unauthorized access")]
    Unauthorized,

    /// The request's CSRF token does not belong to the session
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Auth error: {0}")]
    AuthError(AuthError),

    #[error("Profile error: {0}")]
    ProfileError(ProfileError),

    #[error("Session error: {0}")]
    SessionError(SessionError),

    #[error("Storage error: {0}")]
    StorageError(StorageError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    UtilsError(UtilError),
}

// From implementations log on the way in

impl From<AuthError> for CoordinationError {
    fn from(err: AuthError) -> Self {
        let error = Self::AuthError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<ProfileError> for CoordinationError {
    fn from(err: ProfileError) -> Self {
        let error = Self::ProfileError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::SessionError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<StorageError> for CoordinationError {
    fn from(err: StorageError) -> Self {
        let error = Self::StorageError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::UtilsError(err);
        tracing::error!("{}", error);
        error
    }
}
