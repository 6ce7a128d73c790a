use thiserror::Error;

use crate::auth::AuthError;
use crate::utils::UtilError;

/// Failures while creating, reading or ending a browser session
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The session cache could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Utils(#[from] UtilError),

    /// The provider rejected or failed the token lookup
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}
