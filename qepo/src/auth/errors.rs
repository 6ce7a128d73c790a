use std::fmt;
use thiserror::Error;

use crate::utils::UtilError;

/// Error codes the auth provider reports that the app reacts to.
/// Anything else is carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidCredentials,
    UserNotFound,
    EmailNotConfirmed,
    UserAlreadyExists,
    WeakPassword,
    SessionNotFound,
    Other(String),
}

impl AuthErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "invalid_credentials" => Self::InvalidCredentials,
            "user_not_found" => Self::UserNotFound,
            "email_not_confirmed" => Self::EmailNotConfirmed,
            "user_already_exists" | "email_exists" => Self::UserAlreadyExists,
            "weak_password" => Self::WeakPassword,
            "session_not_found" => Self::SessionNotFound,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserNotFound => "user_not_found",
            Self::EmailNotConfirmed => "email_not_confirmed",
            Self::UserAlreadyExists => "user_already_exists",
            Self::WeakPassword => "weak_password",
            Self::SessionNotFound => "session_not_found",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone)]
pub enum AuthError {
    /// The provider answered and refused the request
    #[error("{message}")]
    Provider { code: AuthErrorCode, message: String },

    #[error("Auth provider request failed: {0}")]
    Transport(String),

    #[error("Invalid auth provider response: {0}")]
    InvalidResponse(String),

    #[error("PKCE error: {0}")]
    Pkce(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl AuthError {
    pub(crate) fn provider(code: &str, message: impl Into<String>) -> Self {
        Self::Provider {
            code: AuthErrorCode::from_code(code),
            message: message.into(),
        }
    }

    /// The provider error code, if the provider produced this error
    pub fn code(&self) -> Option<&AuthErrorCode> {
        match self {
            Self::Provider { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_known_and_unknown() {
        assert_eq!(
            AuthErrorCode::from_code("invalid_credentials"),
            AuthErrorCode::InvalidCredentials
        );
        assert_eq!(
            AuthErrorCode::from_code("email_exists"),
            AuthErrorCode::UserAlreadyExists
        );
        assert_eq!(
            AuthErrorCode::from_code("over_request_rate_limit"),
            AuthErrorCode::Other("over_request_rate_limit".to_string())
        );
    }

    #[test]
    fn test_provider_error_displays_provider_message() {
        let err = AuthError::provider("user_already_exists", "User already registered");
        assert_eq!(err.to_string(), "User already registered");
        assert_eq!(err.code(), Some(&AuthErrorCode::UserAlreadyExists));

        let err = AuthError::Transport("connection refused".to_string());
        assert!(err.code().is_none());
    }
}
