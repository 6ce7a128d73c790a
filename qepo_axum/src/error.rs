use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::{Result as HttpResponse, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;

use qepo::{CoordinationError, ProfileError};

/// Helper trait for converting errors to a standard response error format
pub(crate) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

fn status_for(err: &CoordinationError) -> StatusCode {
    match err {
        CoordinationError::Unauthorized => StatusCode::UNAUTHORIZED,
        CoordinationError::CsrfMismatch => StatusCode::FORBIDDEN,
        CoordinationError::Validation(_) => StatusCode::BAD_REQUEST,
        CoordinationError::ProfileError(ProfileError::UsernameTaken) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CoordinationError::ProfileError(ProfileError::NotFound) => StatusCode::NOT_FOUND,
        CoordinationError::ProfileError(ProfileError::InvalidImage(_)) => StatusCode::BAD_REQUEST,
        CoordinationError::AuthError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (status_for(&e), e.to_string()))
    }
}

/// Implementation for http::Error (used by Response::builder())
impl<T> IntoResponseError<T> for HttpResponse<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

/// JSON error body of the `/api` routes
#[derive(Debug, Serialize)]
pub(crate) struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, String>>,
}

impl ApiError {
    pub(crate) fn unauthorized() -> Self {
        CoordinationError::Unauthorized.into()
    }
}

impl From<CoordinationError> for ApiError {
    fn from(err: CoordinationError) -> Self {
        let status = status_for(&err);
        let code = match &err {
            CoordinationError::Unauthorized => "UNAUTHORIZED",
            CoordinationError::CsrfMismatch => "CSRF_MISMATCH",
            CoordinationError::Validation(_) => "VALIDATION",
            CoordinationError::ProfileError(e) => e.code(),
            _ => "INTERNAL",
        };
        let fields = match &err {
            CoordinationError::Validation(errors) => Some(
                errors
                    .iter()
                    .map(|(field, message)| (field.to_string(), message.to_string()))
                    .collect(),
            ),
            _ => None,
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal error".to_string()
        } else {
            err.to_string()
        };

        Self {
            status,
            code,
            message,
            fields,
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        CoordinationError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
