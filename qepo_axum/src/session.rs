use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Redirect, Response},
};
use http::{HeaderMap, Method, StatusCode, request::Parts};
use subtle::ConstantTimeEq;

use qepo::{
    CoordinationError, QEPO_REDIRECT_HOME, SessionUser, get_session_id_from_headers,
    get_user_from_headers,
};

pub struct AuthRedirect {
    method: Method,
}

impl AuthRedirect {
    fn new(method: Method) -> Self {
        Self { method }
    }

    fn into_response_with_method(self) -> Response {
        if self.method == Method::GET {
            tracing::debug!("Redirecting to {}", QEPO_REDIRECT_HOME.as_str());
            Redirect::temporary(QEPO_REDIRECT_HOME.as_str()).into_response()
        } else {
            tracing::debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        self.into_response_with_method()
    }
}

/// The signed-in user, available as an axum extractor.
///
/// Extraction resolves the session cookie through the auth provider. For
/// POST, PUT, DELETE and PATCH it also checks the `X-CSRF-Token` header.
/// Form submissions may omit the header; their handlers check the hidden
/// `csrf_token` field with [`AuthUser::verify_form_csrf`] instead.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    /// Id of the session, which also keys the pending avatar selection
    pub session_id: String,
    pub csrf_token: String,
    pub csrf_via_header_verified: bool,
}

impl AuthUser {
    /// Constant-time comparison against the session's CSRF token
    pub fn csrf_matches(&self, submitted: &str) -> bool {
        !submitted.is_empty()
            && bool::from(submitted.as_bytes().ct_eq(self.csrf_token.as_bytes()))
    }

    /// Check a form's hidden `csrf_token` field, unless the request already
    /// proved the token through the `X-CSRF-Token` header
    pub fn verify_form_csrf(&self, form_token: &str) -> Result<(), CoordinationError> {
        if self.csrf_via_header_verified || self.csrf_matches(form_token) {
            return Ok(());
        }
        tracing::warn!(user_id = %self.id, "Form CSRF token mismatch");
        Err(CoordinationError::CsrfMismatch)
    }
}

impl From<&AuthUser> for SessionUser {
    fn from(auth_user: &AuthUser) -> Self {
        SessionUser {
            id: auth_user.id.clone(),
            email: auth_user.email.clone(),
            name: auth_user.name.clone(),
            avatar_url: auth_user.avatar_url.clone(),
        }
    }
}

/// Look up the user behind the request's session. Failures count as anonymous.
pub(crate) async fn load_auth_user(headers: &HeaderMap) -> Option<AuthUser> {
    let session_id = match get_session_id_from_headers(headers) {
        Ok(Some(id)) => id.to_string(),
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable session cookie");
            return None;
        }
    };

    match get_user_from_headers(headers).await {
        Ok(Some((user, csrf_token))) => Some(AuthUser {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
            session_id,
            csrf_token: csrf_token.as_str().to_string(),
            csrf_via_header_verified: false,
        }),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Treating request as anonymous");
            None
        }
    }
}

fn is_state_changing(method: &Method) -> bool {
    method == Method::POST
        || method == Method::PUT
        || method == Method::DELETE
        || method == Method::PATCH
}

/// Header check for state-changing requests. Form posts without the header
/// pass here and are checked against their body by the handler.
fn verify_csrf_header(parts: &Parts, auth_user: &mut AuthUser) -> bool {
    if let Some(header_token) = parts
        .headers
        .get("X-CSRF-Token")
        .and_then(|h| h.to_str().ok())
    {
        if auth_user.csrf_matches(header_token) {
            auth_user.csrf_via_header_verified = true;
            tracing::trace!("CSRF token via X-CSRF-Token header verified");
            return true;
        }
        tracing::error!("CSRF token mismatch (X-CSRF-Token)");
        return false;
    }

    let content_type = parts
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok());
    let is_form_like = content_type.is_some_and(|ct| {
        ct.starts_with("application/x-www-form-urlencoded")
            || ct.starts_with("multipart/form-data")
    });

    if !is_form_like {
        tracing::warn!(
            ?content_type,
            "X-CSRF-Token header missing on a state-changing request"
        );
    }
    is_form_like
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let method = parts.method.clone();

        // A guard earlier in the stack may already have resolved the user
        let cached = parts.extensions.get::<AuthUser>().cloned();
        let mut auth_user = match cached {
            Some(user) => user,
            None => load_auth_user(&parts.headers)
                .await
                .ok_or_else(|| AuthRedirect::new(method.clone()))?,
        };

        if is_state_changing(&method) && !verify_csrf_header(parts, &mut auth_user) {
            return Err(AuthRedirect::new(method));
        }

        Ok(auth_user)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let result: Result<Self, Self::Rejection> =
            <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await;
        Ok(result.ok())
    }
}
