use http::HeaderMap;
use serde::Deserialize;

use crate::auth::{self, AUTH_OAUTH_PROVIDER, AuthError, AuthErrorCode};
use crate::config::{QEPO_REDIRECT_HOME, callback_url};
use crate::session::{self, create_session, get_session_id_from_headers};
use crate::validation::{FieldErrors, validate_credentials};

use super::avatar::remove_selected_avatar;
use super::errors::CoordinationError;
use super::types::{FormFailure, Notification, RedirectOutcome};

const MSG_WRONG_CREDENTIALS: &str = "Email atau password salah";
const MSG_EMAIL_NOT_REGISTERED: &str = "Email tidak terdaftar";
const MSG_EMAIL_NOT_CONFIRMED: &str = "Email belum diverifikasi";
const MSG_UNEXPECTED: &str = "Kesalahan tidak terduga";

/// Body of the login and register forms
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Translate a failed password sign-in into what the login page shows
pub(crate) fn login_failure(err: &AuthError) -> FormFailure {
    let mut errors = FieldErrors::new();
    match err.code() {
        Some(AuthErrorCode::InvalidCredentials) => {
            errors.set("email", MSG_WRONG_CREDENTIALS);
            errors.set("password", MSG_WRONG_CREDENTIALS);
        }
        Some(AuthErrorCode::UserNotFound) => errors.set("email", MSG_EMAIL_NOT_REGISTERED),
        Some(AuthErrorCode::EmailNotConfirmed) => errors.set("email", MSG_EMAIL_NOT_CONFIRMED),
        _ => return FormFailure::notify(Notification::error(MSG_UNEXPECTED)),
    }
    FormFailure::fields(errors)
}

/// Sign in with email and password. On success the outcome carries the
/// session cookie and sends the browser home.
pub async fn login_core(form: &AuthForm) -> Result<RedirectOutcome, FormFailure> {
    let credentials = validate_credentials(&form.email, &form.password).map_err(FormFailure::fields)?;

    let provider_session = auth::sign_in_with_password(&credentials)
        .await
        .map_err(|e| {
            tracing::info!(error = %e, "Password sign-in rejected");
            login_failure(&e)
        })?;

    let headers = create_session(&provider_session).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create session");
        FormFailure::notify(Notification::error(MSG_UNEXPECTED))
    })?;

    Ok(RedirectOutcome {
        redirect_to: QEPO_REDIRECT_HOME.to_string(),
        headers,
        notifications: vec![Notification::success("Login success")],
    })
}

/// Create an account. The provider's message is shown as-is on failure.
pub async fn register_core(form: &AuthForm) -> Result<Notification, FormFailure> {
    let credentials = validate_credentials(&form.email, &form.password).map_err(FormFailure::fields)?;

    match auth::sign_up(&credentials).await {
        Ok(_) => Ok(Notification::success("Register success")),
        Err(e) => {
            tracing::info!(error = %e, "Sign-up rejected");
            Err(FormFailure::notify(Notification::error(e.to_string())))
        }
    }
}

/// Begin OAuth sign-in. Returns the provider URL to redirect to and the
/// cookie that remembers the PKCE verifier for the callback.
pub async fn start_oauth_core() -> Result<(String, HeaderMap), CoordinationError> {
    let (code_challenge, headers) = auth::start_pkce().await?;
    let url =
        auth::oauth_authorize_url(&AUTH_OAUTH_PROVIDER, &callback_url(), &code_challenge).await?;
    Ok((url, headers))
}

/// End the session and go home
pub async fn logout_core(headers: &HeaderMap) -> Result<RedirectOutcome, CoordinationError> {
    if let Some(session_id) = get_session_id_from_headers(headers)? {
        remove_selected_avatar(session_id).await?;
    }
    let headers = session::prepare_logout_response(headers).await?;

    Ok(RedirectOutcome {
        redirect_to: QEPO_REDIRECT_HOME.to_string(),
        headers,
        notifications: vec![Notification::success("Kamu telah keluar")],
    })
}
