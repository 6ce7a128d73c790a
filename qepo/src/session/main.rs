use chrono::{Duration, Utc};
use http::header::HeaderMap;

use crate::auth::{self, ProviderSession};
use crate::session::config::{SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
use crate::session::errors::SessionError;
use crate::session::types::{CsrfToken, StoredSession, User as SessionUser};
use crate::storage::{CacheData, GENERIC_CACHE_STORE};
use crate::utils::{gen_random_string, get_cookie_from_headers, header_clear_cookie, header_set_cookie};

const SESSION_PREFIX: &str = "session";

/// Store a provider session under a fresh session id and return the
/// `Set-Cookie` headers that hand the id to the browser.
pub(crate) async fn create_session(
    provider_session: &ProviderSession,
) -> Result<HeaderMap, SessionError> {
    let session_id = gen_random_string(32)?;
    let csrf_token = gen_random_string(32)?;
    let expires_at = Utc::now() + Duration::seconds(*SESSION_COOKIE_MAX_AGE as i64);

    let stored_session = StoredSession {
        access_token: provider_session.access_token.clone(),
        csrf_token,
        expires_at,
        ttl: *SESSION_COOKIE_MAX_AGE,
    };
    let cache_data: CacheData = stored_session.try_into()?;

    GENERIC_CACHE_STORE
        .lock()
        .await
        .put_with_ttl(
            SESSION_PREFIX,
            &session_id,
            cache_data,
            *SESSION_COOKIE_MAX_AGE as usize,
        )
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))?;

    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        SESSION_COOKIE_NAME.as_str(),
        &session_id,
        *SESSION_COOKIE_MAX_AGE as i64,
    )?;

    tracing::debug!(user_id = %provider_session.user.id, "Session created");
    Ok(headers)
}

pub fn get_session_id_from_headers(headers: &HeaderMap) -> Result<Option<&str>, SessionError> {
    let session_id = get_cookie_from_headers(headers, SESSION_COOKIE_NAME.as_str())?;
    if session_id.is_none() {
        tracing::debug!(cookie_name = %*SESSION_COOKIE_NAME, "No session cookie found");
    }
    Ok(session_id)
}

async fn load_session(session_id: &str) -> Result<Option<StoredSession>, SessionError> {
    let Some(cached) = GENERIC_CACHE_STORE
        .lock()
        .await
        .get(SESSION_PREFIX, session_id)
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))?
    else {
        return Ok(None);
    };

    let stored_session: StoredSession = match cached.try_into() {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable session");
            return Ok(None);
        }
    };

    if stored_session.expires_at < Utc::now() {
        tracing::debug!(expires_at = %stored_session.expires_at, "Session expired");
        return Ok(None);
    }

    Ok(Some(stored_session))
}

/// The live session referenced by the request cookie, if any
pub(crate) async fn get_current_session(
    headers: &HeaderMap,
) -> Result<Option<StoredSession>, SessionError> {
    match get_session_id_from_headers(headers)? {
        Some(session_id) => load_session(session_id).await,
        None => Ok(None),
    }
}

/// Resolve the request's session to the provider's current user.
///
/// Returns `None` when there is no live session or the provider no longer
/// accepts its token.
pub async fn get_user_from_headers(
    headers: &HeaderMap,
) -> Result<Option<(SessionUser, CsrfToken)>, SessionError> {
    let Some(stored_session) = get_current_session(headers).await? else {
        return Ok(None);
    };

    let user = auth::get_user(&stored_session.access_token).await?;

    Ok(user.map(|user| {
        (
            SessionUser::from(user),
            CsrfToken::new(stored_session.csrf_token),
        )
    }))
}

/// Whether the request carries a session the provider still accepts.
/// Provider failures count as "not authenticated".
pub async fn is_authenticated(headers: &HeaderMap) -> bool {
    match get_user_from_headers(headers).await {
        Ok(user) => user.is_some(),
        Err(e) => {
            tracing::warn!(error = %e, "Treating request as anonymous");
            false
        }
    }
}

/// Sign out at the provider, drop the stored session and expire the cookie.
pub async fn prepare_logout_response(headers: &HeaderMap) -> Result<HeaderMap, SessionError> {
    if let Some(session_id) = get_session_id_from_headers(headers)? {
        if let Some(stored_session) = load_session(session_id).await? {
            // The local session goes away even if the provider call fails
            if let Err(e) = auth::sign_out(&stored_session.access_token).await {
                tracing::warn!(error = %e, "Provider sign-out failed");
            }
        }

        GENERIC_CACHE_STORE
            .lock()
            .await
            .remove(SESSION_PREFIX, session_id)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;
    }

    let mut response_headers = HeaderMap::new();
    header_clear_cookie(&mut response_headers, SESSION_COOKIE_NAME.as_str())?;
    Ok(response_headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::test_utils::{cookie_request_headers, init_test_environment};
    use serial_test::serial;

    async fn signed_in_session(email: &str) -> ProviderSession {
        let credentials = Credentials {
            email: email.to_string(),
            password: "Abcdef1!".to_string(),
        };
        auth::sign_up(&credentials).await.expect("sign up");
        auth::sign_in_with_password(&credentials)
            .await
            .expect("sign in")
    }

    #[tokio::test]
    #[serial]
    async fn test_session_resolves_to_provider_user() {
        init_test_environment().await;
        let provider_session = signed_in_session("session-user@example.com").await;

        let set_cookie = create_session(&provider_session).await.expect("session");
        let request = cookie_request_headers(&set_cookie);

        let (user, csrf) = get_user_from_headers(&request)
            .await
            .expect("lookup")
            .expect("user present");
        assert_eq!(user.id, provider_session.user.id);
        assert_eq!(user.email, "session-user@example.com");
        assert!(!csrf.as_str().is_empty());
        assert!(is_authenticated(&request).await);
    }

    #[tokio::test]
    #[serial]
    async fn test_no_cookie_or_unknown_session_is_anonymous() {
        init_test_environment().await;

        assert!(get_user_from_headers(&HeaderMap::new()).await.unwrap().is_none());

        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            format!("{}=does-not-exist", *SESSION_COOKIE_NAME).parse().unwrap(),
        );
        assert!(get_user_from_headers(&headers).await.unwrap().is_none());
        assert!(!is_authenticated(&headers).await);
    }

    #[tokio::test]
    #[serial]
    async fn test_logout_signs_out_and_clears_cookie() {
        init_test_environment().await;
        let provider_session = signed_in_session("logout-user@example.com").await;
        let set_cookie = create_session(&provider_session).await.unwrap();
        let request = cookie_request_headers(&set_cookie);

        let response = prepare_logout_response(&request).await.expect("logout");
        let cookie = response
            .get(http::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.contains("Max-Age=-86400"));

        assert!(get_current_session(&request).await.unwrap().is_none());
        assert!(
            auth::get_user(&provider_session.access_token)
                .await
                .unwrap()
                .is_none()
        );
    }
}
