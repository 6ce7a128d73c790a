use http::HeaderMap;

use crate::auth;
use crate::config::{QEPO_LOGIN_URL, QEPO_REDIRECT_HOME};
use crate::profile::{create_profile, get_profile};
use crate::session::{User as SessionUser, create_session, get_user_from_headers};
use crate::utils::append_headers;

use super::types::{Notification, RedirectOutcome};

/// Exchange an OAuth code for a local session. Any failure means no session.
async fn session_from_code(
    code: &str,
    request_headers: &HeaderMap,
    response_headers: &mut HeaderMap,
) -> Option<SessionUser> {
    let (verifier, clear_pkce) = match auth::take_pkce_verifier(request_headers).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "OAuth callback without a usable PKCE verifier");
            return None;
        }
    };
    append_headers(response_headers, &clear_pkce);

    let provider_session = match auth::exchange_code_for_session(code, &verifier).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "OAuth code exchange failed");
            return None;
        }
    };

    match create_session(&provider_session).await {
        Ok(cookie) => {
            append_headers(response_headers, &cookie);
            Some(SessionUser::from(provider_session.user))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create session after OAuth");
            None
        }
    }
}

/// Drive the post-sign-in callback.
///
/// The user comes from the OAuth `code` when present and from the session
/// cookie otherwise. Without a user the browser goes to the login page.
/// With one, a missing profile is created before going home.
pub async fn callback_core(request_headers: &HeaderMap, code: Option<&str>) -> RedirectOutcome {
    let mut headers = HeaderMap::new();
    let mut notifications = Vec::new();

    let user = match code {
        Some(code) => session_from_code(code, request_headers, &mut headers).await,
        None => match get_user_from_headers(request_headers).await {
            Ok(found) => found.map(|(user, _)| user),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read current session");
                None
            }
        },
    };

    let Some(user) = user else {
        return RedirectOutcome {
            redirect_to: QEPO_LOGIN_URL.to_string(),
            headers,
            notifications,
        };
    };

    match get_profile(&user.id).await {
        Err(e) => {
            tracing::error!(error = %e, user_id = %user.id, "Profile lookup failed");
            notifications.push(Notification::error("Gagal mendapatkan data user"));
        }
        Ok(Some(_)) => {}
        Ok(None) => match create_profile(&user).await {
            Ok(_) => notifications.push(Notification::success("Profile created successfully")),
            Err(e) => notifications.push(Notification::error(format!(
                "Failed to create profile: {e}"
            ))),
        },
    }

    RedirectOutcome {
        redirect_to: QEPO_REDIRECT_HOME.to_string(),
        headers,
        notifications,
    }
}
