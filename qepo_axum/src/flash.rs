//! Toasts that survive one redirect.
//!
//! Notifications are written to a short-lived cookie on the redirect and
//! read back, then cleared, by the next page that renders.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::headers::{Cookie, HeaderMapExt};
use http::{HeaderMap, HeaderValue, header::SET_COOKIE};

use qepo::{Notification, NotificationKind, RedirectOutcome};

use super::config::{FLASH_COOKIE_MAX_AGE, FLASH_COOKIE_NAME};

fn flash_cookie(value: &str, max_age: i64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{FLASH_COOKIE_NAME}={value}; SameSite=Lax; HttpOnly; Path=/; Max-Age={max_age}"
    ))
    .ok()
}

/// Append a cookie carrying `notifications` to `headers`
pub(crate) fn set_flash(headers: &mut HeaderMap, notifications: &[Notification]) {
    if notifications.is_empty() {
        return;
    }
    let json = match serde_json::to_string(notifications) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize flash notifications");
            return;
        }
    };
    if let Some(cookie) = flash_cookie(&urlencoding::encode(&json), FLASH_COOKIE_MAX_AGE) {
        headers.append(SET_COOKIE, cookie);
    }
}

/// Read the pending notifications. The returned headers clear the cookie
/// when there was one.
pub(crate) fn take_flash(request_headers: &HeaderMap) -> (Vec<Notification>, HeaderMap) {
    let mut clear = HeaderMap::new();
    let Some(raw) = request_headers
        .typed_get::<Cookie>()
        .and_then(|cookies| cookies.get(FLASH_COOKIE_NAME).map(str::to_string))
    else {
        return (Vec::new(), clear);
    };

    if let Some(cookie) = flash_cookie("", -1) {
        clear.append(SET_COOKIE, cookie);
    }

    let notifications = urlencoding::decode(&raw)
        .ok()
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_else(|| {
            tracing::debug!("Ignoring unreadable flash cookie");
            Vec::new()
        });
    (notifications, clear)
}

/// A redirect carrying the outcome's cookies and toasts
pub(crate) fn redirect_with(outcome: RedirectOutcome) -> Response {
    let mut headers = outcome.headers;
    set_flash(&mut headers, &outcome.notifications);
    (headers, Redirect::to(&outcome.redirect_to)).into_response()
}

/// Redirect to `to` with a single toast
pub(crate) fn redirect_with_notification(to: &str, notification: Notification) -> Response {
    redirect_with(RedirectOutcome {
        redirect_to: to.to_string(),
        headers: HeaderMap::new(),
        notifications: vec![notification],
    })
}

/// A toast as the templates see it
pub(crate) struct Toast {
    pub(crate) class: &'static str,
    pub(crate) message: String,
}

impl From<Notification> for Toast {
    fn from(notification: Notification) -> Self {
        let class = match notification.kind {
            NotificationKind::Success => "toast-success",
            NotificationKind::Error => "toast-error",
        };
        Self {
            class,
            message: notification.message,
        }
    }
}
