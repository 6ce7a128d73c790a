//! Configuration for the web layer

use std::sync::LazyLock;

/// Name of the cookie carrying toasts across a redirect
pub(crate) const FLASH_COOKIE_NAME: &str = "qepo_flash";

/// Lifetime of a flash cookie in seconds. It is cleared as soon as a page
/// renders it.
pub(crate) const FLASH_COOKIE_MAX_AGE: i64 = 60;

/// Whether guarded responses carry the session's CSRF token in an
/// `X-CSRF-Token` header, for scripts calling the JSON API
/// Default: true
pub static QEPO_RESPOND_WITH_X_CSRF_TOKEN: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("QEPO_RESPOND_WITH_X_CSRF_TOKEN")
        .map(|val| val.to_lowercase() != "false")
        .unwrap_or(true)
});
