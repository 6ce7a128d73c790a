//! Central configuration for the qepo crate

use std::sync::LazyLock;

/// Public origin of the web application, used to build the OAuth callback URL
///
/// Default: "http://localhost:3001"
pub static QEPO_BASE_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("QEPO_BASE_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| "http://localhost:3001".to_string())
});

/// Where users land after login, logout and the OAuth callback
///
/// Default: "/"
pub static QEPO_REDIRECT_HOME: LazyLock<String> =
    LazyLock::new(|| std::env::var("QEPO_REDIRECT_HOME").unwrap_or_else(|_| "/".to_string()));

/// Login page, the exit of the callback flow when no session exists
///
/// Default: "/login"
pub static QEPO_LOGIN_URL: LazyLock<String> =
    LazyLock::new(|| std::env::var("QEPO_LOGIN_URL").unwrap_or_else(|_| "/login".to_string()));

/// Path of the OAuth/email callback handler
pub const CALLBACK_PATH: &str = "/callback";

/// Fixed callback URL handed to the auth provider
pub fn callback_url() -> String {
    format!("{}{}", QEPO_BASE_URL.as_str(), CALLBACK_PATH)
}
