//! Shared setup for tests that touch the stores or the auth provider.
//!
//! Values from `.env_test` win. Anything it leaves unset falls back to a
//! per-process SQLite file plus the in-memory auth provider and object
//! store, so the suite runs without network access.

use http::HeaderMap;
use http::header::{COOKIE, HeaderValue, SET_COOKIE};
use std::sync::Once;

use crate::utils::gen_random_string;

fn set_default_env(key: &str, value: &str) {
    if std::env::var_os(key).is_none() {
        // Runs inside `Once`, before any configuration static is read
        unsafe { std::env::set_var(key, value) };
    }
}

/// Prepare the environment once and make sure every store is initialized.
pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        dotenvy::from_filename(".env_test").ok();

        let db_path = std::env::temp_dir().join(format!("qepo-test-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&db_path);

        set_default_env("GENERIC_DATA_STORE_TYPE", "sqlite");
        set_default_env(
            "GENERIC_DATA_STORE_URL",
            &format!("sqlite:{}", db_path.display()),
        );
        set_default_env("AUTH_PROVIDER_TYPE", "memory");
        set_default_env("OBJECT_STORE_TYPE", "memory");
    });

    if let Err(e) = crate::init().await {
        eprintln!("Warning: test initialization failed: {e}");
    }
}

/// `prefix` plus a random suffix, for ids, emails and usernames that must
/// not collide across tests sharing one database
pub(crate) fn unique_id(prefix: &str) -> String {
    let suffix = gen_random_string(6).expect("randomness available in tests");
    format!("{prefix}-{}", suffix.replace(['-', '_'], "x"))
}

/// Turn the `Set-Cookie` values of a response into the `Cookie` header a
/// browser would send next. Cookies being cleared are left out.
pub(crate) fn cookie_request_headers(response_headers: &HeaderMap) -> HeaderMap {
    let pairs: Vec<&str> = response_headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|cookie| !cookie.contains("Max-Age=-"))
        .filter_map(|cookie| cookie.split(';').next())
        .map(str::trim)
        .collect();

    let mut headers = HeaderMap::new();
    if !pairs.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&pairs.join("; ")) {
            headers.insert(COOKIE, value);
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_request_headers_skips_cleared() {
        let mut response = HeaderMap::new();
        response.append(
            SET_COOKIE,
            HeaderValue::from_static("a=1; SameSite=Lax; Path=/; Max-Age=600"),
        );
        response.append(
            SET_COOKIE,
            HeaderValue::from_static("b=value; SameSite=Lax; Path=/; Max-Age=-86400"),
        );
        response.append(SET_COOKIE, HeaderValue::from_static("c=3; Path=/"));

        let request = cookie_request_headers(&response);
        assert_eq!(request.get(COOKIE).unwrap(), "a=1; c=3");
        assert!(cookie_request_headers(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_unique_id_is_plain() {
        let id = unique_id("user");
        assert!(id.starts_with("user-"));
        assert!(id["user-".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(unique_id("user"), id);
    }
}
