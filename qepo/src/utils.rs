use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;
use std::time::Duration;

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Random URL-safe string built from `len` bytes of system randomness.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(&buf))
}

/// Shared HTTP client settings for the hosted auth provider and object store
pub(crate) fn get_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to create reqwest client")
}

pub(crate) fn header_set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    max_age: i64,
) -> Result<(), UtilError> {
    let cookie = format!("{name}={value}; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age={max_age}");
    tracing::trace!(cookie_name = %name, max_age, "Setting cookie");
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))?,
    );
    Ok(())
}

/// Append every value of `source` to `target`, keeping repeated headers such as `Set-Cookie`
pub(crate) fn append_headers(target: &mut HeaderMap, source: &HeaderMap) {
    for (name, value) in source {
        target.append(name.clone(), value.clone());
    }
}

/// Expire a cookie by setting a negative max age.
pub(crate) fn header_clear_cookie(
    headers: &mut HeaderMap,
    name: &str,
) -> Result<(), UtilError> {
    header_set_cookie(headers, name, "value", -86400)
}

/// Find a cookie value in the raw `Cookie` header.
pub(crate) fn get_cookie_from_headers<'a>(
    headers: &'a HeaderMap,
    cookie_name: &str,
) -> Result<Option<&'a str>, UtilError> {
    let Some(cookie_header) = headers.get(http::header::COOKIE) else {
        return Ok(None);
    };

    let cookie_str = cookie_header
        .to_str()
        .map_err(|_| UtilError::Cookie("Invalid cookie header".to_string()))?;

    Ok(cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
        let mut parts = s.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == cookie_name => Some(v),
            _ => None,
        }
    }))
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}
