use http::HeaderMap;
use sha2::{Digest, Sha256};

use crate::storage::{CacheData, GENERIC_CACHE_STORE};
use crate::utils::{
    base64url_encode, gen_random_string, get_cookie_from_headers, header_clear_cookie,
    header_set_cookie,
};

use super::config::{AUTH_PKCE_COOKIE_NAME, AUTH_PKCE_MAX_AGE};
use super::errors::AuthError;

const PKCE_PREFIX: &str = "pkce";

fn code_challenge_s256(verifier: &str) -> String {
    base64url_encode(&Sha256::digest(verifier.as_bytes()))
}

/// Generate a verifier, park it in the cache store, and return the S256
/// challenge together with the cookie that points at the stored verifier.
pub(crate) async fn start_pkce() -> Result<(String, HeaderMap), AuthError> {
    let verifier = gen_random_string(32)?;
    let pkce_id = gen_random_string(32)?;

    GENERIC_CACHE_STORE
        .lock()
        .await
        .put_with_ttl(
            PKCE_PREFIX,
            &pkce_id,
            CacheData {
                value: verifier.clone(),
            },
            *AUTH_PKCE_MAX_AGE as usize,
        )
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        AUTH_PKCE_COOKIE_NAME,
        &pkce_id,
        *AUTH_PKCE_MAX_AGE as i64,
    )?;

    Ok((code_challenge_s256(&verifier), headers))
}

/// Take the verifier referenced by the request's PKCE cookie out of the store.
/// The returned headers expire the cookie.
pub(crate) async fn take_pkce_verifier(
    headers: &HeaderMap,
) -> Result<(String, HeaderMap), AuthError> {
    let pkce_id = get_cookie_from_headers(headers, AUTH_PKCE_COOKIE_NAME)?
        .ok_or_else(|| AuthError::Pkce("PKCE cookie not found".to_string()))?;

    let mut store = GENERIC_CACHE_STORE.lock().await;
    let verifier = store
        .get(PKCE_PREFIX, pkce_id)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?
        .ok_or_else(|| AuthError::Pkce("PKCE verifier expired or unknown".to_string()))?;
    store
        .remove(PKCE_PREFIX, pkce_id)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;
    drop(store);

    let mut clear = HeaderMap::new();
    header_clear_cookie(&mut clear, AUTH_PKCE_COOKIE_NAME)?;

    Ok((verifier.value, clear))
}

pub(crate) fn verify_code_challenge(verifier: &str, challenge: &str) -> bool {
    code_challenge_s256(verifier) == challenge
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http::header::{COOKIE, SET_COOKIE};

    #[test]
    fn test_code_challenge_matches_rfc7636_example() {
        // Appendix B of RFC 7636
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            code_challenge_s256(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
        assert!(verify_code_challenge(
            verifier,
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        ));
        assert!(!verify_code_challenge("other", "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"));
    }

    #[tokio::test]
    async fn test_verifier_round_trip_through_cookie_is_single_use() {
        let (challenge, set_headers) = start_pkce().await.expect("start pkce");

        let set_cookie = set_headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap().to_string();

        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_str(&pair).unwrap());

        let (verifier, clear) = take_pkce_verifier(&request).await.expect("verifier");
        assert!(verify_code_challenge(&verifier, &challenge));
        assert!(
            clear
                .get(SET_COOKIE)
                .unwrap()
                .to_str()
                .unwrap()
                .contains("Max-Age=-86400")
        );

        let again = take_pkce_verifier(&request).await;
        assert!(matches!(again, Err(AuthError::Pkce(_))));
    }

    #[tokio::test]
    async fn test_missing_cookie_is_pkce_error() {
        let result = take_pkce_verifier(&HeaderMap::new()).await;
        assert!(matches!(result, Err(AuthError::Pkce(_))));
    }
}
