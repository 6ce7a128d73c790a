use std::{env, sync::LazyLock};

use super::provider::{AuthProvider, HostedAuthProvider, InMemoryAuthProvider};

static AUTH_PROVIDER_TYPE: LazyLock<String> =
    LazyLock::new(|| env::var("AUTH_PROVIDER_TYPE").unwrap_or_else(|_| "hosted".to_string()));

/// OAuth provider offered on the login and register pages
pub static AUTH_OAUTH_PROVIDER: LazyLock<String> =
    LazyLock::new(|| env::var("AUTH_OAUTH_PROVIDER").unwrap_or_else(|_| "google".to_string()));

pub(crate) const AUTH_PKCE_COOKIE_NAME: &str = "__Host-PkceId";

pub(crate) static AUTH_PKCE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    env::var("AUTH_PKCE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(600)
});

pub(crate) static GENERIC_AUTH_PROVIDER: LazyLock<Box<dyn AuthProvider>> = LazyLock::new(|| {
    let provider_type = AUTH_PROVIDER_TYPE.as_str();

    tracing::info!(provider_type, "Initializing auth provider");

    match provider_type {
        "hosted" => {
            let url = env::var("AUTH_PROVIDER_URL").expect("AUTH_PROVIDER_URL must be set");
            let api_key =
                env::var("AUTH_PROVIDER_API_KEY").expect("AUTH_PROVIDER_API_KEY must be set");
            Box::new(HostedAuthProvider::new(&url, &api_key)) as Box<dyn AuthProvider>
        }
        "memory" => Box::new(InMemoryAuthProvider::new()) as Box<dyn AuthProvider>,
        t => panic!("Unsupported auth provider type: {t}. Supported types are 'hosted' and 'memory'"),
    }
});
