use std::{env, sync::LazyLock};
use tokio::sync::Mutex;

use super::types::{CacheStore, InMemoryCacheStore};

static GENERIC_CACHE_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_CACHE_STORE_TYPE").unwrap_or_else(|_| "memory".to_string())
});

/// Holds sessions, PKCE verifiers and pending avatar selections
pub(crate) static GENERIC_CACHE_STORE: LazyLock<Mutex<Box<dyn CacheStore>>> =
    LazyLock::new(|| {
        let store_type = GENERIC_CACHE_STORE_TYPE.as_str();

        tracing::info!(store_type, "Initializing cache store");

        let store: Box<dyn CacheStore> = match store_type {
            "memory" => Box::new(InMemoryCacheStore::new()),
            t => panic!("Unsupported cache store type: {t}. Supported types are 'memory'"),
        };

        Mutex::new(store)
    });
