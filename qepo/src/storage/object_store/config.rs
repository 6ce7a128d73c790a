use std::{env, sync::LazyLock};

use super::types::{HostedObjectStore, InMemoryObjectStore, ObjectStore};

static OBJECT_STORE_TYPE: LazyLock<String> =
    LazyLock::new(|| env::var("OBJECT_STORE_TYPE").unwrap_or_else(|_| "hosted".to_string()));

pub(crate) static GENERIC_OBJECT_STORE: LazyLock<Box<dyn ObjectStore>> = LazyLock::new(|| {
    let store_type = OBJECT_STORE_TYPE.as_str();

    tracing::info!(store_type, "Initializing object store");

    match store_type {
        "hosted" => {
            let url = env::var("OBJECT_STORE_URL").expect("OBJECT_STORE_URL must be set");
            let api_key =
                env::var("OBJECT_STORE_API_KEY").expect("OBJECT_STORE_API_KEY must be set");
            Box::new(HostedObjectStore::new(&url, &api_key)) as Box<dyn ObjectStore>
        }
        "memory" => Box::new(InMemoryObjectStore::new()) as Box<dyn ObjectStore>,
        t => panic!("Unsupported object store type: {t}. Supported types are 'hosted' and 'memory'"),
    }
});
