//! Database connection configuration

use std::{env, str::FromStr, sync::LazyLock};

use super::types::{DataStore, PooledDataStore};

static GENERIC_DATA_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_DATA_STORE_TYPE").expect("GENERIC_DATA_STORE_TYPE must be set")
});

static GENERIC_DATA_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_DATA_STORE_URL").expect("GENERIC_DATA_STORE_URL must be set")
});

/// Process-wide database handle. Pools are internally synchronised, so no
/// outer lock is taken around queries.
pub(crate) static GENERIC_DATA_STORE: LazyLock<Box<dyn DataStore>> = LazyLock::new(|| {
    let store_type = GENERIC_DATA_STORE_TYPE.as_str();
    let store_url = GENERIC_DATA_STORE_URL.as_str();

    tracing::info!(store_type, "Initializing data store");

    let store = match store_type {
        "sqlite" => {
            let opts = sqlx::sqlite::SqliteConnectOptions::from_str(store_url)
                .expect("Failed to parse SQLite connection string")
                .create_if_missing(true);
            PooledDataStore::Sqlite(sqlx::sqlite::SqlitePool::connect_lazy_with(opts))
        }
        "postgres" => PooledDataStore::Postgres(
            sqlx::PgPool::connect_lazy(store_url).expect("Failed to create Postgres pool"),
        ),
        t => panic!("Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"),
    };

    tracing::info!(backend = store.backend(), "Data store ready");

    Box::new(store) as Box<dyn DataStore>
});

const DEFAULT_TABLE_PREFIX: &str = "qepo_";

fn table_prefix(configured: Option<String>) -> String {
    configured
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_string())
}

/// Table prefix from environment variable
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| table_prefix(env::var("DB_TABLE_PREFIX").ok()));
