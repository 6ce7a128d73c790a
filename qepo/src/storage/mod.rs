mod cache_store;
mod data_store;
mod errors;
mod object_store;
mod schema_validation;
mod types;

pub async fn init() -> Result<(), errors::StorageError> {
    let _ = *cache_store::GENERIC_CACHE_STORE;
    let _ = *data_store::GENERIC_DATA_STORE;
    let _ = *object_store::GENERIC_OBJECT_STORE;

    Ok(())
}

/// Fetch an object from the configured object store.
pub async fn get_stored_object(
    bucket: &str,
    key: &str,
) -> Result<Option<StoredObject>, StorageError> {
    object_store::GENERIC_OBJECT_STORE.download(bucket, key).await
}

pub(crate) use cache_store::GENERIC_CACHE_STORE;
pub(crate) use data_store::{DB_TABLE_PREFIX, GENERIC_DATA_STORE};
pub(crate) use object_store::{GENERIC_OBJECT_STORE, ObjectStore};

pub use errors::StorageError;
pub use object_store::MEMORY_OBJECT_PATH;
pub use types::{CacheData, StoredObject};

pub(crate) use schema_validation::{validate_postgres_table_schema, validate_sqlite_table_schema};
