use async_trait::async_trait;
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::StoredObject;

pub(crate) struct HostedObjectStore {
    pub(super) base_url: String,
    pub(super) api_key: String,
    pub(super) client: reqwest::Client,
}

pub(crate) struct InMemoryObjectStore {
    pub(super) objects: tokio::sync::Mutex<HashMap<String, StoredObject>>,
}

#[async_trait]
pub(crate) trait ObjectStore: Send + Sync + 'static {
    /// Store `bytes` under `bucket/key`. Without `upsert` an existing object is an error.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError>;

    /// Publicly reachable URL of `bucket/key`. Does not check the object exists.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    async fn download(&self, bucket: &str, key: &str)
    -> Result<Option<StoredObject>, StorageError>;
}
