use async_trait::async_trait;
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::StoredObject;

use super::types::{InMemoryObjectStore, ObjectStore};

/// Path under which the web layer serves objects held in memory
pub const MEMORY_OBJECT_PATH: &str = "/storage";

impl InMemoryObjectStore {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory object store");
        Self {
            objects: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    fn make_key(bucket: &str, key: &str) -> String {
        format!("{bucket}/{key}")
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let full_key = Self::make_key(bucket, key);
        let mut objects = self.objects.lock().await;

        if !upsert && objects.contains_key(&full_key) {
            return Err(StorageError::AlreadyExists(full_key));
        }

        objects.insert(
            full_key,
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{MEMORY_OBJECT_PATH}/{bucket}/{key}")
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<StoredObject>, StorageError> {
        Ok(self
            .objects
            .lock()
            .await
            .get(&Self::make_key(bucket, key))
            .cloned())
    }
}
