use async_trait::async_trait;
use http::header::CONTENT_TYPE;

use crate::storage::errors::StorageError;
use crate::storage::types::StoredObject;
use crate::utils::get_client;

use super::types::{HostedObjectStore, ObjectStore};

impl HostedObjectStore {
    pub(crate) fn new(base_url: &str, api_key: &str) -> Self {
        tracing::info!(base_url, "Creating hosted object store");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: get_client(),
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{key}", self.base_url)
    }
}

#[async_trait]
impl ObjectStore for HostedObjectStore {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.object_url(bucket, key))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%status, "Object uploaded");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::CONFLICT || body.contains("Duplicate") {
            return Err(StorageError::AlreadyExists(format!("{bucket}/{key}")));
        }

        tracing::error!(%status, body, "Object upload rejected");
        Err(StorageError::Http(format!("Upload failed with status {status}: {body}")))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{key}", self.base_url)
    }

    #[tracing::instrument(skip(self))]
    async fn download(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<StoredObject>, StorageError> {
        let response = self
            .client
            .get(self.object_url(bucket, key))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND | reqwest::StatusCode::BAD_REQUEST => Ok(None),
            status if status.is_success() => {
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = response.bytes().await?.to_vec();
                Ok(Some(StoredObject {
                    bytes,
                    content_type,
                }))
            }
            status => Err(StorageError::Http(format!(
                "Download failed with status {status}"
            ))),
        }
    }
}
