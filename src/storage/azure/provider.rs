//! StorageProvider implementation backed by the blob store REST client.

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::AzureStorageConfig;
use crate::error::Result;
use crate::storage::azure::client::Client;
use crate::storage::StorageProvider;

/// Azure Blob Storage provider
pub struct AzureBlobStorage {
    client: Client,
}

impl AzureBlobStorage {
    pub fn new(config: &AzureStorageConfig) -> Self {
        let client = Client::new(&config.account, &config.access_key, &config.container);
        Self { client }
    }
}

#[async_trait]
impl StorageProvider for AzureBlobStorage {
    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        // Idempotent container setup; an existing container is not an
        // upload failure.
        self.client.create_container().await?;
        self.client.put_object(path, data).await?;
        tracing::info!("Uploaded blob {}", path);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        self.client.get_object(path).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.client.head_object(path).await
    }

    fn reference(&self, path: &str) -> String {
        self.client.blob_url(path)
    }

    fn storage_type(&self) -> &'static str {
        "azure"
    }
}
