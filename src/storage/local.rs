use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::config::LocalStorageConfig;
use crate::error::{AppError, Result};
use crate::storage::StorageProvider;

/// Local file system storage provider, used for development and tests.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(config: LocalStorageConfig) -> Self {
        Self {
            base_path: PathBuf::from(config.base_path),
        }
    }

    fn get_full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        let full_path = self.get_full_path(path);

        // Ensure parent directory exists
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        tracing::debug!("Saved file to {:?}", full_path);
        Ok(())
    }

    async fn put_file(&self, path: &str, local_path: &std::path::Path) -> Result<()> {
        let full_path = self.get_full_path(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::copy(local_path, &full_path).await?;
        tracing::debug!("Copied file from {:?} to {:?}", local_path, full_path);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        let full_path = self.get_full_path(path);

        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("File not found: {}", path))
            } else {
                AppError::Storage(format!("Failed to read file: {}", e))
            }
        })?;

        Ok(Bytes::from(data))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.get_full_path(path);
        Ok(full_path.exists())
    }

    fn reference(&self, path: &str) -> String {
        path.to_string()
    }

    fn storage_type(&self) -> &'static str {
        "local"
    }
}
