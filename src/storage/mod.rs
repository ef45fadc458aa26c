pub mod azure;
pub mod local;
pub mod provider;

pub use azure::AzureBlobStorage;
pub use local::LocalStorage;
pub use provider::StorageProvider;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};

/// Build the storage provider selected by configuration.
pub fn from_config(config: &StorageConfig) -> Arc<dyn StorageProvider> {
    match &config.backend {
        StorageBackend::Azure(cfg) => Arc::new(AzureBlobStorage::new(cfg)),
        StorageBackend::Local(cfg) => Arc::new(LocalStorage::new(cfg.clone())),
    }
}
