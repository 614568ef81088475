//! # twoem-storage
//!
//! [`BlobStore`](twoem_core::traits::BlobStore) implementations holding the
//! bytes of certificates, eulogies and download items.

pub mod local;
pub mod memory;

use std::sync::Arc;

use twoem_core::config::storage::StorageConfig;
use twoem_core::traits::BlobStore;
use twoem_core::{AppError, AppResult};

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

/// Build the blob store named by `config.provider`.
pub async fn from_config(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    match config.provider.as_str() {
        "local" => Ok(Arc::new(LocalBlobStore::new(&config.root_path).await?)),
        "memory" => Ok(Arc::new(MemoryBlobStore::new())),
        other => Err(AppError::configuration(format!(
            "Unknown storage provider '{other}'. Expected one of: local, memory"
        ))),
    }
}
