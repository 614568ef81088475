//! Blob store trait for certificate and content file bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Raw byte storage keyed by an opaque string.
///
/// Metadata (filename, content type, size) lives with the owning entity;
/// the blob store only ever sees keys and bytes. Implementations live in
/// `twoem-storage`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. `"local"`, `"memory"`).
    fn provider_type(&self) -> &str;

    /// Store `data` under `key`, replacing any previous blob.
    async fn put(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Read the blob stored under `key`.
    ///
    /// Fails with a storage error when the key is absent.
    async fn get(&self, key: &str) -> AppResult<Bytes>;

    /// Delete the blob under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a blob exists under `key`.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}
