//! Port for uploaded file storage.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// The key is not a relative path made of safe segments.
        InvalidKey { key: String } => "invalid blob key: {key}",
        /// Reading or writing the underlying store failed.
        Io { message: String } => "blob store I/O failed: {message}",
    }
}

/// Port for storing opaque blobs under slash-separated keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing blob.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobStoreError>;

    /// Remove the blob. Missing blobs are not an error.
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;
}
