//! Object storage (S3-compatible, Cloudflare R2 in production)
//!
//! Handlers only see the [`ObjectStore`] trait; the production adapter lives
//! in [`s3_client`] and key handling in [`keys`].

use async_trait::async_trait;

pub mod keys;
pub mod s3_client;

#[cfg(test)]
pub mod memory;

pub use keys::*;
pub use s3_client::*;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object {0} not found")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The subset of bucket operations the handlers need.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket_name(&self) -> &str;

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Fails with [`StorageError::NotFound`] when the key does not exist.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    async fn list_keys(&self, max_keys: usize) -> Result<Vec<String>, StorageError>;
}
