//! Object storage
//!
//! Upload and delete jobs talk to an [`ObjectStore`]; [`S3ObjectStore`] is the
//! production implementation.

mod s3;

pub use s3::S3ObjectStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload of {key} failed: {message}")]
    Put { key: String, message: String },

    #[error("Delete of {key} failed: {message}")]
    Delete { key: String, message: String },

    #[error("Storage not configured: {0}")]
    NotConfigured(String),
}

/// Bucket-like key/value blob store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Deleting a missing key is not an error
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;
}
