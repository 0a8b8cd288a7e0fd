use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;

use super::{ObjectStore, StorageError};

/// S3 bucket client
#[derive(Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Client from the default AWS credential/region chain
    pub async fn from_env(bucket: &str) -> Result<Self, StorageError> {
        if bucket.is_empty() {
            return Err(StorageError::NotConfigured(
                "S3_BUCKET_NAME is empty".to_string(),
            ));
        }
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Ok(Self::new(S3Client::new(&aws_config), bucket))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(bytes.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Put {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(bucket = %self.bucket, key = %key, size, "Object uploaded");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(bucket = %self.bucket, key = %key, "Object deleted");
        Ok(())
    }
}
