// R2 adapter over rust-s3

use anyhow::{Context, Result};
use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;
use tracing::{debug, info};

use super::{ObjectStore, StorageError};
use crate::config::StorageConfig;

pub struct S3Client {
    bucket: Bucket,
}

impl S3Client {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            None,
            None,
            None,
        )
        .context("Failed to build storage credentials")?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .context("Failed to initialise storage bucket")?
            .with_path_style();

        info!(bucket = %config.bucket, endpoint = %config.endpoint, "Storage client ready");
        Ok(Self { bucket })
    }
}

fn backend(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn is_not_found(err: &S3Error) -> bool {
    matches!(err, S3Error::HttpFailWithBody(404, _))
}

#[async_trait]
impl ObjectStore for S3Client {
    fn bucket_name(&self) -> &str {
        &self.bucket.name
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(backend)?;

        match response.status_code() {
            200..=299 => {
                debug!(key, bytes = data.len(), "Object stored");
                Ok(())
            }
            status => Err(StorageError::Backend(format!(
                "put {} returned status {}",
                key, status
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        // DELETE is idempotent on S3, so existence is checked first.
        match self.bucket.head_object(key).await {
            Ok(_) => {}
            Err(err) if is_not_found(&err) => return Err(StorageError::NotFound(key.to_string())),
            Err(err) => return Err(backend(err)),
        }

        let response = self.bucket.delete_object(key).await.map_err(backend)?;
        match response.status_code() {
            200..=299 => Ok(()),
            404 => Err(StorageError::NotFound(key.to_string())),
            status => Err(StorageError::Backend(format!(
                "delete {} returned status {}",
                key, status
            ))),
        }
    }

    async fn list_keys(&self, max_keys: usize) -> Result<Vec<String>, StorageError> {
        let (page, _status) = self
            .bucket
            .list_page(String::new(), None, None, None, Some(max_keys))
            .await
            .map_err(backend)?;

        Ok(page
            .contents
            .into_iter()
            .take(max_keys)
            .map(|object| object.key)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig {
            bucket: "catalog".to_string(),
            endpoint: "https://account.r2.cloudflarestorage.com".to_string(),
            region: "auto".to_string(),
            access_key_id: "access".to_string(),
            secret_access_key: "secret".to_string(),
            public_base_url: "https://pub-123.r2.dev".to_string(),
        }
    }

    #[test]
    fn test_client_construction_is_offline() {
        let client = S3Client::new(&config()).unwrap();
        assert_eq!(client.bucket_name(), "catalog");
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found(&S3Error::HttpFailWithBody(404, String::new())));
        assert!(!is_not_found(&S3Error::HttpFailWithBody(500, String::new())));
    }
}
