// Source image download

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

/// Downloads the raw bytes behind an image URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, String>;
}

pub struct HttpImageFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("upstream returned {}", status));
        }
        if let Some(len) = response.content_length() {
            if len as usize > self.max_bytes {
                return Err(format!("image is {} bytes, limit is {}", len, self.max_bytes));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read body: {}", e))?;
        if body.len() > self.max_bytes {
            return Err(format!("image is {} bytes, limit is {}", body.len(), self.max_bytes));
        }

        debug!(url, bytes = body.len(), "Fetched source image");
        Ok(body)
    }
}
