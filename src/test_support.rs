// Shared fixtures for handler and pipeline tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use bytes::Bytes;
use image::{DynamicImage, Rgb, RgbImage};
use tower::ServiceExt;

use crate::collage::ImageFetcher;
use crate::config::{
    CollageConfig, Config, DatabaseConfig, PreviewConfig, ServerConfig, StorageConfig,
    UploadConfig,
};
use crate::db::{memory::MemoryProductStore, ProductStore};
use crate::models::AppState;
use crate::storage::{memory::MemoryStore, ObjectStore};

pub const PUBLIC_BASE: &str = "https://pub-test.r2.dev";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
            environment: "test".to_string(),
            cors_allowed_origins: vec!["https://shop.example.com".to_string()],
        },
        storage: StorageConfig {
            bucket: "memory".to_string(),
            endpoint: "http://127.0.0.1:9".to_string(),
            region: "auto".to_string(),
            access_key_id: "test".to_string(),
            secret_access_key: "test".to_string(),
            public_base_url: PUBLIC_BASE.to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 1,
            min_connections: 0,
        },
        upload: UploadConfig {
            max_file_bytes: 1024,
            ..UploadConfig::default()
        },
        preview: PreviewConfig::default(),
        collage: CollageConfig::default(),
    }
}

/// Serves canned bodies by URL; unknown URLs fail like a refused connection.
#[derive(Default)]
pub struct StaticFetcher {
    pub bodies: HashMap<String, Bytes>,
    pub delay: Option<Duration>,
}

impl StaticFetcher {
    pub fn with(entries: &[(&str, Bytes)]) -> Self {
        Self {
            bodies: entries
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
                .collect(),
            delay: None,
        }
    }
}

#[async_trait]
impl ImageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| "connection refused".to_string())
    }
}

pub fn png(width: u32, height: u32) -> Bytes {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    Bytes::from(out.into_inner())
}

pub fn test_state() -> AppState {
    AppState {
        config: Arc::new(test_config()),
        storage: Arc::new(MemoryStore::new()),
        products: Arc::new(MemoryProductStore::new()),
        fetcher: Arc::new(StaticFetcher::default()),
    }
}

impl AppState {
    pub fn with_storage(mut self, storage: Arc<dyn ObjectStore>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_products(mut self, products: Arc<dyn ProductStore>) -> Self {
        self.products = products;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_config(mut self, edit: impl FnOnce(&mut Config)) -> Self {
        let mut config = (*self.config).clone();
        edit(&mut config);
        self.config = Arc::new(config);
        self
    }
}

pub async fn send(router: Router, request: Request<Body>) -> Response<Body> {
    router.oneshot(request).await.unwrap()
}

pub async fn get(router: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
