use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::collage::ImageFetcher;
use crate::config::Config;
use crate::db::ProductStore;
use crate::storage::ObjectStore;

/// Shared handles for every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<dyn ObjectStore>,
    pub products: Arc<dyn ProductStore>,
    pub fetcher: Arc<dyn ImageFetcher>,
}

// API Request/Response types

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub urls: Vec<String>,
    pub r2_keys: Vec<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteImageResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// A product document. Only `productSku` is interpreted; every other field is
/// stored as sent.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductDocument {
    #[serde(rename = "productSku")]
    #[validate(length(min = 1, max = 128), custom(function = "valid_sku"))]
    pub product_sku: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn valid_sku(sku: &str) -> Result<(), validator::ValidationError> {
    if sku.trim().is_empty() || sku.trim() != sku || sku.contains('/') {
        return Err(validator::ValidationError::new("invalid_sku"));
    }
    Ok(())
}

impl ProductDocument {
    /// The full document as stored, `productSku` included.
    pub fn into_document(self) -> Map<String, Value> {
        let mut document = self.fields;
        document.insert("productSku".to_string(), Value::String(self.product_sku));
        document
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveProductResponse {
    pub success: bool,
    pub message: String,
}

/// `?photo=a&photo=b`; repeated keys are kept in order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CollageQuery {
    pub photo: Vec<String>,
}

impl CollageQuery {
    pub fn parse(raw: &str) -> Self {
        let photo = url::form_urlencoded::parse(raw.as_bytes())
            .filter(|(key, _)| key == "photo")
            .map(|(_, value)| value.into_owned())
            .collect();
        Self { photo }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub bucket: String,
    pub objects_count: usize,
    pub sample_objects: Vec<String>,
    pub environment: String,
}
