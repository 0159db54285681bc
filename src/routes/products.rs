use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::info;
use validator::Validate;

use crate::models::{AppState, ProductDocument, SaveProductResponse};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/save-product-final", post(save_product))
        .with_state(state)
}

/// Parse and validate a product body. Anything other than a JSON object with
/// a usable `productSku` is rejected.
pub fn parse_product(body: Value) -> AppResult<ProductDocument> {
    if !body.is_object() {
        return Err(AppError::InvalidRequest(
            "Product body must be a JSON object".to_string(),
        ));
    }
    let product: ProductDocument = serde_json::from_value(body).map_err(|e| {
        AppError::InvalidRequest(format!("Invalid product data or missing productSku: {}", e))
    })?;
    product.validate()?;
    Ok(product)
}

async fn save_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<SaveProductResponse>> {
    let Json(body) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let product = parse_product(body)?;

    let sku = product.product_sku.clone();
    state
        .products
        .upsert_merge(&sku, &product.into_document())
        .await?;

    info!(sku = %sku, "Product saved");
    Ok(Json(SaveProductResponse {
        success: true,
        message: format!("Product {} saved", sku),
    }))
}
