//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/upload` - Image upload to object storage
//! - `/api/deleteImage` - Image deletion by public URL
//! - `/api/save-product-final` - Product document upsert
//! - `/api/product-preview`, `/api/facebook-preview` - Open Graph pages for crawlers
//! - `/api/generate-collage` - Social preview collage
//! - `/api/health`, `/` - Health check and API banner

pub mod collage;
pub mod health;
pub mod images;
pub mod preview;
pub mod products;
pub mod upload;

use axum::{
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
///
/// Every route is under `/api/` except the banner at `/`. Unknown paths get a
/// JSON 404.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(health::router(state.clone()))
        .merge(upload::router(state.clone()))
        .merge(images::router(state.clone()))
        .merge(products::router(state.clone()))
        .merge(preview::router(state.clone()))
        .merge(collage::router(state))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Endpoint not found",
            "path": uri.path(),
        })),
    )
        .into_response()
}

/// `302 Found` to `url`. Axum's `Redirect` helpers only emit 303/307/308.
pub(crate) fn found(url: &str) -> Response {
    match HeaderValue::from_str(url) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => {
            warn!(url, "Refusing to redirect to a URL that is not a valid header value");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Invalid redirect target",
                })),
            )
                .into_response()
        }
    }
}
