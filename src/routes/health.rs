use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use tracing::error;

use crate::models::{AppState, HealthResponse};

const SERVICE_NAME: &str = "malim-backend";
const SAMPLE_SIZE: usize = 5;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.storage.list_keys(SAMPLE_SIZE).await {
        Ok(keys) => {
            let response = HealthResponse {
                status: "OK".to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                service: SERVICE_NAME.to_string(),
                bucket: state.storage.bucket_name().to_string(),
                objects_count: keys.len(),
                sample_objects: keys,
                environment: state.config.server.environment.clone(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Storage health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "ERROR",
                    "error": e.to_string(),
                    "service": SERVICE_NAME,
                })),
            )
                .into_response()
        }
    }
}

async fn banner(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Malim Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "deleteImage": "DELETE /api/deleteImage?url=",
            "saveProduct": "POST /api/save-product-final",
            "productPreview": "GET /api/product-preview",
            "facebookPreview": "GET /api/facebook-preview",
            "collage": "GET /api/generate-collage?photo=",
            "health": "GET /api/health",
        },
        "environment": state.config.server.environment,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, get, test_state};
    use crate::storage::memory::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_lists_sample_objects() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..7 {
            store.insert(&format!("img-{}.jpg", i), b"x");
        }
        let state = test_state().with_storage(store);

        let response = get(router(state), "/api/health", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "OK");
        assert_eq!(json["objects_count"], 5);
        assert_eq!(json["sample_objects"].as_array().unwrap().len(), 5);
        assert_eq!(json["environment"], "test");
    }

    #[tokio::test]
    async fn test_health_reports_storage_failure() {
        let state = test_state().with_storage(Arc::new(MemoryStore::unavailable()));
        let response = get(router(state), "/api/health", &[]).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["status"], "ERROR");
    }

    #[tokio::test]
    async fn test_banner() {
        let response = get(router(test_state()), "/", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Malim Backend API");
    }
}
