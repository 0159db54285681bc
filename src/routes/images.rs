use axum::{
    extract::{Query, State},
    routing::delete,
    Json, Router,
};
use tracing::info;

use crate::models::{AppState, DeleteImageQuery, DeleteImageResponse};
use crate::storage::{extract_key, KeyLookup};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/deleteImage", delete(delete_image))
        .with_state(state)
}

async fn delete_image(
    State(state): State<AppState>,
    Query(query): Query<DeleteImageQuery>,
) -> AppResult<Json<DeleteImageResponse>> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("A valid url parameter is required".to_string()))?;

    let key = match extract_key(&url, &state.config.storage.public_base_url) {
        Ok(KeyLookup::Managed(key)) => key,
        Ok(KeyLookup::Foreign) => {
            info!(url = %url, "Delete skipped, URL is not in managed storage");
            return Ok(Json(DeleteImageResponse {
                success: true,
                message: "URL is not in managed storage, nothing to delete".to_string(),
                key: None,
            }));
        }
        Err(e) => {
            return Err(AppError::InvalidRequest(format!(
                "Could not extract an object key from the URL: {}",
                e
            )))
        }
    };

    state.storage.delete(&key).await?;
    info!(key = %key, "Image deleted");

    Ok(Json(DeleteImageResponse {
        success: true,
        message: "Image deleted".to_string(),
        key: Some(key),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::test_support::{body_json, send, test_state, PUBLIC_BASE};
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::sync::Arc;

    fn delete_request(query: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/deleteImage{}", query))
            .body(Body::empty())
            .unwrap()
    }

    fn encoded(url: &str) -> String {
        url::form_urlencoded::byte_serialize(url.as_bytes()).collect()
    }

    #[tokio::test]
    async fn test_delete_managed_image() {
        let store = Arc::new(MemoryStore::new());
        store.insert("malim-1-abc-foto.jpg", b"jpeg");
        let state = test_state().with_storage(store.clone());

        let url = format!("{}/malim-1-abc-foto.jpg", PUBLIC_BASE);
        let response = send(router(state), delete_request(&format!("?url={}", encoded(&url)))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["key"], "malim-1-abc-foto.jpg");
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_missing_object_is_404() {
        let url = format!("{}/gone.jpg", PUBLIC_BASE);
        let response = send(
            router(test_state()),
            delete_request(&format!("?url={}", encoded(&url))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_foreign_url_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        store.insert("a.jpg", b"jpeg");
        let state = test_state().with_storage(store.clone());

        let url = "https://res.cloudinary.com/demo/a.jpg";
        let response = send(router(state), delete_request(&format!("?url={}", encoded(url)))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await.get("key").is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_input_is_400() {
        for query in ["", "?url=", "?url=%20", "?url=not-a-url"] {
            let response = send(router(test_state()), delete_request(query)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query {:?}", query);
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let state = test_state().with_storage(Arc::new(MemoryStore::unavailable()));
        let url = format!("{}/a.jpg", PUBLIC_BASE);
        let response = send(router(state), delete_request(&format!("?url={}", encoded(&url)))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
