use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{info, warn};

use super::found;
use crate::collage::{build_collage, select_urls, CollageError};
use crate::models::{AppState, CollageQuery};

const COLLAGE_CACHE_CONTROL: &str = "public, max-age=2592000, must-revalidate";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-collage", get(generate_collage))
        .with_state(state)
}

async fn generate_collage(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let query = CollageQuery::parse(raw.as_deref().unwrap_or_default());
    let urls = select_urls(&query.photo);
    let config = &state.config.collage;

    match build_collage(state.fetcher.as_ref(), &urls, config).await {
        Ok(jpeg) => {
            info!(images = urls.len(), bytes = jpeg.len(), "Collage generated");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "image/jpeg"),
                    (header::CACHE_CONTROL, COLLAGE_CACHE_CONTROL),
                ],
                jpeg,
            )
                .into_response()
        }
        Err(CollageError::NoImages) => found(&config.placeholder_image_url),
        Err(e) => {
            warn!(error = %e, "Collage unavailable, redirecting to first photo");
            found(urls.first().unwrap_or(&config.placeholder_image_url))
        }
    }
}
