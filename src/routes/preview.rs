use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::debug;

use super::found;
use crate::models::AppState;
use crate::preview::{is_crawler, render_page, PreviewKind, PreviewQuery};

const PAGE_CACHE_CONTROL: &str = "public, max-age=86400, stale-while-revalidate=3600";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/product-preview", get(product_preview))
        .route("/api/facebook-preview", get(facebook_preview))
        .with_state(state)
}

async fn product_preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> Response {
    respond(&state, &headers, &lenient(query), PreviewKind::Product)
}

async fn facebook_preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> Response {
    respond(&state, &headers, &lenient(query), PreviewKind::Facebook)
}

/// An unparseable query is treated like an empty one, so it takes the same
/// storefront redirect as any other incomplete request.
fn lenient(query: Result<Query<PreviewQuery>, QueryRejection>) -> PreviewQuery {
    match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Unparseable preview query");
            PreviewQuery::default()
        }
    }
}

fn respond(state: &AppState, headers: &HeaderMap, query: &PreviewQuery, kind: PreviewKind) -> Response {
    let config = &state.config.preview;
    let Some(preview) = query.resolve(kind, config) else {
        debug!("Preview request missing required fields, redirecting to storefront");
        return found(&config.storefront_url);
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !is_crawler(user_agent, &config.crawler_agents) {
        return found(&preview.spa_url);
    }

    debug!(user_agent, kind = ?kind, "Serving Open Graph page to crawler");
    let html = render_page(&preview, &config.site_name);
    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, PAGE_CACHE_CONTROL),
        ],
        html,
    )
        .into_response();

    // Header values must be visible ASCII; skip the canonical hints otherwise.
    let canonical = format!("<{}>; rel=\"canonical\"", preview.spa_url);
    if let (Ok(location), Ok(link)) = (
        header::HeaderValue::from_str(&preview.spa_url),
        header::HeaderValue::from_str(&canonical),
    ) {
        response.headers_mut().insert(header::CONTENT_LOCATION, location);
        response.headers_mut().insert(header::LINK, link);
    }
    response
}
