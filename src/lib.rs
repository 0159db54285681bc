// Malim Backend - catalog API for the Malim storefront: image storage,
// product documents and social previews

pub mod collage;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod preview;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
