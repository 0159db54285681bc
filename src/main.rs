use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;

use malim_backend::{
    collage::HttpImageFetcher,
    config::Config,
    db::{create_pool, PgProductStore},
    storage::{ObjectStore, S3Client},
    utils::init_logger,
    AppState,
};

const MAX_SOURCE_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Connect to database
    let pool = create_pool(&config.database).await?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Database migrations completed");

    let storage = S3Client::new(&config.storage)?;
    info!(bucket = storage.bucket_name(), "Object storage configured");

    let http = reqwest::Client::builder()
        .timeout(config.collage.fetch_timeout() + Duration::from_secs(1))
        .build()?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        config: Arc::new(config),
        storage: Arc::new(storage),
        products: Arc::new(PgProductStore::new(pool)),
        fetcher: Arc::new(HttpImageFetcher::new(http, MAX_SOURCE_IMAGE_BYTES)),
    };

    let app = malim_backend::create_router(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
