use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

/// Document-style product persistence keyed by SKU.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert the document, or shallow-merge it into the stored one.
    /// Top-level fields missing from `document` keep their stored values.
    async fn upsert_merge(&self, sku: &str, document: &Map<String, Value>) -> Result<(), sqlx::Error>;
}

pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn upsert_merge(&self, sku: &str, document: &Map<String, Value>) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO products (sku, data)
            VALUES ($1, $2)
            ON CONFLICT (sku) DO UPDATE
            SET data = products.data || EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(sku)
        .bind(Value::Object(document.clone()))
        .execute(&self.pool)
        .await?;

        tracing::info!(sku, fields = document.len(), "Product upserted");
        Ok(())
    }
}
