// In-memory product store used by handler tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::ProductStore;

#[derive(Default)]
pub struct MemoryProductStore {
    documents: Mutex<HashMap<String, Map<String, Value>>>,
    failing: bool,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn get(&self, sku: &str) -> Option<Map<String, Value>> {
        self.documents.lock().unwrap().get(sku).cloned()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn upsert_merge(&self, sku: &str, document: &Map<String, Value>) -> Result<(), sqlx::Error> {
        if self.failing {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let mut documents = self.documents.lock().unwrap();
        let stored = documents.entry(sku.to_string()).or_default();
        for (field, value) in document {
            stored.insert(field.clone(), value.clone());
        }
        Ok(())
    }
}
