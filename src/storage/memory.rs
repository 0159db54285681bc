// In-memory object store used by handler tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ObjectStore, StorageError};

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    fail_puts_for: Mutex<Vec<String>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn fail_puts_for(&self, key: &str) {
        self.fail_puts_for.lock().unwrap().push(key.to_string());
    }

    pub fn insert(&self, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.to_vec(), "image/jpeg".to_string()));
    }

    pub fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket_name(&self) -> &str {
        "memory"
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError> {
        if self.unavailable || self.fail_puts_for.lock().unwrap().iter().any(|k| k == key) {
            return Err(StorageError::Backend(format!("put {} rejected", key)));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Backend("unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list_keys(&self, max_keys: usize) -> Result<Vec<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Backend("unavailable".to_string()));
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .take(max_keys)
            .cloned()
            .collect())
    }
}
