//! In-memory blob store for tests and ephemeral use

use super::{LocalStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.blobs
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .blobs
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.blobs.lock().expect("store mutex poisoned").remove(key);
        Ok(())
    }
}
