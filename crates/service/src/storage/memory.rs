use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::kv_store::{KvStore, StorageChange, CHANGE_FEED_CAPACITY};
use crate::errors::ServiceError;

/// Process-local store with no persistence. Used by tests and embedders
/// that bring their own durability.
pub struct MemoryKvStore {
    inner: RwLock<HashMap<String, String>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { inner: RwLock::new(HashMap::new()), changes }
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        self.inner.write().await.insert(key.to_string(), value.clone());
        let _ = self.changes.send(StorageChange { key: key.to_string(), new_value: Some(value) });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, ServiceError> {
        let existed = self.inner.write().await.remove(key).is_some();
        if existed {
            let _ = self.changes.send(StorageChange { key: key.to_string(), new_value: None });
        }
        Ok(existed)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
