use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::{broadcast, RwLock}};
use tracing::warn;

use super::kv_store::{KvStore, StorageChange, CHANGE_FEED_CAPACITY};
use crate::errors::ServiceError;

/// JSON file-backed key-value store.
///
/// Persists a `key -> serialized value` map to one JSON file and rewrites the
/// whole file after every mutation. Share one `Arc` between controllers to
/// model several tabs of the same browser profile.
pub struct JsonFileKvStore {
    inner: RwLock<BTreeMap<String, String>>,
    file_path: PathBuf,
    changes: broadcast::Sender<StorageChange>,
}

impl JsonFileKvStore {
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    /// An unreadable file starts empty and is overwritten on the next write.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: BTreeMap<String, String> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "storage file unreadable; starting empty");
                BTreeMap::new()
            }),
            Err(_) => {
                let empty: BTreeMap<String, String> = BTreeMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(ServiceError::storage)?)
                    .await
                    .map_err(ServiceError::storage)?;
                empty
            }
        };

        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Ok(Arc::new(Self { inner: RwLock::new(map), file_path, changes }))
    }

    async fn save(&self, map: &BTreeMap<String, String>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(map).map_err(ServiceError::storage)?;
        fs::write(&self.file_path, data).await.map_err(ServiceError::storage)?;
        Ok(())
    }

    /// List all keys currently stored.
    pub async fn keys(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl KvStore for JsonFileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key.to_string(), value.clone());
        self.save(&map).await?;
        drop(map);
        let _ = self.changes.send(StorageChange { key: key.to_string(), new_value: Some(value) });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        if existed {
            self.save(&map).await?;
        }
        drop(map);
        if existed {
            let _ = self.changes.send(StorageChange { key: key.to_string(), new_value: None });
        }
        Ok(existed)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
