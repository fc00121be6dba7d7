use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::errors::ServiceError;

/// Capacity of the change feed; slow subscribers skip ahead when it overflows.
pub const CHANGE_FEED_CAPACITY: usize = 64;

/// Notification emitted after a key was written or removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
}

/// Trait abstraction for per-user key-value persistence.
/// Implementations can be in-memory or file-backed.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError>;
    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError>;
    /// Remove a key; returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, ServiceError>;
    /// Subscribe to changes made through any handle sharing this store.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}
