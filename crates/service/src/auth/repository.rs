use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::domain::UserRecord;
use super::errors::AuthError;
use crate::storage::KvStore;

/// Repository abstraction for account and session persistence.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn load_users(&self) -> Result<Vec<UserRecord>, AuthError>;
    async fn save_users(&self, users: &[UserRecord]) -> Result<(), AuthError>;

    async fn session(&self) -> Result<Option<UserRecord>, AuthError>;
    async fn set_session(&self, user: &UserRecord) -> Result<(), AuthError>;
    async fn clear_session(&self) -> Result<(), AuthError>;
    /// Store key of the session marker, for matching change notifications.
    fn session_key(&self) -> &str;
}

/// Accounts and session marker as JSON blobs in a [`KvStore`].
pub struct KvAccountRepository {
    store: Arc<dyn KvStore>,
    users_key: String,
    session_key: String,
}

impl KvAccountRepository {
    pub fn new(store: Arc<dyn KvStore>, users_key: impl Into<String>, session_key: impl Into<String>) -> Self {
        Self { store, users_key: users_key.into(), session_key: session_key.into() }
    }
}

#[async_trait]
impl AccountRepository for KvAccountRepository {
    async fn load_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        let Some(raw) = self.store.get(&self.users_key).await? else {
            return Ok(Vec::new());
        };
        // `null` reads as no accounts; anything unparsable must not be overwritten
        match serde_json::from_str::<Option<Vec<UserRecord>>>(&raw) {
            Ok(users) => Ok(users.unwrap_or_default()),
            Err(e) => {
                warn!(key = %self.users_key, error = %e, "account collection unreadable");
                Err(AuthError::Repository(format!("account collection unreadable: {e}")))
            }
        }
    }

    async fn save_users(&self, users: &[UserRecord]) -> Result<(), AuthError> {
        let blob = serde_json::to_string(users).map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(self.store.set(&self.users_key, blob).await?)
    }

    async fn session(&self) -> Result<Option<UserRecord>, AuthError> {
        let Some(raw) = self.store.get(&self.session_key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<UserRecord>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(key = %self.session_key, error = %e, "session marker unreadable; treating as signed out");
                Ok(None)
            }
        }
    }

    async fn set_session(&self, user: &UserRecord) -> Result<(), AuthError> {
        let blob = serde_json::to_string(user).map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(self.store.set(&self.session_key, blob).await?)
    }

    async fn clear_session(&self) -> Result<(), AuthError> {
        self.store.remove(&self.session_key).await?;
        Ok(())
    }

    fn session_key(&self) -> &str { &self.session_key }
}
