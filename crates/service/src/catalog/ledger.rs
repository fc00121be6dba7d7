use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use models::{EditLedger, Record};

use super::identity::assign_id;
use crate::errors::ServiceError;
use crate::storage::KvStore;

/// Where the visible row for an id comes from in the merged dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowOrigin {
    /// A remote record that is not deleted; it wins over additions sharing its id.
    Remote,
    /// The first local addition carrying the id.
    Local,
}

/// The edit ledger together with the store it is persisted to.
///
/// Every mutation writes the whole ledger back under one key before it
/// returns, so the in-memory and stored copies never diverge for callers.
pub struct EditLedgerStore {
    store: Arc<dyn KvStore>,
    key: String,
    ledger: EditLedger,
}

impl EditLedgerStore {
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into(), ledger: EditLedger::default() }
    }

    pub fn ledger(&self) -> &EditLedger { &self.ledger }

    pub fn key(&self) -> &str { &self.key }

    /// Replace the in-memory ledger with the stored one.
    ///
    /// A missing key, a read failure or a blob that is not a ledger object
    /// leaves the current ledger in place; the problem is only logged.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&mut self) {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no saved edits");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read saved edits");
                return;
            }
        };
        match serde_json::from_str::<EditLedger>(&raw) {
            Ok(ledger) => {
                debug!(added = ledger.added.len(), updated = ledger.updated.len(), deleted = ledger.deleted.len(), "edits loaded");
                self.ledger = ledger;
            }
            Err(e) => warn!(error = %e, "failed to parse saved edits"),
        }
    }

    /// Serialize the full ledger and overwrite the stored copy.
    pub async fn save(&self) -> Result<(), ServiceError> {
        let blob = serde_json::to_string(&self.ledger).map_err(ServiceError::storage)?;
        self.store.set(&self.key, blob).await
    }

    /// Drop every local edit and persist the empty ledger.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn reset(&mut self) -> Result<(), ServiceError> {
        self.ledger = EditLedger::default();
        self.save().await?;
        info!(event = "edits_reset", "local edits cleared");
        Ok(())
    }

    /// Append a locally created record, assigning it an id when absent.
    /// Returns the id the record ended up with.
    #[instrument(skip(self, record))]
    pub async fn record_addition(&mut self, record: Record) -> Result<String, ServiceError> {
        let record = assign_id(record);
        let id = record.id().unwrap_or_default().to_string();
        self.ledger.added.push(record);
        self.save().await?;
        info!(event = "record_added", %id, "entry added locally");
        Ok(id)
    }

    /// Edit the visible row with `id`. A local row is replaced in place; a
    /// remote row gets a pending update keyed by `id`, even when a hidden
    /// addition shares that id.
    #[instrument(skip(self, patch))]
    pub async fn record_update(&mut self, id: &str, patch: Record, origin: RowOrigin) -> Result<(), ServiceError> {
        let payload = patch.with_id(id);
        match (origin, self.ledger.added_position(id)) {
            (RowOrigin::Local, Some(idx)) => self.ledger.added[idx] = payload,
            _ => {
                self.ledger.updated.insert(id.to_string(), payload);
            }
        }
        self.save().await?;
        info!(event = "record_updated", %id, ?origin, "entry changes saved");
        Ok(())
    }

    /// Remove the visible row with `id`. Every addition carrying the id is
    /// dropped so none can resurface; a remote row is also marked deleted and
    /// its pending update discarded.
    #[instrument(skip(self))]
    pub async fn record_deletion(&mut self, id: &str, origin: RowOrigin) -> Result<(), ServiceError> {
        let before = self.ledger.added.len();
        self.ledger.added.retain(|r| r.id() != Some(id));
        let purged = before - self.ledger.added.len();
        if origin == RowOrigin::Remote || purged == 0 {
            if !self.ledger.is_deleted(id) {
                self.ledger.deleted.push(id.to_string());
            }
            self.ledger.updated.remove(id);
        }
        self.save().await?;
        info!(event = "record_deleted", %id, ?origin, purged, "entry deleted locally");
        Ok(())
    }
}
