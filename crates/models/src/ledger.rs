use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Local-only divergence from the remote catalog.
///
/// An id listed in `deleted` hides the record even when `updated` also holds
/// an entry for it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EditLedger {
    #[serde(default)]
    pub added: Vec<Record>,
    #[serde(default)]
    pub updated: BTreeMap<String, Record>,
    #[serde(default)]
    pub deleted: Vec<String>,
}

impl EditLedger {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Index of a locally added record with the given id.
    pub fn added_position(&self, id: &str) -> Option<usize> {
        self.added.iter().position(|r| r.id() == Some(id))
    }

    pub fn is_deleted(&self, id: &str) -> bool {
        self.deleted.iter().any(|d| d == id)
    }
}
