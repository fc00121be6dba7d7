//! Catalog core: identifiers, the persisted edit ledger and the merge of
//! remote data with local edits.

pub mod identity;
pub mod ledger;
pub mod merge;

pub use identity::{assign_id, derive_key, random_id};
pub use ledger::{EditLedgerStore, RowOrigin};
pub use merge::merge;
