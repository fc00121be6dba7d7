//! Data model shared by the service layer: catalog records, form drafts,
//! the local edit ledger and user accounts.

pub mod errors;
pub mod record;
pub mod draft;
pub mod ledger;
pub mod user;

pub use draft::RecordDraft;
pub use ledger::EditLedger;
pub use record::Record;
pub use user::UserRecord;
