//! Service layer of the API directory.
//! - Key-value persistence behind a trait, with in-memory and file-backed stores.
//! - Catalog core: identifiers, the local edit ledger and the merge with remote data.
//! - View pipeline (search, filters, sort, pagination) and export.
//! - Plaintext credential store gating the browse controller.

pub mod errors;
pub mod storage;
pub mod catalog;
pub mod view;
pub mod remote;
pub mod auth;
pub mod export;
pub mod directory;

pub use directory::{Directory, DirectoryError};
