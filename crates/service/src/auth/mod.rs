//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Plaintext username/password accounts and the session marker, both kept
//! in the per-user key-value store.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;

pub use errors::AuthError;
pub use service::CredentialService;
