//! Storage abstractions for service layer
//!
//! The browser-side key-value store is modelled as [`KvStore`]: string keys,
//! serialized string values, plus a change feed that other holders of the
//! same store observe.

pub mod kv_store;
pub mod memory;
pub mod json_file;

pub use json_file::JsonFileKvStore;
pub use kv_store::{KvStore, StorageChange};
pub use memory::MemoryKvStore;
