//! Remote catalog retrieval: a primary endpoint with a static-file fallback.

pub mod source;
pub mod fetcher;

pub use fetcher::FallbackFetcher;
pub use source::{FileSource, HttpSource, RemoteSource};
