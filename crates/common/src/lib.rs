//! Shared pieces used by every crate in the workspace: the remote-fetch
//! error type and logging initialisation.

use thiserror::Error;

pub mod utils;

/// Failure while retrieving the remote catalog from one source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {status} from {source_name}")]
    Status { source_name: String, status: u16 },
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Short label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Status { .. } => "status",
            FetchError::Io(_) => "io",
            FetchError::Parse(_) => "parse",
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self { FetchError::Parse(e.to_string()) }
}
