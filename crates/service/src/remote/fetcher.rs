use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use common::FetchError;
use configs::RemoteConfig;
use models::Record;

use super::source::{FileSource, HttpSource, RemoteSource};

/// Primary source with a single fallback.
///
/// There is no retry loop: any primary failure goes straight to the
/// secondary, and a secondary failure is returned to the caller.
#[derive(Clone)]
pub struct FallbackFetcher {
    primary: Arc<dyn RemoteSource>,
    secondary: Arc<dyn RemoteSource>,
}

impl FallbackFetcher {
    pub fn new(primary: Arc<dyn RemoteSource>, secondary: Arc<dyn RemoteSource>) -> Self {
        Self { primary, secondary }
    }

    /// HTTP endpoint with the static file as fallback, as configured.
    pub fn from_config(cfg: &RemoteConfig) -> Result<Self, FetchError> {
        let timeout = cfg.request_timeout_secs.map(Duration::from_secs);
        let primary = HttpSource::new(cfg.primary_url.clone(), timeout)?;
        let secondary = FileSource::new(cfg.fallback_path.clone());
        Ok(Self::new(Arc::new(primary), Arc::new(secondary)))
    }

    #[instrument(skip(self), fields(primary = %self.primary.name(), secondary = %self.secondary.name()))]
    pub async fn fetch(&self) -> Result<Vec<Record>, FetchError> {
        match self.primary.fetch_entries().await {
            Ok(entries) => {
                info!(event = "remote_loaded", source = "primary", count = entries.len(), "catalog loaded");
                Ok(entries)
            }
            Err(e) => {
                warn!(event = "remote_fallback", error = %e, kind = e.kind(), "primary source failed, falling back to static copy");
                let entries = self.secondary.fetch_entries().await?;
                info!(event = "remote_loaded", source = "secondary", count = entries.len(), "catalog loaded");
                Ok(entries)
            }
        }
    }
}
