//! API directory: browse a public API catalog with local, unsynchronized edits.
//!
//! This crate wires the workspace together: it opens the configured store,
//! builds the login-page credential service and runs the browse-page load
//! sequence.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

pub use common::utils::logging::{init_logging_default, init_logging_json};
pub use configs::AppConfig;
pub use models::{EditLedger, Record, RecordDraft, UserRecord};
pub use service::auth::{domain, AuthError, CredentialService};
pub use service::auth::repository::KvAccountRepository;
pub use service::directory::{Directory, DirectoryError};
pub use service::remote::FallbackFetcher;
pub use service::storage::{JsonFileKvStore, KvStore, MemoryKvStore, StorageChange};
pub use service::view::{AuthFilter, PageNav, SortDirection, SortKey, ViewPage, ViewState};

/// Open the file-backed store named in the configuration.
pub async fn open_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = JsonFileKvStore::new(cfg.storage.data_file.clone())
        .await
        .with_context(|| format!("cannot open storage file {}", cfg.storage.data_file.display()))?;
    Ok(store)
}

/// Credential service for the login / signup page.
pub fn credentials(store: Arc<dyn KvStore>, cfg: &AppConfig) -> CredentialService<KvAccountRepository> {
    let repo = KvAccountRepository::new(store, cfg.storage.users_key.clone(), cfg.storage.session_key.clone());
    CredentialService::new(Arc::new(repo))
}

/// Browse-page start-up: require a session, then load edits and the catalog.
pub async fn open_directory(store: Arc<dyn KvStore>, cfg: &AppConfig) -> anyhow::Result<Directory> {
    let fetcher = FallbackFetcher::from_config(&cfg.remote).context("cannot build remote fetcher")?;
    let mut directory = Directory::open(store, cfg).await?;
    directory.load(&fetcher).await;
    info!(
        event = "directory_ready",
        rows = directory.dataset().len(),
        load_failed = directory.load_failed(),
        "browse page ready"
    );
    Ok(directory)
}
