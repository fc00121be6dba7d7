//! Browse-page controller.
//!
//! [`Directory`] owns all state of one browsing session: the admitted remote
//! records, the edit ledger, the merged working dataset and the view
//! selection. Every edit persists the ledger first and then rebuilds the
//! dataset from scratch.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, instrument, warn};

use configs::AppConfig;
use models::errors::ModelError;
use models::{EditLedger, Record, RecordDraft, UserRecord};

use crate::auth::domain::{SessionEvent, SessionState};
use crate::auth::repository::KvAccountRepository;
use crate::auth::{AuthError, CredentialService};
use crate::catalog::{assign_id, merge, EditLedgerStore, RowOrigin};
use crate::errors::ServiceError;
use crate::export;
use crate::remote::FallbackFetcher;
use crate::storage::{KvStore, StorageChange};
use crate::view::{self, AuthFilter, PageNav, Pagination, SortKey, ViewPage, ViewState};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("You must be logged in to access this page.")]
    NotAuthenticated,
    /// Form input rejected before any edit was recorded.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<ModelError> for DirectoryError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => DirectoryError::Validation(msg),
            other => DirectoryError::Service(other.into()),
        }
    }
}

pub struct Directory {
    store: Arc<dyn KvStore>,
    credentials: CredentialService<KvAccountRepository>,
    session: SessionState,
    edits: EditLedgerStore,
    remote: Vec<Record>,
    dataset: Vec<Record>,
    view: ViewState,
    load_failed: bool,
}

impl Directory {
    /// Open the browse page. Requires a session marker in the store.
    #[instrument(skip_all)]
    pub async fn open(store: Arc<dyn KvStore>, cfg: &AppConfig) -> Result<Self, DirectoryError> {
        let repo = KvAccountRepository::new(store.clone(), cfg.storage.users_key.clone(), cfg.storage.session_key.clone());
        let credentials = CredentialService::new(Arc::new(repo));
        let user = credentials.current_user().await?.ok_or(DirectoryError::NotAuthenticated)?;
        info!(event = "directory_opened", username = %user.username, "browse page opened");

        Ok(Self {
            edits: EditLedgerStore::new(store.clone(), cfg.storage.ledger_key.clone()),
            store,
            credentials,
            session: SessionState::Authenticated(user),
            remote: Vec::new(),
            dataset: Vec::new(),
            view: ViewState::new(cfg.view.per_page),
            load_failed: false,
        })
    }

    /// Load saved edits and the remote catalog, then build the dataset.
    ///
    /// A total fetch failure is not an error: the remote set becomes empty,
    /// [`Directory::load_failed`] turns true and local additions stay usable.
    #[instrument(skip_all)]
    pub async fn load(&mut self, fetcher: &FallbackFetcher) {
        self.load_failed = false;
        self.edits.load().await;
        match fetcher.fetch().await {
            Ok(entries) => {
                self.remote = entries.into_iter().map(assign_id).collect();
            }
            Err(e) => {
                error!(event = "remote_unavailable", error = %e, "failed to fetch data");
                self.load_failed = true;
                self.remote = Vec::new();
            }
        }
        self.rebuild();
    }

    /// Run the load sequence again, e.g. after a failed fetch.
    pub async fn retry(&mut self, fetcher: &FallbackFetcher) {
        self.load(fetcher).await;
    }

    pub fn load_failed(&self) -> bool { self.load_failed }

    pub fn user(&self) -> Option<&UserRecord> { self.session.user() }

    pub fn dataset(&self) -> &[Record] { &self.dataset }

    pub fn remote(&self) -> &[Record] { &self.remote }

    pub fn ledger(&self) -> &EditLedger { self.edits.ledger() }

    pub fn view_state(&self) -> &ViewState { &self.view }

    /// Current page of the view; clamps the stored page number.
    pub fn view(&mut self) -> Result<ViewPage, DirectoryError> {
        self.guard()?;
        Ok(view::derive_view(&self.dataset, &mut self.view))
    }

    /// Categories present in the working dataset, for the filter choices.
    pub fn categories(&self) -> Vec<String> {
        view::categories(&self.dataset)
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.view.search = query.into();
        self.view.page = 1;
    }

    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.view.filters.category = category;
        self.view.page = 1;
    }

    /// `"true"` / `"false"`, or `None` to show both.
    pub fn set_https_filter(&mut self, https: Option<String>) {
        self.view.filters.https = https;
        self.view.page = 1;
    }

    pub fn set_auth_filter(&mut self, auth: Option<AuthFilter>) {
        self.view.filters.auth = auth;
        self.view.page = 1;
    }

    pub fn set_per_page(&mut self, per_page: usize) -> Result<(), DirectoryError> {
        if per_page == 0 {
            return Err(ServiceError::Validation("per page must be at least 1".into()).into());
        }
        self.view.per_page = per_page;
        self.view.page = 1;
        Ok(())
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.view.toggle_sort(key);
    }

    /// Apply a pager action. `Last` counts pages of the current filtered set.
    pub fn navigate(&mut self, nav: PageNav) {
        let pager = Pagination { page: self.view.page, per_page: self.view.per_page };
        let page_count = match nav {
            PageNav::Last => Pagination::page_count(view::working_set(&self.dataset, &self.view).len(), self.view.per_page),
            _ => 0,
        };
        self.view.page = pager.navigate(nav, page_count);
    }

    /// Add an entry from the create form; returns its id.
    #[instrument(skip(self, draft), fields(api = %draft.api))]
    pub async fn add(&mut self, draft: &RecordDraft) -> Result<String, DirectoryError> {
        self.guard()?;
        let record = draft.to_new_record()?;
        let id = self.edits.record_addition(record).await?;
        self.rebuild();
        Ok(id)
    }

    /// Save the edit form for the row with `id`.
    #[instrument(skip(self, draft))]
    pub async fn update(&mut self, id: &str, draft: &RecordDraft) -> Result<(), DirectoryError> {
        self.guard()?;
        let payload = draft.to_update(id)?;
        let origin = self.origin_of(id)?;
        self.edits.record_update(id, payload, origin).await?;
        self.rebuild();
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: &str) -> Result<(), DirectoryError> {
        self.guard()?;
        let origin = self.origin_of(id)?;
        self.edits.record_deletion(id, origin).await?;
        self.rebuild();
        Ok(())
    }

    /// Discard every local edit.
    pub async fn reset_edits(&mut self) -> Result<(), DirectoryError> {
        self.guard()?;
        self.edits.reset().await?;
        self.rebuild();
        Ok(())
    }

    /// JSON snapshot of the filtered and sorted rows, all pages.
    pub fn export_json(&self) -> Result<String, DirectoryError> {
        self.guard()?;
        Ok(export::to_json(&view::working_set(&self.dataset, &self.view))?)
    }

    pub async fn write_export(&self, path: &Path) -> Result<(), DirectoryError> {
        self.guard()?;
        export::write_json(&view::working_set(&self.dataset, &self.view), path).await?;
        info!(event = "view_exported", path = %path.display(), "export written");
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<(), DirectoryError> {
        self.credentials.logout().await?;
        self.session = SessionState::Anonymous;
        Ok(())
    }

    /// Subscribe to changes made by any holder of the same store.
    pub fn storage_changes(&self) -> broadcast::Receiver<StorageChange> {
        self.store.subscribe()
    }

    /// React to a storage notification. Clearing the session marker while
    /// signed in forces this controller out.
    pub fn handle_storage_change(&mut self, change: &StorageChange) -> Option<SessionEvent> {
        let event = self.credentials.session_event(change)?;
        if !self.session.is_authenticated() {
            return None;
        }
        warn!(event = "forced_logout", "session cleared elsewhere; signing out");
        self.session = SessionState::Anonymous;
        Some(event)
    }

    /// Wait for the next session event on `feed`, handling everything that
    /// arrives before it. Returns `None` once the feed closes.
    pub async fn next_session_event(&mut self, feed: &mut broadcast::Receiver<StorageChange>) -> Option<SessionEvent> {
        loop {
            match feed.recv().await {
                Ok(change) => {
                    if let Some(event) = self.handle_storage_change(&change) {
                        return Some(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "storage change feed lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn rebuild(&mut self) {
        self.dataset = merge(&self.remote, self.edits.ledger());
        debug!(remote = self.remote.len(), rows = self.dataset.len(), "dataset rebuilt");
    }

    fn guard(&self) -> Result<(), DirectoryError> {
        if self.session.is_authenticated() { Ok(()) } else { Err(DirectoryError::NotAuthenticated) }
    }

    /// Resolve `id` to the row merge shows for it.
    fn origin_of(&self, id: &str) -> Result<RowOrigin, DirectoryError> {
        if !self.dataset.iter().any(|r| r.id() == Some(id)) {
            return Err(ServiceError::not_found("record").into());
        }
        let remote_live = !self.edits.ledger().is_deleted(id) && self.remote.iter().any(|r| r.id() == Some(id));
        Ok(if remote_live { RowOrigin::Remote } else { RowOrigin::Local })
    }
}
