use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::domain::{LoginInput, SessionEvent, SignupInput, UserRecord};
use super::errors::AuthError;
use super::repository::AccountRepository;
use crate::storage::StorageChange;

/// Signup / login / logout over an account repository.
///
/// Passwords are stored and compared in plaintext, there is no password
/// policy and no attempt limiting.
pub struct CredentialService<R: AccountRepository> {
    repo: Arc<R>,
}

impl<R: AccountRepository> CredentialService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create an account. Does not sign the user in.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{CredentialService, repository::KvAccountRepository, domain::SignupInput};
    /// use service::storage::MemoryKvStore;
    /// use std::sync::Arc;
    /// let repo = Arc::new(KvAccountRepository::new(Arc::new(MemoryKvStore::new()), "users", "currentUser"));
    /// let svc = CredentialService::new(repo);
    /// let user = tokio_test::block_on(svc.signup(SignupInput { username: "alice".into(), password: "pw1".into() })).unwrap();
    /// assert_eq!(user.username, "alice");
    /// assert!(!tokio_test::block_on(svc.is_authenticated()).unwrap());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn signup(&self, input: SignupInput) -> Result<UserRecord, AuthError> {
        let mut users = self.repo.load_users().await?;
        if users.iter().any(|u| u.username == input.username) {
            debug!("username taken");
            return Err(AuthError::DuplicateUsername);
        }
        let user = UserRecord::new(input.username, input.password);
        users.push(user.clone());
        self.repo.save_users(&users).await?;
        info!(event = "user_registered", username = %user.username, "account created");
        Ok(user)
    }

    /// Check credentials and install the session marker.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthError, CredentialService, repository::KvAccountRepository};
    /// use service::auth::domain::{LoginInput, SignupInput};
    /// use service::storage::MemoryKvStore;
    /// use std::sync::Arc;
    /// let repo = Arc::new(KvAccountRepository::new(Arc::new(MemoryKvStore::new()), "users", "currentUser"));
    /// let svc = CredentialService::new(repo);
    /// tokio_test::block_on(svc.signup(SignupInput { username: "alice".into(), password: "pw1".into() })).unwrap();
    /// let err = tokio_test::block_on(svc.login(LoginInput { username: "alice".into(), password: "nope".into() })).unwrap_err();
    /// assert!(matches!(err, AuthError::WrongPassword));
    /// let user = tokio_test::block_on(svc.login(LoginInput { username: "alice".into(), password: "pw1".into() })).unwrap();
    /// assert_eq!(user.username, "alice");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<UserRecord, AuthError> {
        let users = self.repo.load_users().await?;
        let user = users
            .into_iter()
            .find(|u| u.username == input.username)
            .ok_or(AuthError::UnknownUser)?;
        if user.password != input.password {
            return Err(AuthError::WrongPassword);
        }
        self.repo.set_session(&user).await?;
        info!(event = "user_logged_in", username = %user.username, "session started");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.repo.clear_session().await?;
        info!(event = "user_logged_out", "session ended");
        Ok(())
    }

    pub async fn current_user(&self) -> Result<Option<UserRecord>, AuthError> {
        self.repo.session().await
    }

    pub async fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.current_user().await?.is_some())
    }

    /// Interpret a storage notification: clearing the session key means the
    /// user was signed out elsewhere.
    pub fn session_event(&self, change: &StorageChange) -> Option<SessionEvent> {
        (change.key == self.repo.session_key() && change.new_value.is_none())
            .then_some(SessionEvent::LoggedOutExternally)
    }
}
