use serde::{Deserialize, Serialize};

pub use models::UserRecord;

/// Signup input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupInput {
    pub username: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Authentication state of one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(UserRecord),
}

impl SessionState {
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            SessionState::Authenticated(u) => Some(u),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool { self.user().is_some() }
}

/// Session transitions observed through the storage change feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session marker was cleared by another holder of the store.
    LoggedOutExternally,
}
