use thiserror::Error;

/// Business errors for credential workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("User does not exist. Please sign up first.")]
    UnknownUser,
    #[error("Incorrect password.")]
    WrongPassword,
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::DuplicateUsername => 1002,
            AuthError::UnknownUser => 1003,
            AuthError::WrongPassword => 1004,
            AuthError::Repository(_) => 1200,
        }
    }
}

impl From<crate::errors::ServiceError> for AuthError {
    fn from(e: crate::errors::ServiceError) -> Self { AuthError::Repository(e.to_string()) }
}
