use thiserror::Error;

use crate::storage::StorageError;

/// Login failures. Both are recoverable: the caller re-prompts or retries.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

impl AuthError {
    /// Whether the user can fix this by re-entering the form.
    pub fn is_form_error(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials)
    }
}

/// Rejected office switches. The active office is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Unknown office: {0}")]
    UnknownOffice(String),

    #[error("Office switching is not permitted for this profile")]
    Forbidden,
}

/// Invalid static office configuration, rejected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("At least one office must be configured")]
    NoOffices,

    #[error("Duplicate office id: {0}")]
    DuplicateOffice(String),
}
