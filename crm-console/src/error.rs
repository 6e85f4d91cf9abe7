use axum::response::{IntoResponse, Response};
use crm_access::{AuthError, ScopeError};
use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl From<ConsoleError> for AppError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::Auth(AuthError::InvalidCredentials) => {
                AppError::AuthError(anyhow::anyhow!("Invalid credentials"))
            }
            ConsoleError::Auth(AuthError::StorageUnavailable(e)) => {
                AppError::StorageError(anyhow::Error::new(e))
            }
            ConsoleError::Scope(ScopeError::UnknownOffice(id)) => {
                AppError::NotFound(anyhow::anyhow!("Unknown office: {}", id))
            }
            ConsoleError::Scope(ScopeError::Forbidden) => {
                AppError::Forbidden(anyhow::anyhow!("Office switching is not permitted"))
            }
        }
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
