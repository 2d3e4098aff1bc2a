pub mod auth_service;
pub mod finance_store;

pub use auth_service::AuthService;
pub use finance_store::FinanceStore;

use crate::errors::StorageError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    Invalid(String),
    #[error("no user is logged in")]
    NoActiveUser,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with email `{0}` already exists")]
    DuplicateEmail(String),
}

impl ServiceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ServiceError::Invalid(message.into())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Storage(StorageError::Serde(err))
    }
}
