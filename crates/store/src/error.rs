//! Storage error model.

use thiserror::Error;

use billforge_core::DomainError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record under the given tenant + id.
    #[error("record not found")]
    NotFound,

    /// The `(tenant, invoice number)` uniqueness constraint fired. Retryable:
    /// recompute the number and try again, or surface it against the field.
    #[error("invoice number already exists: {0}")]
    DuplicateInvoiceNumber(String),

    /// A tenant already has a subscription record (or the provider customer
    /// id is already taken).
    #[error("subscription already exists")]
    DuplicateSubscription,

    /// A record with this id already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend failed; callers surface this as an opaque "try again".
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound,
            StoreError::DuplicateInvoiceNumber(number) => {
                DomainError::Conflict(format!("invoice number already exists: {number}"))
            }
            StoreError::DuplicateSubscription => {
                DomainError::Conflict("subscription already exists".to_string())
            }
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::Unavailable(msg) => DomainError::Storage(msg),
        }
    }
}
