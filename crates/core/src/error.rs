//! Domain error model.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business/domain failures. Every mutation
/// path returns one of these variants; the caller can always distinguish
/// malformed input (field-scoped), an entitlement denial (with an upgrade
/// reason), a state conflict, and an opaque upstream failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// User input failed validation; messages are scoped to the offending fields.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// An entitlement check denied the action. The reason names the limit and
    /// the current plan so the caller can offer an upgrade path.
    #[error("denied: {0}")]
    Denied(String),

    /// A requested resource was not found.
    ///
    /// Also returned for cross-tenant access so other tenants' ids never leak.
    #[error("not found")]
    NotFound,

    /// The input was well-formed but the operation is currently illegal
    /// (delete a non-draft invoice, duplicate invoice number at write time).
    #[error("conflict: {0}")]
    Conflict(String),

    /// No authenticated user for the request.
    #[error("unauthorized")]
    Unauthorized,

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Storage failed; surfaced as an opaque "try again" condition.
    #[error("storage error: {0}")]
    Storage(String),

    /// The billing provider call failed.
    #[error("billing provider error: {0}")]
    Provider(String),
}

impl DomainError {
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }

    /// Validation error for a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied(reason.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
