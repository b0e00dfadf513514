//! Entitlement decisions: allowed, or denied with a user-facing reason.

use billforge_core::{DomainError, DomainResult};

/// Outcome of an entitlement check.
///
/// A denial always carries a reason naming the limit and the current plan so
/// the caller can render it and offer an upgrade path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    allowed: bool,
    reason: Option<String>,
}

impl Entitlement {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Turn a denial into a `DomainError::Denied` for mutation paths.
    pub fn into_result(self) -> DomainResult<()> {
        if self.allowed {
            Ok(())
        } else {
            Err(DomainError::denied(
                self.reason
                    .unwrap_or_else(|| "not allowed on the current plan".to_string()),
            ))
        }
    }
}
