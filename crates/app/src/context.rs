//! Request-scoped identity.
//!
//! The identity provider authenticates upstream and hands each request an
//! opaque user id. Every user account is its own tenant, so the user id is
//! also the isolation boundary for clients, invoices, and the subscription.

use billforge_core::{DomainError, DomainResult, TenantId, UserId};

/// The already-authenticated actor for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
}

impl CurrentUser {
    pub fn new(id: UserId) -> Self {
        Self { id }
    }

    /// The tenant this user's data lives under.
    pub fn tenant_id(&self) -> TenantId {
        TenantId::from(self.id)
    }
}

/// Absence of a user is an authorization failure, not a domain error.
pub fn require_user(user: Option<&CurrentUser>) -> DomainResult<TenantId> {
    user.map(CurrentUser::tenant_id)
        .ok_or(DomainError::Unauthorized)
}
