//! Outbound billing-provider surface.
//!
//! The engine calls the provider synchronously from user-facing billing
//! actions and from the payment-succeeded sync path; each call is a single
//! round trip with no retry here.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use thiserror::Error;

use billforge_billing::SubscriptionStatus;
use billforge_core::{DomainError, TenantId};

/// A billing-provider call failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("billing provider error: {0}")]
pub struct ProviderError(pub String);

impl From<ProviderError> for DomainError {
    fn from(err: ProviderError) -> Self {
        DomainError::Provider(err.0)
    }
}

/// Live subscription state as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSubscription {
    pub id: String,
    pub customer_id: String,
    pub price_id: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

pub trait BillingProvider: Send + Sync {
    /// Provision a customer record at the provider; returns its id.
    fn create_customer(
        &self,
        email: &str,
        name: Option<&str>,
        tenant_id: TenantId,
    ) -> Result<String, ProviderError>;

    /// Hosted checkout URL for purchasing `price_id`.
    fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<String, ProviderError>;

    /// Hosted self-service portal URL.
    fn create_portal_session(&self, customer_id: &str) -> Result<String, ProviderError>;

    /// Fetch the live subscription snapshot.
    fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, ProviderError>;
}

/// In-memory provider.
///
/// Intended for tests/dev: deterministic customer ids, canned URLs, and
/// subscription snapshots served from a preloaded table.
#[derive(Debug, Default)]
pub struct InMemoryBillingProvider {
    subscriptions: RwLock<HashMap<String, ProviderSubscription>>,
    next_customer: AtomicU64,
}

impl InMemoryBillingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload the snapshot `retrieve_subscription` should serve.
    pub fn put_subscription(&self, subscription: ProviderSubscription) {
        if let Ok(mut subscriptions) = self.subscriptions.write() {
            subscriptions.insert(subscription.id.clone(), subscription);
        }
    }
}

impl BillingProvider for InMemoryBillingProvider {
    fn create_customer(
        &self,
        _email: &str,
        _name: Option<&str>,
        _tenant_id: TenantId,
    ) -> Result<String, ProviderError> {
        let n = self.next_customer.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(format!("cus_{n:04}"))
    }

    fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<String, ProviderError> {
        Ok(format!(
            "https://billing.example/checkout/{customer_id}/{price_id}"
        ))
    }

    fn create_portal_session(&self, customer_id: &str) -> Result<String, ProviderError> {
        Ok(format!("https://billing.example/portal/{customer_id}"))
    }

    fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, ProviderError> {
        let subscriptions = self
            .subscriptions
            .read()
            .map_err(|_| ProviderError("provider state unavailable".to_string()))?;
        subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| ProviderError(format!("unknown subscription: {subscription_id}")))
    }
}
