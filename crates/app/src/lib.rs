//! `billforge-app` — the usage & invoice lifecycle engine.
//!
//! Every user action runs as a short-lived, request-scoped operation:
//! authenticate, re-evaluate the relevant entitlement gate or lifecycle rule,
//! compute, then persist through the store boundary. Subscription state flows
//! in separately through [`Services::apply_billing_event`] and is only ever
//! read back as a derived tier.

pub mod billing;
pub mod clients;
pub mod context;
pub mod invoices;
pub mod numbering;
pub mod provider;
pub mod services;
pub mod sync;
pub mod templates;
pub mod usage;

pub use context::CurrentUser;
pub use provider::{BillingProvider, InMemoryBillingProvider, ProviderError, ProviderSubscription};
pub use services::Services;
pub use sync::SyncOutcome;
pub use usage::UsageStats;

#[cfg(test)]
pub(crate) mod testutil;
