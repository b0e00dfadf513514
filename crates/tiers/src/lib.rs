//! Subscription tiers: plan levels, usage limits, and feature access.
//!
//! Everything in this crate is a pure function of its inputs. The current
//! tier itself is always derived on demand from the subscription record,
//! never stored or cached.

pub mod entitlement;
pub mod template;
pub mod tier;

pub use entitlement::Entitlement;
pub use template::InvoiceTemplate;
pub use tier::{Tier, TierLimits, limits_for, tier_from_price_id};
