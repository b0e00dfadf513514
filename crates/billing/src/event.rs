//! Typed billing-provider lifecycle events.
//!
//! Signature verification happens before events reach this module; the
//! decoder only turns a verified `{type, data}` pair into the closed
//! [`BillingEvent`] enum. Event types outside the handled set decode to
//! [`BillingEvent::Other`] and are ignored downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subscription::SubscriptionStatus;

/// Point-in-time subscription state carried by created/updated events,
/// keyed by the provider customer id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub provider_customer_id: String,
    pub provider_subscription_id: Option<String>,
    pub price_id: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

/// Provider lifecycle event, already signature-verified upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingEvent {
    SubscriptionCreated(SubscriptionSnapshot),
    SubscriptionUpdated(SubscriptionSnapshot),
    /// Keyed by the provider subscription id, not the customer id.
    SubscriptionDeleted { provider_subscription_id: String },
    PaymentSucceeded {
        provider_customer_id: String,
        provider_subscription_id: Option<String>,
    },
    PaymentFailed { provider_customer_id: String },
    /// Anything the sync does not handle; logged and skipped.
    Other { event_type: String },
}

impl BillingEvent {
    /// Provider event-type string, for logging.
    pub fn event_type(&self) -> &str {
        match self {
            BillingEvent::SubscriptionCreated(_) => "customer.subscription.created",
            BillingEvent::SubscriptionUpdated(_) => "customer.subscription.updated",
            BillingEvent::SubscriptionDeleted { .. } => "customer.subscription.deleted",
            BillingEvent::PaymentSucceeded { .. } => "invoice.payment_succeeded",
            BillingEvent::PaymentFailed { .. } => "invoice.payment_failed",
            BillingEvent::Other { event_type } => event_type,
        }
    }

    /// Customer id the event is keyed by, when it has one; for logging.
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            BillingEvent::SubscriptionCreated(snapshot)
            | BillingEvent::SubscriptionUpdated(snapshot) => {
                Some(&snapshot.provider_customer_id)
            }
            BillingEvent::PaymentSucceeded {
                provider_customer_id,
                ..
            }
            | BillingEvent::PaymentFailed {
                provider_customer_id,
            } => Some(provider_customer_id),
            BillingEvent::SubscriptionDeleted { .. } | BillingEvent::Other { .. } => None,
        }
    }

    /// Decode a verified webhook `{type, data}` pair.
    ///
    /// Unknown event types decode to `Other`; a malformed payload for a
    /// handled type is an error (the feed promised well-typed events).
    pub fn from_webhook(
        event_type: &str,
        data: &serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        match event_type {
            "customer.subscription.created" => {
                let payload: SubscriptionPayload = serde_json::from_value(data.clone())?;
                Ok(BillingEvent::SubscriptionCreated(payload.into_snapshot()))
            }
            "customer.subscription.updated" => {
                let payload: SubscriptionPayload = serde_json::from_value(data.clone())?;
                Ok(BillingEvent::SubscriptionUpdated(payload.into_snapshot()))
            }
            "customer.subscription.deleted" => {
                let payload: SubscriptionPayload = serde_json::from_value(data.clone())?;
                Ok(BillingEvent::SubscriptionDeleted {
                    provider_subscription_id: payload.id,
                })
            }
            "invoice.payment_succeeded" => {
                let payload: PaymentPayload = serde_json::from_value(data.clone())?;
                Ok(BillingEvent::PaymentSucceeded {
                    provider_customer_id: payload.customer,
                    provider_subscription_id: payload.subscription,
                })
            }
            "invoice.payment_failed" => {
                let payload: PaymentPayload = serde_json::from_value(data.clone())?;
                Ok(BillingEvent::PaymentFailed {
                    provider_customer_id: payload.customer,
                })
            }
            other => Ok(BillingEvent::Other {
                event_type: other.to_string(),
            }),
        }
    }
}

/// Wire shape of a provider subscription object, reduced to the fields the
/// sync consumes. Period bounds arrive as unix seconds.
#[derive(Debug, Deserialize)]
struct SubscriptionPayload {
    id: String,
    customer: String,
    status: SubscriptionStatus,
    #[serde(default)]
    price_id: Option<String>,
    #[serde(default)]
    current_period_start: Option<i64>,
    #[serde(default)]
    current_period_end: Option<i64>,
    #[serde(default)]
    cancel_at_period_end: bool,
}

impl SubscriptionPayload {
    fn into_snapshot(self) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            provider_customer_id: self.customer,
            provider_subscription_id: Some(self.id),
            price_id: self.price_id,
            status: self.status,
            current_period_start: self.current_period_start.and_then(from_unix),
            current_period_end: self.current_period_end.and_then(from_unix),
            cancel_at_period_end: self.cancel_at_period_end,
        }
    }
}

/// Wire shape of a provider payment event.
#[derive(Debug, Deserialize)]
struct PaymentPayload {
    customer: String,
    #[serde(default)]
    subscription: Option<String>,
}

fn from_unix(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}
