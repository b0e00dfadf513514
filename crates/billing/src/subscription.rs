use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billforge_core::{Entity, EntityId, TenantId};
use billforge_tiers::{Tier, tier_from_price_id};

use crate::event::SubscriptionSnapshot;

/// Subscription identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub EntityId);

impl SubscriptionId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(EntityId::new())
    }
}

impl core::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Provider-side subscription status, mirrored locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    Canceled,
    Incomplete,
    IncompleteExpired,
    PastDue,
    Unpaid,
    Paused,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Paused => "paused",
        }
    }

    /// Only active or trialing subscriptions grant a paid tier.
    pub fn grants_paid_tier(self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

/// The one subscription record per tenant.
///
/// Invariant: `tenant_id` and `provider_customer_id` are each unique across
/// the store. Created lazily with status `Incomplete` when the provider
/// customer is provisioned; every later mutation comes from provider events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub tenant_id: TenantId,
    pub provider_customer_id: String,
    pub provider_subscription_id: Option<String>,
    pub price_id: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Freshly provisioned record: a provider customer exists but no plan has
    /// been purchased yet.
    pub fn provisioned(
        id: SubscriptionId,
        tenant_id: TenantId,
        provider_customer_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            provider_customer_id: provider_customer_id.into(),
            provider_subscription_id: None,
            price_id: None,
            status: SubscriptionStatus::Incomplete,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Tier derived on demand. Never cached: staleness after a billing event
    /// is impossible because every read goes through this.
    pub fn tier(&self) -> Tier {
        if self.status.grants_paid_tier() {
            tier_from_price_id(self.price_id.as_deref())
        } else {
            Tier::Free
        }
    }

    /// Overwrite the provider-owned fields with a snapshot. Full-field
    /// assignment keeps redelivered events idempotent.
    pub fn apply_snapshot(&mut self, snapshot: &SubscriptionSnapshot, now: DateTime<Utc>) {
        self.provider_subscription_id = snapshot.provider_subscription_id.clone();
        self.price_id = snapshot.price_id.clone();
        self.status = snapshot.status;
        self.current_period_start = snapshot.current_period_start;
        self.current_period_end = snapshot.current_period_end;
        self.cancel_at_period_end = snapshot.cancel_at_period_end;
        self.updated_at = now;
    }

    /// The provider deleted the subscription: canceled, plan cleared.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Canceled;
        self.provider_subscription_id = None;
        self.price_id = None;
        self.updated_at = now;
    }

    /// A renewal payment failed.
    pub fn mark_past_due(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::PastDue;
        self.updated_at = now;
    }
}

impl Entity for Subscription {
    type Id = SubscriptionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
