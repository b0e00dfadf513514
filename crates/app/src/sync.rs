//! Subscription reconciliation from billing-provider events.
//!
//! Events arrive verified and typed. Every apply is an idempotent,
//! full-field write keyed by provider customer id or provider subscription
//! id; redelivering an event leaves the record exactly as the first
//! delivery did. A key with no local record is a logged no-op — this path
//! never fabricates a subscription.

use chrono::{DateTime, Utc};

use billforge_billing::{BillingEvent, SubscriptionSnapshot};
use billforge_core::DomainResult;
use billforge_store::Store;

use crate::provider::BillingProvider;
use crate::services::Services;

/// What applying one event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The local subscription record was written.
    Applied,
    /// The event's key matched no local record; nothing was written.
    NoMatchingSubscription,
    /// The event carries nothing for this core (unknown type, or a payment
    /// event with no subscription to refresh).
    Ignored,
}

impl<S: Store, P: BillingProvider> Services<S, P> {
    /// Apply one provider event to the local subscription record.
    pub fn apply_billing_event(
        &self,
        event: &BillingEvent,
        now: DateTime<Utc>,
    ) -> DomainResult<SyncOutcome> {
        match event {
            BillingEvent::SubscriptionCreated(snapshot)
            | BillingEvent::SubscriptionUpdated(snapshot) => self.upsert_snapshot(snapshot, now),

            BillingEvent::SubscriptionDeleted {
                provider_subscription_id,
            } => {
                let Some(mut subscription) = self
                    .store
                    .subscription_by_provider_id(provider_subscription_id)?
                else {
                    tracing::warn!(
                        subscription_id = %provider_subscription_id,
                        "subscription deleted event matched no local record"
                    );
                    return Ok(SyncOutcome::NoMatchingSubscription);
                };
                subscription.mark_deleted(now);
                self.store.update_subscription(subscription)?;
                Ok(SyncOutcome::Applied)
            }

            BillingEvent::PaymentSucceeded {
                provider_customer_id,
                provider_subscription_id,
            } => {
                let Some(mut subscription) =
                    self.store.subscription_by_customer(provider_customer_id)?
                else {
                    tracing::warn!(
                        customer_id = %provider_customer_id,
                        "payment succeeded event matched no local record"
                    );
                    return Ok(SyncOutcome::NoMatchingSubscription);
                };

                let Some(subscription_id) = provider_subscription_id
                    .clone()
                    .or_else(|| subscription.provider_subscription_id.clone())
                else {
                    tracing::warn!(
                        customer_id = %provider_customer_id,
                        "payment succeeded without a subscription to refresh"
                    );
                    return Ok(SyncOutcome::Ignored);
                };

                // Refresh from live provider state rather than trusting the
                // payment event's own staleness.
                let live = self.provider.retrieve_subscription(&subscription_id)?;
                subscription.status = live.status;
                subscription.current_period_start = live.current_period_start;
                subscription.current_period_end = live.current_period_end;
                subscription.updated_at = now;
                self.store.update_subscription(subscription)?;
                Ok(SyncOutcome::Applied)
            }

            BillingEvent::PaymentFailed {
                provider_customer_id,
            } => {
                let Some(mut subscription) =
                    self.store.subscription_by_customer(provider_customer_id)?
                else {
                    tracing::warn!(
                        customer_id = %provider_customer_id,
                        "payment failed event matched no local record"
                    );
                    return Ok(SyncOutcome::NoMatchingSubscription);
                };
                subscription.mark_past_due(now);
                self.store.update_subscription(subscription)?;
                Ok(SyncOutcome::Applied)
            }

            BillingEvent::Other { event_type } => {
                tracing::info!(%event_type, "ignoring unhandled billing event");
                Ok(SyncOutcome::Ignored)
            }
        }
    }

    /// Apply a batch, one event at a time. A failing event is logged with
    /// enough context to replay it manually and never blocks the rest.
    pub fn apply_billing_events(
        &self,
        events: &[BillingEvent],
        now: DateTime<Utc>,
    ) -> Vec<DomainResult<SyncOutcome>> {
        events
            .iter()
            .map(|event| {
                let result = self.apply_billing_event(event, now);
                if let Err(err) = &result {
                    tracing::error!(
                        event_type = event.event_type(),
                        customer_id = event.customer_id().unwrap_or("-"),
                        error = %err,
                        "failed to process billing event"
                    );
                }
                result
            })
            .collect()
    }

    fn upsert_snapshot(
        &self,
        snapshot: &SubscriptionSnapshot,
        now: DateTime<Utc>,
    ) -> DomainResult<SyncOutcome> {
        let Some(mut subscription) = self
            .store
            .subscription_by_customer(&snapshot.provider_customer_id)?
        else {
            tracing::warn!(
                customer_id = %snapshot.provider_customer_id,
                "subscription event matched no local record"
            );
            return Ok(SyncOutcome::NoMatchingSubscription);
        };

        subscription.apply_snapshot(snapshot, now);
        self.store.update_subscription(subscription)?;
        Ok(SyncOutcome::Applied)
    }
}
