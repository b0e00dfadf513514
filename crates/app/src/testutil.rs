//! Shared helpers for the engine's unit tests.

use chrono::{DateTime, Utc};

use billforge_billing::{BillingEvent, SubscriptionSnapshot, SubscriptionStatus};
use billforge_clients::ClientInput;
use billforge_core::UserId;
use billforge_invoicing::{InvoiceDraft, LineItemDraft};
use billforge_store::InMemoryStore;

use crate::context::CurrentUser;
use crate::provider::InMemoryBillingProvider;
use crate::services::Services;

pub(crate) fn services() -> Services<InMemoryStore, InMemoryBillingProvider> {
    Services::new(InMemoryStore::new(), InMemoryBillingProvider::new())
}

pub(crate) fn test_user() -> CurrentUser {
    CurrentUser::new(UserId::new())
}

/// A deterministic "now" so month boundaries stay where the tests expect.
pub(crate) fn fixed_now() -> DateTime<Utc> {
    "2026-08-06T12:00:00Z".parse().unwrap()
}

pub(crate) fn client_input(name: &str) -> ClientInput {
    ClientInput {
        name: name.to_string(),
        ..ClientInput::default()
    }
}

/// A valid one-line draft; pass an empty number when the engine assigns one.
pub(crate) fn invoice_draft(number: &str) -> InvoiceDraft {
    InvoiceDraft {
        client_id: None,
        number: number.to_string(),
        issue_date: Some("2026-08-01".parse().unwrap()),
        due_date: Some("2026-08-31".parse().unwrap()),
        tax_rate: None,
        notes: None,
        items: vec![LineItemDraft {
            description: "Consulting".to_string(),
            quantity: "1".to_string(),
            unit_price: "100.00".to_string(),
        }],
    }
}

pub(crate) fn pro_snapshot(customer_id: &str) -> SubscriptionSnapshot {
    SubscriptionSnapshot {
        provider_customer_id: customer_id.to_string(),
        provider_subscription_id: Some("sub_pro".to_string()),
        price_id: Some("price_pro_monthly".to_string()),
        status: SubscriptionStatus::Active,
        current_period_start: Some("2026-08-01T00:00:00Z".parse().unwrap()),
        current_period_end: Some("2026-09-01T00:00:00Z".parse().unwrap()),
        cancel_at_period_end: false,
    }
}

/// Provision a customer and activate a Pro subscription through the public
/// event path.
pub(crate) fn pro_tenant(
    services: &Services<InMemoryStore, InMemoryBillingProvider>,
    user: &CurrentUser,
    now: DateTime<Utc>,
) -> String {
    let customer_id = services
        .ensure_customer(Some(user), "owner@studio.test", None, now)
        .unwrap();
    services
        .apply_billing_event(
            &BillingEvent::SubscriptionCreated(pro_snapshot(&customer_id)),
            now,
        )
        .unwrap();
    customer_id
}

/// Same as [`pro_tenant`] but on the Enterprise plan.
pub(crate) fn enterprise_tenant(
    services: &Services<InMemoryStore, InMemoryBillingProvider>,
    user: &CurrentUser,
    now: DateTime<Utc>,
) -> String {
    let customer_id = services
        .ensure_customer(Some(user), "owner@studio.test", None, now)
        .unwrap();
    let mut snapshot = pro_snapshot(&customer_id);
    snapshot.provider_subscription_id = Some("sub_ent".to_string());
    snapshot.price_id = Some("price_enterprise_monthly".to_string());
    services
        .apply_billing_event(&BillingEvent::SubscriptionCreated(snapshot), now)
        .unwrap();
    customer_id
}
