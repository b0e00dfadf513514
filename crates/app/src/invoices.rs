//! Invoice actions.
//!
//! Creation runs the monthly gate, validates the draft, checks the number,
//! and persists header + items as one unit. Editing and deleting are
//! draft-only; status changes go through the configured transition policy.

use chrono::{DateTime, Utc};

use billforge_core::{DomainError, DomainResult, TenantId};
use billforge_invoicing::{
    Invoice, InvoiceDraft, InvoiceId, InvoiceStatus, LineItem, LineItemId, ValidatedInvoice,
};
use billforge_store::{Store, StoreError};

use crate::context::{CurrentUser, require_user};
use crate::provider::BillingProvider;
use crate::services::Services;

/// Bounded recompute-and-retry when an auto-assigned number races.
const NUMBER_RETRY_ATTEMPTS: usize = 3;

const DUPLICATE_NUMBER_MESSAGE: &str = "This invoice number already exists";

impl<S: Store, P: BillingProvider> Services<S, P> {
    /// Create an invoice with a caller-supplied number.
    ///
    /// A number collision — whether caught by the pre-check or by the
    /// uniqueness constraint at persist time — surfaces as a field error on
    /// `number`, never as data corruption.
    pub fn create_invoice(
        &self,
        user: Option<&CurrentUser>,
        draft: &InvoiceDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<Invoice> {
        let tenant_id = require_user(user)?;
        self.invoice_entitlement(tenant_id, now)?.into_result()?;

        let validated = draft.validate().map_err(DomainError::Validation)?;
        if self
            .store
            .invoice_number_exists(tenant_id, &validated.number, None)?
        {
            return Err(DomainError::field("number", DUPLICATE_NUMBER_MESSAGE));
        }

        match self.insert_validated(tenant_id, validated, now) {
            Ok(invoice) => Ok(invoice),
            Err(StoreError::DuplicateInvoiceNumber(_)) => {
                Err(DomainError::field("number", DUPLICATE_NUMBER_MESSAGE))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Create an invoice with the next number in the tenant's sequence,
    /// recomputing on a persist-time collision.
    pub fn create_invoice_with_next_number(
        &self,
        user: Option<&CurrentUser>,
        draft: &InvoiceDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<Invoice> {
        let tenant_id = require_user(user)?;
        self.invoice_entitlement(tenant_id, now)?.into_result()?;

        let mut collided = String::new();
        for _ in 0..NUMBER_RETRY_ATTEMPTS {
            let mut attempt = draft.clone();
            attempt.number = self.next_number(tenant_id, now)?;
            let validated = attempt.validate().map_err(DomainError::Validation)?;

            match self.insert_validated(tenant_id, validated, now) {
                Ok(invoice) => return Ok(invoice),
                Err(StoreError::DuplicateInvoiceNumber(number)) => {
                    tracing::debug!(%tenant_id, %number, "invoice number raced, recomputing");
                    collided = number;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(DomainError::conflict(format!(
            "invoice number already exists: {collided}"
        )))
    }

    fn insert_validated(
        &self,
        tenant_id: TenantId,
        validated: ValidatedInvoice,
        now: DateTime<Utc>,
    ) -> Result<Invoice, StoreError> {
        let invoice = build_invoice(tenant_id, validated, now);
        self.store.insert_invoice(invoice.clone())?;
        Ok(invoice)
    }

    /// Tenant-scoped fetch with resolved line items.
    pub fn invoice(&self, user: Option<&CurrentUser>, id: InvoiceId) -> DomainResult<Invoice> {
        let tenant_id = require_user(user)?;
        self.store
            .invoice(tenant_id, id)?
            .ok_or(DomainError::NotFound)
    }

    /// All of the tenant's invoices, newest first.
    pub fn invoices(&self, user: Option<&CurrentUser>) -> DomainResult<Vec<Invoice>> {
        let tenant_id = require_user(user)?;
        Ok(self.store.invoices(tenant_id)?)
    }

    /// Replace a draft invoice's fields and line items in one unit.
    pub fn update_invoice(
        &self,
        user: Option<&CurrentUser>,
        id: InvoiceId,
        draft: &InvoiceDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<Invoice> {
        let tenant_id = require_user(user)?;
        let existing = self
            .store
            .invoice(tenant_id, id)?
            .ok_or(DomainError::NotFound)?;
        if !existing.is_editable() {
            return Err(DomainError::conflict("Only draft invoices can be edited"));
        }

        let validated = draft.validate().map_err(DomainError::Validation)?;
        if self
            .store
            .invoice_number_exists(tenant_id, &validated.number, Some(id))?
        {
            return Err(DomainError::field("number", DUPLICATE_NUMBER_MESSAGE));
        }

        let invoice = rebuild_invoice(&existing, validated, now);
        match self.store.update_invoice(invoice.clone()) {
            Ok(()) => Ok(invoice),
            Err(StoreError::DuplicateInvoiceNumber(_)) => {
                Err(DomainError::field("number", DUPLICATE_NUMBER_MESSAGE))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Change the status field. Ownership is always checked; whether the
    /// lifecycle table is enforced depends on the configured policy.
    pub fn update_invoice_status(
        &self,
        user: Option<&CurrentUser>,
        id: InvoiceId,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Invoice> {
        let tenant_id = require_user(user)?;
        let mut invoice = self
            .store
            .invoice(tenant_id, id)?
            .ok_or(DomainError::NotFound)?;

        if !self.transition_policy.permits(invoice.status, status) {
            return Err(DomainError::conflict(format!(
                "cannot change status from {} to {}",
                invoice.status.as_str(),
                status.as_str()
            )));
        }

        invoice.status = status;
        invoice.updated_at = now;
        self.store.update_invoice(invoice.clone())?;
        Ok(invoice)
    }

    /// Delete a draft invoice together with its line items.
    pub fn delete_invoice(&self, user: Option<&CurrentUser>, id: InvoiceId) -> DomainResult<()> {
        let tenant_id = require_user(user)?;
        let existing = self
            .store
            .invoice(tenant_id, id)?
            .ok_or(DomainError::NotFound)?;
        if !existing.is_deletable() {
            return Err(DomainError::conflict("Only draft invoices can be deleted"));
        }

        self.store.delete_invoice(tenant_id, id)?;
        Ok(())
    }
}

fn build_invoice(
    tenant_id: TenantId,
    validated: ValidatedInvoice,
    now: DateTime<Utc>,
) -> Invoice {
    let id = InvoiceId::generate();
    Invoice {
        id,
        tenant_id,
        client_id: validated.client_id,
        number: validated.number,
        status: InvoiceStatus::Draft,
        issue_date: validated.issue_date,
        due_date: validated.due_date,
        subtotal: validated.totals.subtotal,
        tax_rate: validated.tax_rate,
        tax_amount: validated.totals.tax_amount,
        total: validated.totals.total,
        notes: validated.notes,
        items: priced_items(id, validated.lines),
        created_at: now,
        updated_at: now,
    }
}

/// Replace-all semantics: every edit re-issues the line items wholesale.
fn rebuild_invoice(
    existing: &Invoice,
    validated: ValidatedInvoice,
    now: DateTime<Utc>,
) -> Invoice {
    Invoice {
        id: existing.id,
        tenant_id: existing.tenant_id,
        client_id: validated.client_id,
        number: validated.number,
        status: existing.status,
        issue_date: validated.issue_date,
        due_date: validated.due_date,
        subtotal: validated.totals.subtotal,
        tax_rate: validated.tax_rate,
        tax_amount: validated.totals.tax_amount,
        total: validated.totals.total,
        notes: validated.notes,
        items: priced_items(existing.id, validated.lines),
        created_at: existing.created_at,
        updated_at: now,
    }
}

fn priced_items(
    invoice_id: InvoiceId,
    lines: Vec<billforge_invoicing::PricedLine>,
) -> Vec<LineItem> {
    lines
        .into_iter()
        .map(|line| LineItem {
            id: LineItemId::generate(),
            invoice_id,
            description: line.description,
            quantity: line.quantity,
            unit_price: line.unit_price,
            amount: line.amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fixed_now, invoice_draft, services, test_user};
    use billforge_invoicing::{LineItemDraft, TransitionPolicy};
    use billforge_store::InvoiceStore;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn create_computes_amounts_and_totals() {
        let services = services();
        let user = test_user();

        let mut draft = invoice_draft("INV-2026-0001");
        draft.items = vec![
            LineItemDraft {
                description: "Design work".to_string(),
                quantity: "2".to_string(),
                unit_price: "50.00".to_string(),
            },
            LineItemDraft {
                description: "Stock photos".to_string(),
                quantity: "1".to_string(),
                unit_price: "25.50".to_string(),
            },
        ];
        draft.tax_rate = Some("10".to_string());

        let invoice = services.create_invoice(Some(&user), &draft, fixed_now()).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.subtotal, dec("125.50"));
        assert_eq!(invoice.tax_amount, dec("12.55"));
        assert_eq!(invoice.total, dec("138.05"));
        assert_eq!(invoice.items.len(), 2);
        assert!(invoice.items.iter().all(|item| item.invoice_id == invoice.id));
    }

    #[test]
    fn duplicate_number_is_a_field_error() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        services.create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now).unwrap();
        let err = services
            .create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now)
            .unwrap_err();

        match err {
            DomainError::Validation(errors) => {
                assert_eq!(
                    errors.messages("number"),
                    &["This invoice number already exists".to_string()]
                );
            }
            other => panic!("Expected a field error, got {other:?}"),
        }
    }

    #[test]
    fn auto_numbering_recovers_from_a_raced_insert() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        // Another writer grabbed 0001 between our compute and insert; here
        // the pre-existing row plays that role and the retry recomputes.
        services.create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now).unwrap();

        let invoice = services
            .create_invoice_with_next_number(Some(&user), &invoice_draft(""), now)
            .unwrap();
        assert_eq!(invoice.number, "INV-2026-0002");
    }

    #[test]
    fn update_replaces_line_items_wholesale() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        let created = services
            .create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now)
            .unwrap();
        assert_eq!(created.items.len(), 1);

        let mut draft = invoice_draft("INV-2026-0001");
        draft.items = vec![
            LineItemDraft {
                description: "Revised scope".to_string(),
                quantity: "3".to_string(),
                unit_price: "80.00".to_string(),
            },
            LineItemDraft {
                description: "Rush fee".to_string(),
                quantity: "1".to_string(),
                unit_price: "40.00".to_string(),
            },
        ];

        let updated = services
            .update_invoice(Some(&user), created.id, &draft, now)
            .unwrap();
        assert_eq!(updated.items.len(), 2);
        assert_eq!(updated.subtotal, dec("280.00"));
        assert_eq!(updated.created_at, created.created_at);

        let stored = services.invoice(Some(&user), created.id).unwrap();
        assert_eq!(stored.items.len(), 2);
    }

    #[test]
    fn update_keeping_own_number_is_not_a_collision() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        let created = services
            .create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now)
            .unwrap();

        let mut draft = invoice_draft("INV-2026-0001");
        draft.notes = Some("updated notes".to_string());
        let updated = services
            .update_invoice(Some(&user), created.id, &draft, now)
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("updated notes"));
    }

    #[test]
    fn only_draft_invoices_can_be_edited() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        let invoice = services
            .create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now)
            .unwrap();
        services
            .update_invoice_status(Some(&user), invoice.id, InvoiceStatus::Sent, now)
            .unwrap();

        let err = services
            .update_invoice(Some(&user), invoice.id, &invoice_draft("INV-2026-0001"), now)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Conflict("Only draft invoices can be edited".to_string())
        );
    }

    #[test]
    fn deleting_a_non_draft_invoice_fails_and_leaves_it_unchanged() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        let invoice = services
            .create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now)
            .unwrap();
        services
            .update_invoice_status(Some(&user), invoice.id, InvoiceStatus::Sent, now)
            .unwrap();

        let err = services.delete_invoice(Some(&user), invoice.id).unwrap_err();
        assert_eq!(
            err,
            DomainError::Conflict("Only draft invoices can be deleted".to_string())
        );

        let still_there = services.invoice(Some(&user), invoice.id).unwrap();
        assert_eq!(still_there.status, InvoiceStatus::Sent);
        assert_eq!(still_there.items.len(), 1);
    }

    #[test]
    fn deleting_a_draft_removes_it_and_its_items() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        let invoice = services
            .create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now)
            .unwrap();
        services.delete_invoice(Some(&user), invoice.id).unwrap();

        assert_eq!(
            services.invoice(Some(&user), invoice.id).unwrap_err(),
            DomainError::NotFound
        );
        // The record (and its owned items) is gone from storage entirely.
        assert_eq!(
            services
                .store()
                .invoice(user.tenant_id(), invoice.id)
                .unwrap(),
            None
        );
    }

    #[test]
    fn permissive_policy_allows_any_status_jump() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        let invoice = services
            .create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now)
            .unwrap();

        services
            .update_invoice_status(Some(&user), invoice.id, InvoiceStatus::Paid, now)
            .unwrap();
        let back = services
            .update_invoice_status(Some(&user), invoice.id, InvoiceStatus::Draft, now)
            .unwrap();
        assert_eq!(back.status, InvoiceStatus::Draft);
    }

    #[test]
    fn guarded_policy_enforces_the_lifecycle_table() {
        let services = crate::testutil::services().with_transition_policy(TransitionPolicy::Guarded);
        let user = test_user();
        let now = fixed_now();

        let invoice = services
            .create_invoice(Some(&user), &invoice_draft("INV-2026-0001"), now)
            .unwrap();

        let err = services
            .update_invoice_status(Some(&user), invoice.id, InvoiceStatus::Paid, now)
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        services
            .update_invoice_status(Some(&user), invoice.id, InvoiceStatus::Sent, now)
            .unwrap();
        let paid = services
            .update_invoice_status(Some(&user), invoice.id, InvoiceStatus::Paid, now)
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
    }

    #[test]
    fn cross_tenant_invoices_read_as_not_found() {
        let services = services();
        let alice = test_user();
        let bob = test_user();
        let now = fixed_now();

        let invoice = services
            .create_invoice(Some(&alice), &invoice_draft("INV-2026-0001"), now)
            .unwrap();

        assert_eq!(
            services.invoice(Some(&bob), invoice.id).unwrap_err(),
            DomainError::NotFound
        );
        assert_eq!(
            services.delete_invoice(Some(&bob), invoice.id).unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn monthly_limit_denies_the_sixth_free_invoice() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        for _ in 0..5 {
            services
                .create_invoice_with_next_number(Some(&user), &invoice_draft(""), now)
                .unwrap();
        }

        let err = services
            .create_invoice_with_next_number(Some(&user), &invoice_draft(""), now)
            .unwrap_err();
        match err {
            DomainError::Denied(reason) => {
                assert!(reason.contains("5/5"));
                assert!(reason.contains("Free"));
            }
            other => panic!("Expected Denied, got {other:?}"),
        }
    }
}
