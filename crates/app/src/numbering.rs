//! Store-backed invoice numbering.
//!
//! "Next" is computed from what the tenant has already used: max sequence in
//! the current year's prefix, plus one. Two concurrent callers can compute
//! the same answer; the store's uniqueness constraint is the final authority
//! and surfaces the loser as a retryable duplicate.

use chrono::{DateTime, Datelike, Utc};

use billforge_core::{DomainResult, TenantId};
use billforge_invoicing::{InvoiceId, number};
use billforge_store::Store;

use crate::context::{CurrentUser, require_user};
use crate::provider::BillingProvider;
use crate::services::Services;

impl<S: Store, P: BillingProvider> Services<S, P> {
    /// Suggested number for the tenant's next invoice: `INV-<year>-<seq>`.
    pub fn next_invoice_number(
        &self,
        user: Option<&CurrentUser>,
        now: DateTime<Utc>,
    ) -> DomainResult<String> {
        let tenant_id = require_user(user)?;
        self.next_number(tenant_id, now)
    }

    pub(crate) fn next_number(
        &self,
        tenant_id: TenantId,
        now: DateTime<Utc>,
    ) -> DomainResult<String> {
        let numbers = self.store.invoice_numbers(tenant_id)?;
        Ok(number::next_in_sequence(
            numbers.iter().map(String::as_str),
            now.date_naive().year(),
        ))
    }

    /// Whether `number` is already taken by one of the tenant's invoices,
    /// optionally ignoring the invoice being edited.
    pub fn invoice_number_exists(
        &self,
        user: Option<&CurrentUser>,
        number: &str,
        exclude: Option<InvoiceId>,
    ) -> DomainResult<bool> {
        let tenant_id = require_user(user)?;
        Ok(self.store.invoice_number_exists(tenant_id, number, exclude)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fixed_now, invoice_draft, services, test_user};

    #[test]
    fn first_number_of_the_year_is_0001() {
        let services = services();
        let user = test_user();
        assert_eq!(
            services.next_invoice_number(Some(&user), fixed_now()).unwrap(),
            "INV-2026-0001"
        );
    }

    #[test]
    fn next_number_increments_the_latest_sequence() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        services
            .create_invoice(Some(&user), &invoice_draft("INV-2026-0003"), now)
            .unwrap();

        assert_eq!(
            services.next_invoice_number(Some(&user), now).unwrap(),
            "INV-2026-0004"
        );
    }

    #[test]
    fn numbers_from_other_years_do_not_bleed_in() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        services
            .create_invoice(Some(&user), &invoice_draft("INV-2025-0044"), now)
            .unwrap();

        assert_eq!(
            services.next_invoice_number(Some(&user), now).unwrap(),
            "INV-2026-0001"
        );
    }

    #[test]
    fn number_exists_is_per_tenant() {
        let services = services();
        let alice = test_user();
        let bob = test_user();
        let now = fixed_now();

        services
            .create_invoice(Some(&alice), &invoice_draft("INV-2026-0001"), now)
            .unwrap();

        assert!(services
            .invoice_number_exists(Some(&alice), "INV-2026-0001", None)
            .unwrap());
        assert!(!services
            .invoice_number_exists(Some(&bob), "INV-2026-0001", None)
            .unwrap());
    }

    #[test]
    fn sequential_generation_is_strictly_increasing_without_gaps() {
        let services = services();
        let user = test_user();
        let now = fixed_now();

        for expected in ["INV-2026-0001", "INV-2026-0002", "INV-2026-0003"] {
            assert_eq!(services.next_invoice_number(Some(&user), now).unwrap(), expected);
            services
                .create_invoice_with_next_number(Some(&user), &invoice_draft(""), now)
                .unwrap();
        }
    }
}
