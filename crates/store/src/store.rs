//! Store traits the engine depends on.
//!
//! Every read and write is keyed by tenant; an id that exists under another
//! tenant behaves exactly like one that does not exist at all.

use chrono::{DateTime, Utc};

use billforge_billing::Subscription;
use billforge_clients::{Client, ClientId};
use billforge_core::TenantId;
use billforge_invoicing::{Invoice, InvoiceId};
use billforge_tiers::InvoiceTemplate;

use crate::error::StoreResult;

pub trait ClientStore: Send + Sync {
    fn insert_client(&self, client: Client) -> StoreResult<()>;
    fn client(&self, tenant_id: TenantId, id: ClientId) -> StoreResult<Option<Client>>;
    fn update_client(&self, client: Client) -> StoreResult<()>;
    /// All of the tenant's clients, ordered by name.
    fn clients(&self, tenant_id: TenantId) -> StoreResult<Vec<Client>>;
}

pub trait InvoiceStore: Send + Sync {
    /// Insert header + line items as one unit. Fails with
    /// [`crate::StoreError::DuplicateInvoiceNumber`] when the tenant already
    /// has an invoice with this number.
    fn insert_invoice(&self, invoice: Invoice) -> StoreResult<()>;
    fn invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<Option<Invoice>>;
    /// Replace the stored record wholesale (header and items together, all
    /// or nothing). The duplicate-number check excludes the invoice itself.
    fn update_invoice(&self, invoice: Invoice) -> StoreResult<()>;
    /// Remove the invoice and, with it, its line items.
    fn delete_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<()>;
    /// All of the tenant's invoices, newest first.
    fn invoices(&self, tenant_id: TenantId) -> StoreResult<Vec<Invoice>>;
    /// Every invoice number the tenant has used.
    fn invoice_numbers(&self, tenant_id: TenantId) -> StoreResult<Vec<String>>;
    fn invoice_number_exists(
        &self,
        tenant_id: TenantId,
        number: &str,
        exclude: Option<InvoiceId>,
    ) -> StoreResult<bool>;
    /// Count of invoices created at or after `since`.
    fn invoices_created_since(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> StoreResult<usize>;
}

pub trait SubscriptionStore: Send + Sync {
    /// Insert the tenant's single subscription record. Fails with
    /// [`crate::StoreError::DuplicateSubscription`] when the tenant or the
    /// provider customer id already has one.
    fn insert_subscription(&self, subscription: Subscription) -> StoreResult<()>;
    fn subscription_for_tenant(&self, tenant_id: TenantId) -> StoreResult<Option<Subscription>>;
    fn subscription_by_customer(
        &self,
        provider_customer_id: &str,
    ) -> StoreResult<Option<Subscription>>;
    fn subscription_by_provider_id(
        &self,
        provider_subscription_id: &str,
    ) -> StoreResult<Option<Subscription>>;
    fn update_subscription(&self, subscription: Subscription) -> StoreResult<()>;
}

pub trait TemplateStore: Send + Sync {
    fn selected_template(&self, tenant_id: TenantId) -> StoreResult<Option<InvoiceTemplate>>;
    fn set_selected_template(
        &self,
        tenant_id: TenantId,
        template: InvoiceTemplate,
    ) -> StoreResult<()>;
}

/// The full storage surface the engine is generic over.
pub trait Store: ClientStore + InvoiceStore + SubscriptionStore + TemplateStore {}

impl<S> Store for S where S: ClientStore + InvoiceStore + SubscriptionStore + TemplateStore {}
