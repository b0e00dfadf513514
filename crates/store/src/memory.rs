//! In-memory store.
//!
//! Intended for tests/dev. Each map lives behind its own `RwLock`; a
//! multi-record invoice write happens inside a single write guard, which is
//! what makes header + items atomic here.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use billforge_billing::Subscription;
use billforge_clients::{Client, ClientId};
use billforge_core::TenantId;
use billforge_invoicing::{Invoice, InvoiceId};
use billforge_tiers::InvoiceTemplate;

use crate::error::{StoreError, StoreResult};
use crate::store::{ClientStore, InvoiceStore, SubscriptionStore, TemplateStore};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    clients: RwLock<HashMap<(TenantId, ClientId), Client>>,
    invoices: RwLock<HashMap<(TenantId, InvoiceId), Invoice>>,
    subscriptions: RwLock<HashMap<TenantId, Subscription>>,
    templates: RwLock<HashMap<TenantId, InvoiceTemplate>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl ClientStore for InMemoryStore {
    fn insert_client(&self, client: Client) -> StoreResult<()> {
        let mut clients = self.clients.write().map_err(|_| poisoned())?;
        let key = (client.tenant_id, client.id);
        if clients.contains_key(&key) {
            return Err(StoreError::Conflict("client already exists".to_string()));
        }
        clients.insert(key, client);
        Ok(())
    }

    fn client(&self, tenant_id: TenantId, id: ClientId) -> StoreResult<Option<Client>> {
        let clients = self.clients.read().map_err(|_| poisoned())?;
        Ok(clients.get(&(tenant_id, id)).cloned())
    }

    fn update_client(&self, client: Client) -> StoreResult<()> {
        let mut clients = self.clients.write().map_err(|_| poisoned())?;
        let key = (client.tenant_id, client.id);
        if !clients.contains_key(&key) {
            return Err(StoreError::NotFound);
        }
        clients.insert(key, client);
        Ok(())
    }

    fn clients(&self, tenant_id: TenantId) -> StoreResult<Vec<Client>> {
        let clients = self.clients.read().map_err(|_| poisoned())?;
        let mut result: Vec<Client> = clients
            .iter()
            .filter(|((t, _), _)| *t == tenant_id)
            .map(|(_, client)| client.clone())
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}

impl InvoiceStore for InMemoryStore {
    fn insert_invoice(&self, invoice: Invoice) -> StoreResult<()> {
        let mut invoices = self.invoices.write().map_err(|_| poisoned())?;
        let key = (invoice.tenant_id, invoice.id);
        if invoices.contains_key(&key) {
            return Err(StoreError::Conflict("invoice already exists".to_string()));
        }
        if number_taken(&invoices, invoice.tenant_id, &invoice.number, None) {
            return Err(StoreError::DuplicateInvoiceNumber(invoice.number));
        }
        invoices.insert(key, invoice);
        Ok(())
    }

    fn invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        let invoices = self.invoices.read().map_err(|_| poisoned())?;
        Ok(invoices.get(&(tenant_id, id)).cloned())
    }

    fn update_invoice(&self, invoice: Invoice) -> StoreResult<()> {
        let mut invoices = self.invoices.write().map_err(|_| poisoned())?;
        let key = (invoice.tenant_id, invoice.id);
        if !invoices.contains_key(&key) {
            return Err(StoreError::NotFound);
        }
        if number_taken(&invoices, invoice.tenant_id, &invoice.number, Some(invoice.id)) {
            return Err(StoreError::DuplicateInvoiceNumber(invoice.number));
        }
        // Whole-record replacement: header and items land together.
        invoices.insert(key, invoice);
        Ok(())
    }

    fn delete_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<()> {
        let mut invoices = self.invoices.write().map_err(|_| poisoned())?;
        invoices
            .remove(&(tenant_id, id))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn invoices(&self, tenant_id: TenantId) -> StoreResult<Vec<Invoice>> {
        let invoices = self.invoices.read().map_err(|_| poisoned())?;
        let mut result: Vec<Invoice> = invoices
            .iter()
            .filter(|((t, _), _)| *t == tenant_id)
            .map(|(_, invoice)| invoice.clone())
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    fn invoice_numbers(&self, tenant_id: TenantId) -> StoreResult<Vec<String>> {
        let invoices = self.invoices.read().map_err(|_| poisoned())?;
        Ok(invoices
            .iter()
            .filter(|((t, _), _)| *t == tenant_id)
            .map(|(_, invoice)| invoice.number.clone())
            .collect())
    }

    fn invoice_number_exists(
        &self,
        tenant_id: TenantId,
        number: &str,
        exclude: Option<InvoiceId>,
    ) -> StoreResult<bool> {
        let invoices = self.invoices.read().map_err(|_| poisoned())?;
        Ok(number_taken(&invoices, tenant_id, number, exclude))
    }

    fn invoices_created_since(
        &self,
        tenant_id: TenantId,
        since: DateTime<Utc>,
    ) -> StoreResult<usize> {
        let invoices = self.invoices.read().map_err(|_| poisoned())?;
        Ok(invoices
            .iter()
            .filter(|((t, _), invoice)| *t == tenant_id && invoice.created_at >= since)
            .count())
    }
}

fn number_taken(
    invoices: &HashMap<(TenantId, InvoiceId), Invoice>,
    tenant_id: TenantId,
    number: &str,
    exclude: Option<InvoiceId>,
) -> bool {
    invoices.iter().any(|((t, id), invoice)| {
        *t == tenant_id && invoice.number == number && Some(*id) != exclude
    })
}

impl SubscriptionStore for InMemoryStore {
    fn insert_subscription(&self, subscription: Subscription) -> StoreResult<()> {
        let mut subscriptions = self.subscriptions.write().map_err(|_| poisoned())?;
        if subscriptions.contains_key(&subscription.tenant_id) {
            return Err(StoreError::DuplicateSubscription);
        }
        if subscriptions
            .values()
            .any(|s| s.provider_customer_id == subscription.provider_customer_id)
        {
            return Err(StoreError::DuplicateSubscription);
        }
        subscriptions.insert(subscription.tenant_id, subscription);
        Ok(())
    }

    fn subscription_for_tenant(&self, tenant_id: TenantId) -> StoreResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().map_err(|_| poisoned())?;
        Ok(subscriptions.get(&tenant_id).cloned())
    }

    fn subscription_by_customer(
        &self,
        provider_customer_id: &str,
    ) -> StoreResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().map_err(|_| poisoned())?;
        Ok(subscriptions
            .values()
            .find(|s| s.provider_customer_id == provider_customer_id)
            .cloned())
    }

    fn subscription_by_provider_id(
        &self,
        provider_subscription_id: &str,
    ) -> StoreResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().map_err(|_| poisoned())?;
        Ok(subscriptions
            .values()
            .find(|s| {
                s.provider_subscription_id.as_deref() == Some(provider_subscription_id)
            })
            .cloned())
    }

    fn update_subscription(&self, subscription: Subscription) -> StoreResult<()> {
        let mut subscriptions = self.subscriptions.write().map_err(|_| poisoned())?;
        if !subscriptions.contains_key(&subscription.tenant_id) {
            return Err(StoreError::NotFound);
        }
        subscriptions.insert(subscription.tenant_id, subscription);
        Ok(())
    }
}

impl TemplateStore for InMemoryStore {
    fn selected_template(&self, tenant_id: TenantId) -> StoreResult<Option<InvoiceTemplate>> {
        let templates = self.templates.read().map_err(|_| poisoned())?;
        Ok(templates.get(&tenant_id).copied())
    }

    fn set_selected_template(
        &self,
        tenant_id: TenantId,
        template: InvoiceTemplate,
    ) -> StoreResult<()> {
        let mut templates = self.templates.write().map_err(|_| poisoned())?;
        templates.insert(tenant_id, template);
        Ok(())
    }
}
