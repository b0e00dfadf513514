//! Client actions.

use chrono::{DateTime, Utc};

use billforge_clients::{Client, ClientId, ClientInput, ClientStatus};
use billforge_core::{DomainError, DomainResult};
use billforge_store::Store;

use crate::context::{CurrentUser, require_user};
use crate::provider::BillingProvider;
use crate::services::Services;

impl<S: Store, P: BillingProvider> Services<S, P> {
    /// Create a client. The active-client gate runs first; validation
    /// happens inside `Client::new`.
    pub fn create_client(
        &self,
        user: Option<&CurrentUser>,
        input: ClientInput,
        now: DateTime<Utc>,
    ) -> DomainResult<Client> {
        let tenant_id = require_user(user)?;
        self.client_entitlement(tenant_id)?.into_result()?;

        let client = Client::new(ClientId::generate(), tenant_id, input, now)?;
        self.store.insert_client(client.clone())?;
        Ok(client)
    }

    /// Tenant-scoped fetch; ids from other tenants come back NotFound.
    pub fn client(&self, user: Option<&CurrentUser>, id: ClientId) -> DomainResult<Client> {
        let tenant_id = require_user(user)?;
        self.store
            .client(tenant_id, id)?
            .ok_or(DomainError::NotFound)
    }

    /// All of the tenant's clients, active and inactive, ordered by name.
    pub fn clients(&self, user: Option<&CurrentUser>) -> DomainResult<Vec<Client>> {
        let tenant_id = require_user(user)?;
        Ok(self.store.clients(tenant_id)?)
    }

    pub fn update_client(
        &self,
        user: Option<&CurrentUser>,
        id: ClientId,
        input: ClientInput,
        now: DateTime<Utc>,
    ) -> DomainResult<Client> {
        let tenant_id = require_user(user)?;
        let mut client = self
            .store
            .client(tenant_id, id)?
            .ok_or(DomainError::NotFound)?;

        client.apply(input, now)?;
        self.store.update_client(client.clone())?;
        Ok(client)
    }

    /// Flip a client between Active and Inactive.
    ///
    /// Reactivating raises the active count, so the client gate runs again
    /// before the flip; deactivating is always allowed.
    pub fn set_client_status(
        &self,
        user: Option<&CurrentUser>,
        id: ClientId,
        status: ClientStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Client> {
        let tenant_id = require_user(user)?;
        let mut client = self
            .store
            .client(tenant_id, id)?
            .ok_or(DomainError::NotFound)?;

        if status == ClientStatus::Active && !client.is_active() {
            self.client_entitlement(tenant_id)?.into_result()?;
        }

        client.set_status(status, now);
        self.store.update_client(client.clone())?;
        Ok(client)
    }
}
