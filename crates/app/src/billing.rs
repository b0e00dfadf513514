//! Billing-page actions: lazy customer provisioning, checkout, portal.

use chrono::{DateTime, Utc};

use billforge_billing::{Subscription, SubscriptionId};
use billforge_core::{DomainError, DomainResult};
use billforge_store::Store;

use crate::context::{CurrentUser, require_user};
use crate::provider::BillingProvider;
use crate::services::Services;

impl<S: Store, P: BillingProvider> Services<S, P> {
    /// Provider customer id for the tenant, provisioning one on first use.
    ///
    /// Provider call first, local insert second; there is never a partial
    /// local record. If the insert fails, the already-created provider
    /// customer is an accepted leak — logged, not rolled back.
    pub fn ensure_customer(
        &self,
        user: Option<&CurrentUser>,
        email: &str,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<String> {
        let tenant_id = require_user(user)?;
        if let Some(subscription) = self.store.subscription_for_tenant(tenant_id)? {
            return Ok(subscription.provider_customer_id);
        }

        let customer_id = self.provider.create_customer(email, name, tenant_id)?;
        let subscription = Subscription::provisioned(
            SubscriptionId::generate(),
            tenant_id,
            customer_id.clone(),
            now,
        );
        if let Err(err) = self.store.insert_subscription(subscription) {
            tracing::warn!(
                %tenant_id,
                %customer_id,
                error = %err,
                "provider customer created but local subscription insert failed"
            );
            return Err(err.into());
        }

        Ok(customer_id)
    }

    /// Hosted checkout URL for upgrading to `price_id`. Requires a
    /// provisioned customer.
    pub fn checkout_url(
        &self,
        user: Option<&CurrentUser>,
        price_id: &str,
    ) -> DomainResult<String> {
        let tenant_id = require_user(user)?;
        let subscription = self
            .store
            .subscription_for_tenant(tenant_id)?
            .ok_or(DomainError::NotFound)?;
        Ok(self
            .provider
            .create_checkout_session(&subscription.provider_customer_id, price_id)?)
    }

    /// Hosted self-service portal URL. Requires a provisioned customer.
    pub fn portal_url(&self, user: Option<&CurrentUser>) -> DomainResult<String> {
        let tenant_id = require_user(user)?;
        let subscription = self
            .store
            .subscription_for_tenant(tenant_id)?
            .ok_or(DomainError::NotFound)?;
        Ok(self
            .provider
            .create_portal_session(&subscription.provider_customer_id)?)
    }

    /// The tenant's subscription record, if one was ever provisioned.
    pub fn subscription_overview(
        &self,
        user: Option<&CurrentUser>,
    ) -> DomainResult<Option<Subscription>> {
        let tenant_id = require_user(user)?;
        Ok(self.store.subscription_for_tenant(tenant_id)?)
    }
}
