//! Usage counts and entitlement gates.
//!
//! Gates are re-evaluated at the point of every mutation — creating a
//! client, creating an invoice, reactivating a client — never cached,
//! because usage moves between one check and the next. Two concurrent
//! creations can both pass a gate and transiently exceed a limit; that is
//! accepted soft-limit behavior.

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::Serialize;

use billforge_core::{DomainResult, TenantId};
use billforge_store::Store;
use billforge_tiers::{Entitlement, Tier, TierLimits, limits_for};

use crate::context::{CurrentUser, require_user};
use crate::provider::BillingProvider;
use crate::services::Services;

/// One read of the tenant's plan, limits, and current usage.
#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    pub tier: Tier,
    pub tier_display_name: &'static str,
    pub limits: TierLimits,
    pub active_clients: u32,
    pub invoices_this_month: u32,
    pub can_create_client: bool,
    pub can_create_invoice: bool,
}

/// First instant of the calendar month containing `now`.
pub(crate) fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    let first = date.with_day(1).unwrap_or(date);
    DateTime::from_naive_utc_and_offset(first.and_time(NaiveTime::MIN), Utc)
}

impl<S: Store, P: BillingProvider> Services<S, P> {
    /// The tenant's tier, derived from the subscription record on demand.
    pub fn current_tier(&self, user: Option<&CurrentUser>) -> DomainResult<Tier> {
        let tenant_id = require_user(user)?;
        self.tier_of(tenant_id)
    }

    pub(crate) fn tier_of(&self, tenant_id: TenantId) -> DomainResult<Tier> {
        Ok(self
            .store
            .subscription_for_tenant(tenant_id)?
            .map(|subscription| subscription.tier())
            .unwrap_or(Tier::Free))
    }

    /// Count of clients with status Active.
    pub fn active_client_count(&self, user: Option<&CurrentUser>) -> DomainResult<u32> {
        let tenant_id = require_user(user)?;
        self.active_clients(tenant_id)
    }

    pub(crate) fn active_clients(&self, tenant_id: TenantId) -> DomainResult<u32> {
        let clients = self.store.clients(tenant_id)?;
        Ok(clients.iter().filter(|client| client.is_active()).count() as u32)
    }

    /// Count of invoices created in the calendar month containing `now`.
    pub fn monthly_invoice_count(
        &self,
        user: Option<&CurrentUser>,
        now: DateTime<Utc>,
    ) -> DomainResult<u32> {
        let tenant_id = require_user(user)?;
        self.invoices_this_month(tenant_id, now)
    }

    pub(crate) fn invoices_this_month(
        &self,
        tenant_id: TenantId,
        now: DateTime<Utc>,
    ) -> DomainResult<u32> {
        let count = self
            .store
            .invoices_created_since(tenant_id, month_start(now))?;
        Ok(count as u32)
    }

    /// May this tenant add another active client?
    pub fn can_create_client(&self, user: Option<&CurrentUser>) -> DomainResult<Entitlement> {
        let tenant_id = require_user(user)?;
        self.client_entitlement(tenant_id)
    }

    pub(crate) fn client_entitlement(&self, tenant_id: TenantId) -> DomainResult<Entitlement> {
        let tier = self.tier_of(tenant_id)?;
        let Some(max) = limits_for(tier).max_clients else {
            return Ok(Entitlement::allow());
        };

        let count = self.active_clients(tenant_id)?;
        if count >= max {
            Ok(Entitlement::deny(format!(
                "You've reached the maximum of {max} clients on the {} plan. \
                 Upgrade to add more active clients.",
                tier.display_name()
            )))
        } else {
            Ok(Entitlement::allow())
        }
    }

    /// May this tenant create another invoice this month?
    pub fn can_create_invoice(
        &self,
        user: Option<&CurrentUser>,
        now: DateTime<Utc>,
    ) -> DomainResult<Entitlement> {
        let tenant_id = require_user(user)?;
        self.invoice_entitlement(tenant_id, now)
    }

    pub(crate) fn invoice_entitlement(
        &self,
        tenant_id: TenantId,
        now: DateTime<Utc>,
    ) -> DomainResult<Entitlement> {
        let tier = self.tier_of(tenant_id)?;
        let Some(max) = limits_for(tier).max_invoices_per_month else {
            return Ok(Entitlement::allow());
        };

        let count = self.invoices_this_month(tenant_id, now)?;
        if count >= max {
            Ok(Entitlement::deny(format!(
                "You've reached your monthly invoice limit ({count}/{max}) on the {} plan. \
                 Upgrade for more invoices.",
                tier.display_name()
            )))
        } else {
            Ok(Entitlement::allow())
        }
    }

    /// Plan, limits, and both usage counters in one read (billing page).
    pub fn usage_stats(
        &self,
        user: Option<&CurrentUser>,
        now: DateTime<Utc>,
    ) -> DomainResult<UsageStats> {
        let tenant_id = require_user(user)?;
        let tier = self.tier_of(tenant_id)?;
        let limits = limits_for(tier);
        let active_clients = self.active_clients(tenant_id)?;
        let invoices_this_month = self.invoices_this_month(tenant_id, now)?;

        Ok(UsageStats {
            tier,
            tier_display_name: tier.display_name(),
            limits,
            active_clients,
            invoices_this_month,
            can_create_client: limits.max_clients.is_none_or(|max| active_clients < max),
            can_create_invoice: limits
                .max_invoices_per_month
                .is_none_or(|max| invoices_this_month < max),
        })
    }
}
