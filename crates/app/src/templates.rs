//! Template selection, gated by tier.

use billforge_core::{DomainResult, TenantId};
use billforge_store::Store;
use billforge_tiers::{Entitlement, InvoiceTemplate};

use crate::context::{CurrentUser, require_user};
use crate::provider::BillingProvider;
use crate::services::Services;

impl<S: Store, P: BillingProvider> Services<S, P> {
    /// May this tenant use `template`? Checked against the static
    /// template -> minimum-tier table.
    pub fn can_use_template(
        &self,
        user: Option<&CurrentUser>,
        template: InvoiceTemplate,
    ) -> DomainResult<Entitlement> {
        let tenant_id = require_user(user)?;
        self.template_entitlement(tenant_id, template)
    }

    fn template_entitlement(
        &self,
        tenant_id: TenantId,
        template: InvoiceTemplate,
    ) -> DomainResult<Entitlement> {
        let tier = self.tier_of(tenant_id)?;
        let required = template.required_tier();
        if tier.has_access(required) {
            Ok(Entitlement::allow())
        } else {
            Ok(Entitlement::deny(format!(
                "The {} template requires the {} plan. Upgrade to unlock it.",
                template.as_str(),
                required.display_name()
            )))
        }
    }

    /// Persist the tenant's template choice. The gate runs here, at the
    /// point of mutation, regardless of what any earlier check said.
    pub fn choose_template(
        &self,
        user: Option<&CurrentUser>,
        template: InvoiceTemplate,
    ) -> DomainResult<()> {
        let tenant_id = require_user(user)?;
        self.template_entitlement(tenant_id, template)?
            .into_result()?;
        self.store.set_selected_template(tenant_id, template)?;
        Ok(())
    }

    /// The tenant's chosen template, defaulting when none was ever picked.
    pub fn selected_template(&self, user: Option<&CurrentUser>) -> DomainResult<InvoiceTemplate> {
        let tenant_id = require_user(user)?;
        Ok(self
            .store
            .selected_template(tenant_id)?
            .unwrap_or(InvoiceTemplate::Default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{enterprise_tenant, fixed_now, services, test_user};
    use billforge_core::DomainError;

    #[test]
    fn free_tenant_cannot_use_modern() {
        let services = services();
        let user = test_user();

        let decision = services
            .can_use_template(Some(&user), InvoiceTemplate::Modern)
            .unwrap();
        assert!(!decision.is_allowed());
        let reason = decision.reason().unwrap();
        assert!(reason.contains("modern"));
        assert!(reason.contains("Enterprise"));
    }

    #[test]
    fn enterprise_tenant_can_use_modern() {
        let services = services();
        let user = test_user();
        enterprise_tenant(&services, &user, fixed_now());

        assert!(services
            .can_use_template(Some(&user), InvoiceTemplate::Modern)
            .unwrap()
            .is_allowed());
    }

    #[test]
    fn choose_template_persists_only_when_allowed() {
        let services = services();
        let user = test_user();

        let err = services
            .choose_template(Some(&user), InvoiceTemplate::Modern)
            .unwrap_err();
        assert!(matches!(err, DomainError::Denied(_)));
        assert_eq!(
            services.selected_template(Some(&user)).unwrap(),
            InvoiceTemplate::Default
        );

        services
            .choose_template(Some(&user), InvoiceTemplate::Classic)
            .unwrap();
        assert_eq!(
            services.selected_template(Some(&user)).unwrap(),
            InvoiceTemplate::Classic
        );
    }

    #[test]
    fn classic_is_open_to_free_tenants() {
        let services = services();
        let user = test_user();
        assert!(services
            .can_use_template(Some(&user), InvoiceTemplate::Classic)
            .unwrap()
            .is_allowed());
    }
}
