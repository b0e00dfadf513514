//! Engine wiring: store + billing provider + policies.

use billforge_invoicing::TransitionPolicy;
use billforge_store::Store;

use crate::provider::BillingProvider;

/// The engine's service aggregate. Action methods live in the sibling
/// modules (`clients`, `invoices`, `usage`, ...), each adding its own
/// `impl` block.
#[derive(Debug)]
pub struct Services<S, P> {
    pub(crate) store: S,
    pub(crate) provider: P,
    pub(crate) transition_policy: TransitionPolicy,
}

impl<S: Store, P: BillingProvider> Services<S, P> {
    pub fn new(store: S, provider: P) -> Self {
        Self {
            store,
            provider,
            transition_policy: TransitionPolicy::default(),
        }
    }

    /// Opt in to lifecycle-table enforcement on status changes.
    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
