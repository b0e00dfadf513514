//! Plan ladder and per-tier usage limits.

use serde::{Deserialize, Serialize};

/// Subscription tier. Ordering follows plan level (Free < Pro < Enterprise).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
    Enterprise,
}

impl Tier {
    /// Ordinal plan level: Free = 0, Pro = 1, Enterprise = 2.
    pub fn level(self) -> u8 {
        match self {
            Tier::Free => 0,
            Tier::Pro => 1,
            Tier::Enterprise => 2,
        }
    }

    /// Name shown in entitlement denial messages and the billing page.
    pub fn display_name(self) -> &'static str {
        match self {
            Tier::Free => "Free",
            Tier::Pro => "Pro",
            Tier::Enterprise => "Enterprise",
        }
    }

    /// Whether this tier grants access to a feature requiring `required`.
    pub fn has_access(self, required: Tier) -> bool {
        self.level() >= required.level()
    }
}

/// Usage limits for a tier. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    pub max_clients: Option<u32>,
    pub max_invoices_per_month: Option<u32>,
}

/// Limits table for each plan.
pub fn limits_for(tier: Tier) -> TierLimits {
    match tier {
        Tier::Free => TierLimits {
            max_clients: Some(3),
            max_invoices_per_month: Some(5),
        },
        Tier::Pro => TierLimits {
            max_clients: Some(10),
            max_invoices_per_month: Some(30),
        },
        Tier::Enterprise => TierLimits {
            max_clients: None,
            max_invoices_per_month: None,
        },
    }
}

/// Billing-provider price ids mapped to plan tiers.
const PRICE_TIERS: &[(&str, Tier)] = &[
    ("price_free_monthly", Tier::Free),
    ("price_pro_monthly", Tier::Pro),
    ("price_enterprise_monthly", Tier::Enterprise),
];

/// Map a provider price id to a tier. Missing or unknown price ids fall back
/// to Free.
pub fn tier_from_price_id(price_id: Option<&str>) -> Tier {
    let Some(price_id) = price_id else {
        return Tier::Free;
    };
    PRICE_TIERS
        .iter()
        .find(|(id, _)| *id == price_id)
        .map(|(_, tier)| *tier)
        .unwrap_or(Tier::Free)
}
