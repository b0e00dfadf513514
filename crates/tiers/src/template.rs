//! Invoice templates and the tier each one requires.

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Visual invoice template. Rendering lives outside this core; the engine
/// only cares which plan unlocks each template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceTemplate {
    Default,
    Classic,
    Simple,
    Modern,
    Professional,
    Creative,
}

impl InvoiceTemplate {
    pub const ALL: [InvoiceTemplate; 6] = [
        InvoiceTemplate::Default,
        InvoiceTemplate::Classic,
        InvoiceTemplate::Simple,
        InvoiceTemplate::Modern,
        InvoiceTemplate::Professional,
        InvoiceTemplate::Creative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceTemplate::Default => "default",
            InvoiceTemplate::Classic => "classic",
            InvoiceTemplate::Simple => "simple",
            InvoiceTemplate::Modern => "modern",
            InvoiceTemplate::Professional => "professional",
            InvoiceTemplate::Creative => "creative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Minimum plan tier that unlocks this template.
    pub fn required_tier(self) -> Tier {
        match self {
            InvoiceTemplate::Default | InvoiceTemplate::Classic => Tier::Free,
            InvoiceTemplate::Simple => Tier::Pro,
            InvoiceTemplate::Modern
            | InvoiceTemplate::Professional
            | InvoiceTemplate::Creative => Tier::Enterprise,
        }
    }
}
