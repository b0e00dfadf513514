use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billforge_clients::ClientId;
use billforge_core::{Entity, EntityId, TenantId};

/// Invoice identifier (tenant-scoped via the `tenant_id` field on the record).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub EntityId);

impl InvoiceId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(EntityId::new())
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Line item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub EntityId);

impl LineItemId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(EntityId::new())
    }
}

impl core::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Invariant: only draft invoices may have their fields edited.
    pub fn is_editable(self) -> bool {
        self == InvoiceStatus::Draft
    }

    /// Invariant: only draft invoices may be deleted.
    pub fn is_deletable(self) -> bool {
        self == InvoiceStatus::Draft
    }

    /// The lifecycle table: which statuses this one may advance to.
    pub fn allowed_transitions(self) -> &'static [InvoiceStatus] {
        match self {
            InvoiceStatus::Draft => &[InvoiceStatus::Sent, InvoiceStatus::Cancelled],
            InvoiceStatus::Sent => &[
                InvoiceStatus::Paid,
                InvoiceStatus::Overdue,
                InvoiceStatus::Cancelled,
            ],
            InvoiceStatus::Overdue => &[InvoiceStatus::Paid, InvoiceStatus::Cancelled],
            InvoiceStatus::Paid | InvoiceStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

/// How strictly status changes follow the lifecycle table.
///
/// The editing surface historically offered every status from every state, so
/// `Permissive` is the default: ownership is the only check. `Guarded`
/// consults [`InvoiceStatus::allowed_transitions`]. Which one ships is a
/// product decision, not a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Guarded,
}

impl TransitionPolicy {
    pub fn permits(self, from: InvoiceStatus, to: InvoiceStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Guarded => from == to || from.can_transition_to(to),
        }
    }
}

/// A single billable row, owned exclusively by its invoice and destroyed
/// with it.
///
/// Invariant: `amount = round2(quantity * unit_price)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub invoice_id: InvoiceId,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

/// An invoice belonging to exactly one tenant.
///
/// Invariants: `number` is unique within the tenant; `subtotal` is the sum of
/// line amounts; `total = subtotal + tax_amount`; at least one line item; and
/// `due_date >= issue_date` when both are present. All monetary fields carry
/// two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub tenant_id: TenantId,
    pub client_id: Option<ClientId>,
    pub number: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub tax_rate: Option<Decimal>,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    pub fn is_deletable(&self) -> bool {
        self.status.is_deletable()
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
