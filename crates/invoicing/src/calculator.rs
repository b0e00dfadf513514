//! Invoice arithmetic.
//!
//! All monetary values carry two decimal places. Rounding happens at the
//! line level first, then again at each aggregate, so stored values never
//! expose intermediate precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round to two decimal places, midpoints away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount for one line: `round2(quantity * unit_price)`.
pub fn line_amount(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round2(quantity * unit_price)
}

/// Computed aggregates for an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Aggregate already-rounded line amounts into subtotal, tax, and total.
///
/// `tax_rate` is a percentage (`10` means 10%); `None` means no tax line.
pub fn totals(amounts: &[Decimal], tax_rate: Option<Decimal>) -> InvoiceTotals {
    let subtotal = round2(amounts.iter().copied().sum());
    let tax_amount = match tax_rate {
        Some(rate) => round2(subtotal * rate / Decimal::ONE_HUNDRED),
        None => Decimal::ZERO,
    };
    let total = round2(subtotal + tax_amount);
    InvoiceTotals {
        subtotal,
        tax_amount,
        total,
    }
}
