//! Invoice drafts: raw form input and its validation.
//!
//! Quantities, prices, and tax rates arrive as decimal strings exactly as
//! submitted. Validation filters blank rows first, then reports every
//! problem field-by-field; a clean draft comes back as a typed
//! [`ValidatedInvoice`] with per-line amounts and totals already computed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billforge_clients::ClientId;
use billforge_core::ValidationErrors;

use crate::calculator::{self, InvoiceTotals, line_amount};

/// One submitted line-item row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDraft {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
}

impl LineItemDraft {
    /// A row the user never touched: every field blank.
    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
            && self.quantity.trim().is_empty()
            && self.unit_price.trim().is_empty()
    }
}

/// Submitted invoice form data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub client_id: Option<ClientId>,
    pub number: String,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub tax_rate: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<LineItemDraft>,
}

/// A validated, priced line ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

/// The typed result of a clean validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedInvoice {
    pub client_id: Option<ClientId>,
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub tax_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub lines: Vec<PricedLine>,
    pub totals: InvoiceTotals,
}

impl InvoiceDraft {
    /// Field-scoped validation. Blank rows are dropped before any rule runs;
    /// line-item errors are keyed `items[<index>].<field>` by position in the
    /// filtered list.
    pub fn validate(&self) -> Result<ValidatedInvoice, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let number = self.number.trim().to_string();
        if number.is_empty() {
            errors.add("number", "Invoice number is required");
        }

        if self.issue_date.is_none() {
            errors.add("issue_date", "Issue date is required");
        }
        if let (Some(issue), Some(due)) = (self.issue_date, self.due_date) {
            if due < issue {
                errors.add("due_date", "Due date must be on or after issue date");
            }
        }

        let tax_rate = match self.tax_rate.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<Decimal>() {
                Ok(rate) if rate >= Decimal::ZERO => Some(rate),
                _ => {
                    errors.add("tax_rate", "Tax rate must be a non-negative number");
                    None
                }
            },
        };

        let rows: Vec<&LineItemDraft> =
            self.items.iter().filter(|item| !item.is_blank()).collect();
        if rows.is_empty() {
            errors.add("items", "At least one line item is required");
        }

        let mut lines = Vec::with_capacity(rows.len());
        for (idx, item) in rows.iter().enumerate() {
            let description = item.description.trim().to_string();
            if description.is_empty() {
                errors.add(format!("items[{idx}].description"), "Description is required");
            }

            let quantity = match item.quantity.trim().parse::<Decimal>() {
                Ok(quantity) if quantity > Decimal::ZERO => Some(quantity),
                _ => {
                    errors.add(
                        format!("items[{idx}].quantity"),
                        "Quantity must be a positive number",
                    );
                    None
                }
            };

            let unit_price = match item.unit_price.trim().parse::<Decimal>() {
                Ok(price) if price >= Decimal::ZERO => Some(price),
                _ => {
                    errors.add(
                        format!("items[{idx}].unit_price"),
                        "Unit price must be a non-negative number",
                    );
                    None
                }
            };

            if let (Some(quantity), Some(unit_price)) = (quantity, unit_price) {
                if !description.is_empty() {
                    lines.push(PricedLine {
                        description,
                        quantity,
                        unit_price,
                        amount: line_amount(quantity, unit_price),
                    });
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let amounts: Vec<Decimal> = lines.iter().map(|line| line.amount).collect();
        let totals = calculator::totals(&amounts, tax_rate);

        Ok(ValidatedInvoice {
            client_id: self.client_id,
            number,
            // `issue_date.is_none()` was already reported above.
            issue_date: self.issue_date.expect("issue date present after validation"),
            due_date: self.due_date,
            tax_rate,
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
            lines,
            totals,
        })
    }
}
