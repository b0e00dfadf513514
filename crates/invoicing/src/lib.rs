//! Invoicing domain module.
//!
//! Pure business rules for invoices: line-item arithmetic, the status
//! lifecycle with its edit/delete permissions, per-year invoice numbering,
//! and draft validation. No IO, no HTTP, no storage.

pub mod calculator;
pub mod draft;
pub mod invoice;
pub mod number;

pub use calculator::{InvoiceTotals, line_amount, round2, totals};
pub use draft::{InvoiceDraft, LineItemDraft, PricedLine, ValidatedInvoice};
pub use invoice::{Invoice, InvoiceId, InvoiceStatus, LineItem, LineItemId, TransitionPolicy};
