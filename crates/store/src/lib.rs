//! Storage boundary for the invoicing core.
//!
//! The engine talks to relational storage through the traits in this crate;
//! [`memory::InMemoryStore`] is the dev/test implementation. The store owns
//! the two guarantees the domain cannot provide on its own: the
//! `(tenant, invoice number)` uniqueness constraint and the atomicity of an
//! invoice header written together with its line items.

pub mod error;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use store::{ClientStore, InvoiceStore, Store, SubscriptionStore, TemplateStore};
