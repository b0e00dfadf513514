//! Clients domain module.
//!
//! A client is the billed party on an invoice. Clients are never hard-deleted;
//! they toggle between Active and Inactive, and only active clients count
//! against the plan's client limit.

pub mod client;

pub use client::{Client, ClientId, ClientInput, ClientStatus};
