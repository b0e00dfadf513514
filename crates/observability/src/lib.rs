//! `billforge-observability` — logging/tracing setup shared by every
//! billforge entry point (services, tools, tests).

pub mod tracing;

pub use tracing::init;
