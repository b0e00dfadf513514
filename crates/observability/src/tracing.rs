//! Tracing/logging initialization.
//!
//! The engine logs entitlement denials, numbering races, and billing-event
//! failures through `tracing`; this is the one place the subscriber gets
//! wired up.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// JSON lines, filterable via `RUST_LOG`, defaulting to `info`. Safe to call
/// multiple times (subsequent calls are no-ops), which also makes it usable
/// from test binaries.
pub fn init() {
    init_with_default_filter("info");
}

/// Like [`init`], with a custom fallback filter for when `RUST_LOG` is unset.
pub fn init_with_default_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
