//! Logging utilities
//!
//! Provides logging configuration and helpers.

use tracing_subscriber::EnvFilter;

/// Initialize the logger. Debug mode turns on per-request diagnostics;
/// `RUST_LOG` overrides everything.
pub fn init_logger(debug: bool) {
    let default_directive = if debug {
        "gateway_conformance=debug"
    } else {
        "gateway_conformance=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
