//! Console logging setup using the tracing ecosystem.
//!
//! Console-only output for containerized deployments; level control through
//! `RUST_LOG` with an `info` default. Binaries and test harnesses call
//! [`init`] once at startup.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber. Safe to call more than once; later
/// calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
