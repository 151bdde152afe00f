//! # Telemetry
//!
//! Tracing subscriber setup for shells embedding the storefront.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=storefront_checkout=trace` - Trace one crate only
//! - Default: `info`, debug for every `storefront*` target, warn for sqlx

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,storefront=debug,sqlx=warn";

/// Installs the global fmt subscriber.
///
/// Returns `false` if a subscriber was already installed (for example by the
/// host shell or an earlier call); the existing one stays in place.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
