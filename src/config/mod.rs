//! Building Configuration Module
//!
//! Provides per-building configuration loaded from TOML files, replacing all
//! hardcoded tariffs and detection tuning with operator-settable values.
//!
//! ## Loading Order
//!
//! 1. `ENERLENS_CONFIG` environment variable (path to TOML file)
//! 2. `building_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(BuildingConfig::load());
//!
//! // Anywhere in the codebase:
//! let tariff = config::get().tariff.cost_per_kwh;
//! ```

mod building_config;

pub use building_config::*;

use std::sync::OnceLock;

/// Global building configuration, initialized once at startup.
static BUILDING_CONFIG: OnceLock<BuildingConfig> = OnceLock::new();

/// Initialize the global building configuration.
///
/// Must be called exactly once before any calls to `get()`. A second call
/// is ignored with a warning.
pub fn init(config: BuildingConfig) {
    if BUILDING_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a reference to the global building configuration.
///
/// Panics if `init()` has not been called. A missing config is a fatal
/// startup error, not a recoverable condition.
#[allow(clippy::expect_used)]
pub fn get() -> &'static BuildingConfig {
    BUILDING_CONFIG
        .get()
        .expect("config::get() called before config::init() — this is a startup bug")
}

/// Check whether the config has been initialized.
///
/// Useful for tests and optional config paths.
pub fn is_initialized() -> bool {
    BUILDING_CONFIG.get().is_some()
}
