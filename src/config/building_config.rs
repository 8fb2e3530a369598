//! Building Configuration - tariffs and detection tuning as TOML values
//!
//! Every tunable that was previously hardcoded is a field here. Each struct
//! implements `Default` with values matching the original constants, so
//! behavior is unchanged when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::types::thresholds::waste_thresholds;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a building deployment.
///
/// Load with `BuildingConfig::load()` which searches:
/// 1. `$ENERLENS_CONFIG` env var
/// 2. `./building_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingConfig {
    /// Building identification
    #[serde(default)]
    pub building: BuildingInfo,

    /// Electricity tariff
    #[serde(default)]
    pub tariff: TariffConfig,

    /// Classifier tuning beyond the adaptive watt thresholds
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Alert lifecycle tuning
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Report generation tuning
    #[serde(default)]
    pub report: ReportConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Persistence paths
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            building: BuildingInfo::default(),
            tariff: TariffConfig::default(),
            classifier: ClassifierConfig::default(),
            alerts: AlertConfig::default(),
            report: ReportConfig::default(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Building identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingInfo {
    /// Building identifier used when requests don't carry one.
    #[serde(default = "default_building_id")]
    pub id: String,
    /// Display name for reports.
    #[serde(default = "default_building_name")]
    pub name: String,
}

fn default_building_id() -> String {
    "BLDG01".to_string()
}

fn default_building_name() -> String {
    "Default Building".to_string()
}

impl Default for BuildingInfo {
    fn default() -> Self {
        Self {
            id: default_building_id(),
            name: default_building_name(),
        }
    }
}

/// Electricity tariff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffConfig {
    /// Currency units per kWh. Commercial rate; overridable per evaluation.
    #[serde(default = "default_cost_per_kwh")]
    pub cost_per_kwh: f64,
    /// ISO currency code, descriptive only.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_cost_per_kwh() -> f64 {
    8.0
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            cost_per_kwh: default_cost_per_kwh(),
            currency: default_currency(),
        }
    }
}

/// Classifier tuning that is not part of the adaptive threshold snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Fraction of an occupied-time disparity attributed to waste rather
    /// than legitimate load.
    #[serde(default = "default_inefficient_fraction")]
    pub inefficient_attribution_fraction: f64,
    /// Daily cost above which post-occupancy waste escalates to High.
    #[serde(default = "default_post_occupancy_daily_cost_high")]
    pub post_occupancy_daily_cost_high: f64,
    /// Occupancy confidence assumed when a known status arrives without one.
    #[serde(default = "default_occupancy_confidence")]
    pub default_occupancy_confidence: f64,
}

fn default_inefficient_fraction() -> f64 {
    0.6
}

fn default_post_occupancy_daily_cost_high() -> f64 {
    waste_thresholds::POST_OCCUPANCY_DAILY_COST_HIGH
}

fn default_occupancy_confidence() -> f64 {
    0.8
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            inefficient_attribution_fraction: default_inefficient_fraction(),
            post_occupancy_daily_cost_high: default_post_occupancy_daily_cost_high(),
            default_occupancy_confidence: default_occupancy_confidence(),
        }
    }
}

/// Alert lifecycle tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Repeat insights for one device within this many hours fold into the
    /// existing alert. 24 approximates "same calendar day".
    #[serde(default = "default_dedup_window_hours")]
    pub dedup_window_hours: f64,
    /// Consecutive clean evaluation cycles before an Approved alert resolves.
    #[serde(default = "default_resolve_after_clean_cycles")]
    pub resolve_after_clean_cycles: u32,
}

fn default_dedup_window_hours() -> f64 {
    24.0
}

fn default_resolve_after_clean_cycles() -> u32 {
    3
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            dedup_window_hours: default_dedup_window_hours(),
            resolve_after_clean_cycles: default_resolve_after_clean_cycles(),
        }
    }
}

/// Report generation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of top leaks included in a building report.
    #[serde(default = "default_top_leaks")]
    pub top_leaks: usize,
}

fn default_top_leaks() -> usize {
    3
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_leaks: default_top_leaks(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Persistence paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled database directory for alerts, recommendations, and feedback.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "./data/enerlens.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

// ============================================================================
// Loading & Validation
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl BuildingConfig {
    /// Load configuration using the standard search order:
    /// 1. `$ENERLENS_CONFIG` environment variable
    /// 2. `./building_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("ENERLENS_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), building = %config.building.id, "Loaded building config from ENERLENS_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from ENERLENS_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "ENERLENS_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("building_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(building = %config.building.id, "Loaded building config from ./building_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./building_config.toml, using defaults");
                }
            }
        }

        info!("No building_config.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tariff.cost_per_kwh <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tariff.cost_per_kwh must be positive, got {}",
                self.tariff.cost_per_kwh
            )));
        }
        let frac = self.classifier.inefficient_attribution_fraction;
        if !(0.0..=1.0).contains(&frac) {
            return Err(ConfigError::Invalid(format!(
                "classifier.inefficient_attribution_fraction must be in [0,1], got {frac}"
            )));
        }
        if self.alerts.dedup_window_hours <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "alerts.dedup_window_hours must be positive, got {}",
                self.alerts.dedup_window_hours
            )));
        }
        if self.alerts.resolve_after_clean_cycles == 0 {
            return Err(ConfigError::Invalid(
                "alerts.resolve_after_clean_cycles must be at least 1".to_string(),
            ));
        }
        if self.report.top_leaks == 0 {
            return Err(ConfigError::Invalid(
                "report.top_leaks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
