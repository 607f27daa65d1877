//! Configuration management for the compliance dashboard
//!
//! Settings come from, in increasing precedence:
//! 1. built-in defaults (band 16/18/24/26 °C, 30 simulated days)
//! 2. a TOML file (`--config`, or `site-compliance/config.toml` in the user config dir)
//! 3. `SITE_COMPLIANCE_*` environment variables

use crate::compliance::ComplianceBand;
use crate::error::{ComplianceError, Result};
use crate::simulation::SimulationConfig;
use crate::utils::parse_with_context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "site-compliance";

/// Config file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Compliance thresholds shared by every view
    pub band: ComplianceBand,

    /// Demo data generation
    pub simulation: SimulationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable structured JSON logging
    pub json_format: bool,

    /// Log to file (path)
    pub file: Option<PathBuf>,

    /// Log to stderr
    pub stderr: bool,

    /// Include thread IDs in log lines
    pub thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file: None,
            stderr: true,
            thread_ids: false,
        }
    }
}

impl DashboardConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ComplianceError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// `<config dir>/site-compliance/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Resolve the full configuration.
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// when present. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(default_path) => Self::load_from_file(&default_path)?,
                None => Self::default(),
            },
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SITE_COMPLIANCE_*` overrides
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(band) = env::var("SITE_COMPLIANCE_BAND") {
            self.band = parse_band(&band)?;
        }

        if let Ok(days) = env::var("SITE_COMPLIANCE_DAYS") {
            self.simulation.days = days
                .trim()
                .parse()
                .map_err(|e| ComplianceError::config(format!("Invalid SITE_COMPLIANCE_DAYS: {e}")))?;
        }

        if let Ok(seed) = env::var("SITE_COMPLIANCE_SEED") {
            self.simulation.seed = Some(
                seed.trim()
                    .parse()
                    .map_err(|e| ComplianceError::config(format!("Invalid SITE_COMPLIANCE_SEED: {e}")))?,
            );
        }

        if let Ok(end_date) = env::var("SITE_COMPLIANCE_END_DATE") {
            self.simulation.end_date = Some(
                NaiveDate::parse_from_str(end_date.trim(), "%Y-%m-%d").map_err(|e| {
                    ComplianceError::config(format!("Invalid SITE_COMPLIANCE_END_DATE: {e}"))
                })?,
            );
        }

        if let Ok(level) = env::var("RUST_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()
    }
}

/// Parse `"lc,la,ha,hc"` into a validated band
pub fn parse_band(value: &str) -> Result<ComplianceBand> {
    let thresholds = value
        .split(',')
        .map(|part| parse_with_context::<f64, _>(part.trim(), "band threshold"))
        .collect::<Result<Vec<_>>>()
        .map_err(|e| ComplianceError::config(format!("Invalid SITE_COMPLIANCE_BAND: {e}")))?;

    match thresholds.as_slice() {
        &[low_critical, low_alert, high_alert, high_critical] => {
            ComplianceBand::new(low_critical, low_alert, high_alert, high_critical)
                .map_err(|e| ComplianceError::config(format!("Invalid SITE_COMPLIANCE_BAND: {e}")))
        }
        _ => Err(ComplianceError::config(format!(
            "Invalid SITE_COMPLIANCE_BAND: expected 4 comma separated thresholds, got {}",
            thresholds.len()
        ))),
    }
}
