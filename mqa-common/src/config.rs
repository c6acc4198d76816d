//! Configuration loading and config file resolution
//!
//! The signal core is driven almost entirely by compiled-in tables. The TOML
//! file only carries bootstrap concerns:
//! - logging level / optional log file
//! - extra training distributions registered at startup
//!
//! # Resolution priority
//!
//! 1. Explicit path passed by the caller (highest priority)
//! 2. `MQA_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/mqa/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing file is never fatal: a warning is logged and defaults are used.
//! A file that exists but cannot be parsed is a configuration error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MQA_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Drift detector configuration (optional)
    #[serde(default)]
    pub drift: DriftConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Drift detector section
///
/// ```toml
/// [drift.distributions.house_v1]
/// version = "1.0.0"
///
/// [drift.distributions.house_v1.signals.bpm]
/// mean = 124.0
/// std = 4.0
/// min = 110.0
/// max = 135.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Extra training distributions keyed by model id
    #[serde(default)]
    pub distributions: BTreeMap<String, DistributionConfig>,
}

/// One configured training distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub version: String,
    /// Per-signal statistics keyed by camelCase signal name
    #[serde(default)]
    pub signals: BTreeMap<String, SignalStatsConfig>,
}

/// Raw per-signal statistics as written in TOML
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStatsConfig {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Defaults to 1.0 when omitted
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Resolves which config file (if any) should be read
pub struct ConfigResolver {
    explicit: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver with no explicit override
    pub fn new() -> Self {
        Self { explicit: None }
    }

    /// Resolver that prefers the given path over every other source
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit: Some(path.into()),
        }
    }

    /// Resolve config file path following the priority order
    ///
    /// Returns `None` when no source names a file, meaning compiled defaults apply.
    pub fn resolve(&self) -> Option<PathBuf> {
        // Priority 1: explicit path
        if let Some(path) = &self.explicit {
            return Some(path.clone());
        }

        // Priority 2: environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: platform config directory, only if the file exists
        default_config_path().filter(|p| p.exists())
    }

    /// Resolve and load configuration
    ///
    /// Missing files degrade to defaults with a warning. Parse failures are errors.
    pub fn load(&self) -> Result<TomlConfig> {
        let Some(path) = self.resolve() else {
            info!("No config file found, using compiled defaults");
            return Ok(TomlConfig::default());
        };

        if !path.exists() {
            warn!(
                "Config file {} does not exist, using compiled defaults",
                path.display()
            );
            return Ok(TomlConfig::default());
        }

        load_toml_config(&path)
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform default location: `<config_dir>/mqa/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mqa").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    info!(
        "Loaded config from {} ({} extra distribution(s))",
        path.display(),
        config.drift.distributions.len()
    );
    Ok(config)
}

/// Parse TOML text into a config
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = parse_toml_config("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert!(config.drift.distributions.is_empty());
    }

    #[test]
    fn test_distribution_section_parses() {
        let config = parse_toml_config(
            r#"
            [logging]
            level = "debug"

            [drift.distributions.house_v1]
            version = "1.0.0"

            [drift.distributions.house_v1.signals.bpm]
            mean = 124.0
            std = 4.0
            min = 110.0
            max = 135.0
            weight = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        let dist = &config.drift.distributions["house_v1"];
        assert_eq!(dist.version, "1.0.0");
        let bpm = dist.signals["bpm"];
        assert_eq!(bpm.mean, 124.0);
        assert_eq!(bpm.weight, Some(1.5));
    }

    #[test]
    fn test_weight_is_optional() {
        let config = parse_toml_config(
            r#"
            [drift.distributions.m.signals.truePeak]
            mean = -1.0
            std = 0.5
            min = -3.0
            max = 0.0
            "#,
        );
        // version is required
        assert!(config.is_err());

        let config = parse_toml_config(
            r#"
            [drift.distributions.m]
            version = "0.1"
            [drift.distributions.m.signals.truePeak]
            mean = -1.0
            std = 0.5
            min = -3.0
            max = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.drift.distributions["m"].signals["truePeak"].weight, None);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let result = parse_toml_config("[logging\nlevel = ");
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_explicit_path_takes_priority() {
        let resolver = ConfigResolver::with_path("/tmp/mqa-explicit.toml");
        assert_eq!(
            resolver.resolve(),
            Some(PathBuf::from("/tmp/mqa-explicit.toml"))
        );
    }
}
