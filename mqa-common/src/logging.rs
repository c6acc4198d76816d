//! Tracing subscriber initialisation
//!
//! `RUST_LOG` overrides the configured level so operators can raise verbosity
//! for a single run without editing the config file.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Build the env filter for a logging config
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level)
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", config.level, e)))
}

/// Install the global fmt subscriber
///
/// Returns `Ok(false)` when a global subscriber was already installed
/// (e.g. a host application or an earlier call), which is not an error.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = build_filter(config)?;

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .is_ok()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::debug!("Tracing initialised at level '{}'", config.level);
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_invalid_level_rejected() {
        let saved = env::var_os("RUST_LOG");
        env::remove_var("RUST_LOG");

        let config = LoggingConfig {
            level: "mqa_signals=loudest".to_string(),
            file: None,
        };
        let result = build_filter(&config);

        if let Some(value) = saved {
            env::set_var("RUST_LOG", value);
        }
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_rust_log_overrides_configured_level() {
        let saved = env::var_os("RUST_LOG");
        env::set_var("RUST_LOG", "debug");

        let config = LoggingConfig {
            level: "mqa_signals=loudest".to_string(),
            file: None,
        };
        let result = build_filter(&config);

        match saved {
            Some(value) => env::set_var("RUST_LOG", value),
            None => env::remove_var("RUST_LOG"),
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_valid_directive_accepted() {
        let config = LoggingConfig {
            level: "mqa_signals=debug,info".to_string(),
            file: None,
        };
        assert!(build_filter(&config).is_ok());
    }
}
