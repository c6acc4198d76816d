//! Integration tests for configuration resolution and graceful degradation
//!
//! - Missing config files SHALL NOT cause failure (defaults + warning)
//! - Priority order: explicit path > MQA_CONFIG > platform dir > defaults
//! - Malformed files are reported as configuration errors
//!
//! Tests that manipulate MQA_CONFIG are marked #[serial] to avoid env races.

use mqa_common::config::{ConfigResolver, TomlConfig, CONFIG_ENV_VAR};
use mqa_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_env_var_selects_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "env.toml", "[logging]\nlevel = \"warn\"\n");
    env::set_var(CONFIG_ENV_VAR, &path);

    let resolver = ConfigResolver::new();
    assert_eq!(resolver.resolve(), Some(path));
    let config = resolver.load().unwrap();
    assert_eq!(config.logging.level, "warn");

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_explicit_path_beats_env_var() {
    let dir = TempDir::new().unwrap();
    let env_path = write_config(&dir, "env.toml", "[logging]\nlevel = \"warn\"\n");
    let explicit = write_config(&dir, "explicit.toml", "[logging]\nlevel = \"trace\"\n");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let config = ConfigResolver::with_path(&explicit).load().unwrap();
    assert_eq!(config.logging.level, "trace");

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let config = ConfigResolver::with_path(&missing).load().unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.toml", "[drift.distributions.x\nversion = 1");

    let result = ConfigResolver::with_path(&path).load();
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("bad.toml")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_distributions_loaded_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "dist.toml",
        r#"
[drift.distributions.ambient_v1]
version = "0.3.0"

[drift.distributions.ambient_v1.signals.integratedLoudness]
mean = -18.0
std = 3.0
min = -30.0
max = -10.0
weight = 2.0
"#,
    );

    let config = ConfigResolver::with_path(&path).load().unwrap();
    let dist = &config.drift.distributions["ambient_v1"];
    assert_eq!(dist.version, "0.3.0");
    assert_eq!(dist.signals["integratedLoudness"].weight, Some(2.0));
}
