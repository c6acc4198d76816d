//! Integration tests for tracing initialisation
//!
//! Kept in their own test binary: the first successful `init_tracing` call
//! owns the process-wide subscriber. Tests touching `RUST_LOG` or the global
//! subscriber are marked #[serial].

use mqa_common::config::LoggingConfig;
use mqa_common::logging::init_tracing;
use mqa_common::Error;
use serial_test::serial;
use std::env;
use std::ffi::OsString;
use std::fs;
use tempfile::TempDir;

/// Runs `f` with `RUST_LOG` unset, restoring the previous value afterwards
fn without_rust_log<R>(f: impl FnOnce() -> R) -> R {
    let saved: Option<OsString> = env::var_os("RUST_LOG");
    env::remove_var("RUST_LOG");
    let result = f();
    if let Some(value) = saved {
        env::set_var("RUST_LOG", value);
    }
    result
}

#[test]
#[serial]
fn test_init_with_file_then_second_call_is_noop() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("mqa.log");
    let config = LoggingConfig {
        level: "info".to_string(),
        file: Some(log_path.clone()),
    };

    let first = without_rust_log(|| init_tracing(&config));
    assert!(matches!(first, Ok(true)), "first init: {:?}", first);
    assert!(log_path.exists());

    tracing::info!("written through the file subscriber");
    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("written through the file subscriber"));
    assert!(!contents.contains('\u{1b}'), "file output must not carry ANSI codes");

    let second = without_rust_log(|| init_tracing(&LoggingConfig::default()));
    assert!(matches!(second, Ok(false)), "second init: {:?}", second);
}

#[test]
#[serial]
fn test_invalid_level_is_config_error() {
    let config = LoggingConfig {
        level: "mqa_signals=loudest".to_string(),
        file: None,
    };
    let result = without_rust_log(|| init_tracing(&config));
    assert!(matches!(result, Err(Error::Config(_))));
}
