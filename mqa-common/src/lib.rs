//! # MQA Common Library
//!
//! Shared code for the mastering QA workspace:
//! - Error type used across crates
//! - TOML configuration loading and path resolution
//! - Tracing subscriber initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
