//! Error types for mqa-signals
//!
//! Check and detect operations never fail; these errors only cover
//! construction-time concerns (registry extension, distribution loading,
//! JSON ingestion, configuration).

use thiserror::Error;

/// Result type for mqa-signals construction APIs
pub type SignalResult<T> = Result<T, SignalError>;

#[derive(Debug, Error)]
pub enum SignalError {
    /// Input could not be interpreted as a signal vector
    #[error("Invalid signal vector: {0}")]
    InvalidSignalVector(String),

    /// Input could not be interpreted as a processing parameter map
    #[error("Invalid processing parameters: {0}")]
    InvalidParameters(String),

    /// A rule with the same id is already registered
    #[error("Duplicate rule id: {0}")]
    DuplicateRule(String),

    /// Training distribution failed validation
    #[error("Invalid distribution for model '{model}', signal '{signal}': {reason}")]
    InvalidDistribution {
        model: String,
        signal: String,
        reason: String,
    },

    /// mqa-common error (config, io)
    #[error("Common error: {0}")]
    Common(#[from] mqa_common::Error),
}
