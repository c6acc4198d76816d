//! Processing parameter maps and alias normalization
//!
//! Presets and API clients spell the same parameter several ways
//! (`eq_boost`, `eqBoost`, `max_eq_boost`). Conflict rules only ever read
//! canonical camelCase keys, so every map goes through
//! [`normalize_parameters`] first.

use crate::error::{SignalError, SignalResult};
use crate::signals::json_kind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Canonical parameter keys
pub mod keys {
    pub const EQ_BOOST_MAX: &str = "eqBoostMax";
    pub const COMPRESSION_RATIO: &str = "compressionRatio";
    pub const LIMITER_THRESHOLD: &str = "limiterThreshold";
    pub const STEREO_WIDTH: &str = "stereoWidth";
    pub const MONO_COMPATIBLE: &str = "monoCompatible";
    pub const PRESERVE_DYNAMICS: &str = "preserveDynamics";
    pub const MAXIMIZE_LOUDNESS: &str = "maximizeLoudness";
    pub const LIMITER_COUNT: &str = "limiterCount";
    pub const BIT_DEPTH: &str = "bitDepth";
    pub const DITHER: &str = "dither";
    pub const TARGET_LOUDNESS: &str = "targetLoudness";
    pub const TRUE_PEAK_CEILING: &str = "truePeakCeiling";
}

/// Alias → canonical key, in precedence order
///
/// When several aliases of one canonical key are present, the first listed wins.
pub const PARAMETER_ALIASES: &[(&str, &str)] = &[
    ("eq_boost", keys::EQ_BOOST_MAX),
    ("eqBoost", keys::EQ_BOOST_MAX),
    ("max_eq_boost", keys::EQ_BOOST_MAX),
    ("ratio", keys::COMPRESSION_RATIO),
    ("compression_ratio", keys::COMPRESSION_RATIO),
    ("limiter_threshold", keys::LIMITER_THRESHOLD),
    ("threshold", keys::LIMITER_THRESHOLD),
    ("stereo_width", keys::STEREO_WIDTH),
    ("width", keys::STEREO_WIDTH),
    ("mono_compatible", keys::MONO_COMPATIBLE),
    ("preserve_dynamics", keys::PRESERVE_DYNAMICS),
    ("maximize_loudness", keys::MAXIMIZE_LOUDNESS),
    ("limiter_count", keys::LIMITER_COUNT),
    ("bit_depth", keys::BIT_DEPTH),
    ("output_bit_depth", keys::BIT_DEPTH),
    ("target_lufs", keys::TARGET_LOUDNESS),
    ("target_loudness", keys::TARGET_LOUDNESS),
    ("ceiling", keys::TRUE_PEAK_CEILING),
    ("true_peak_ceiling", keys::TRUE_PEAK_CEILING),
];

/// Canonical key for an alias, `None` if `key` is not an alias
pub fn canonical_key(key: &str) -> Option<&'static str> {
    PARAMETER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
}

/// Parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(f64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Flag(b) => write!(f, "{}", b),
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Requested processing parameters keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProcessingParameters {
    values: BTreeMap<String, ParamValue>,
}

impl ProcessingParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Finite numeric value
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(ParamValue::Number(n)) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(ParamValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// True only for an explicit `true`
    pub fn is_enabled(&self, key: &str) -> bool {
        self.flag(key) == Some(true)
    }

    /// Overlay `other` on top of `self`, `other` wins on shared keys
    pub fn merge(&mut self, other: &ProcessingParameters) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Build from a JSON object
    ///
    /// `null`s and nested values are ignored; a non-object is rejected.
    pub fn from_json(value: &serde_json::Value) -> SignalResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            SignalError::InvalidParameters(format!(
                "expected JSON object, got {}",
                json_kind(value)
            ))
        })?;

        let mut params = Self::new();
        for (key, raw) in object {
            let parsed = match raw {
                serde_json::Value::Bool(b) => Some(ParamValue::Flag(*b)),
                serde_json::Value::Number(n) => n.as_f64().map(ParamValue::Number),
                serde_json::Value::String(s) => Some(ParamValue::Text(s.clone())),
                _ => None,
            };
            match parsed {
                Some(v) => {
                    params.values.insert(key.clone(), v);
                }
                None => debug!("Ignoring {} value for parameter '{}'", json_kind(raw), key),
            }
        }
        Ok(params)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ProcessingParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Rewrite aliases to canonical keys
///
/// A canonical key already present is never overwritten and the alias is
/// dropped. Unknown keys pass through unchanged.
pub fn normalize_parameters(params: &ProcessingParameters) -> ProcessingParameters {
    let mut normalized = ProcessingParameters::new();

    for (key, value) in &params.values {
        if canonical_key(key).is_none() {
            normalized.values.insert(key.clone(), value.clone());
        }
    }

    for (alias, canonical) in PARAMETER_ALIASES {
        let Some(value) = params.values.get(*alias) else {
            continue;
        };
        if normalized.contains(canonical) {
            debug!(
                "Dropping alias '{}': '{}' already set",
                alias, canonical
            );
            continue;
        }
        normalized
            .values
            .insert((*canonical).to_string(), value.clone());
    }

    normalized
}
