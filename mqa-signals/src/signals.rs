//! Typed signal bag
//!
//! Signal producers (audio analysis, the single-metric estimators) emit flat
//! maps of named values. `SignalVector` keeps that shape but closes the set of
//! names: every key is a `SignalName`, every value a `SignalValue`.
//!
//! Absence of a signal means "not evaluated" and is never an error. Rules and
//! detectors check presence with [`SignalVector::missing`] and skip.

use crate::error::{SignalError, SignalResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Known signal names (camelCase on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignalName {
    /// Tempo in beats per minute
    Bpm,
    /// Normalised sub-bass band energy (0-1)
    SubBassEnergy,
    /// Integrated loudness, LUFS
    IntegratedLoudness,
    /// True peak, dBTP
    TruePeak,
    /// Linear peak/RMS ratio
    CrestFactor,
    /// Dynamic range, dB
    DynamicRange,
    /// Loudness range, LU
    LoudnessRange,
    /// RMS level, dBFS
    RmsLevel,
    /// Stereo image width (0 = mono, 1 = full, >1 = widened)
    StereoWidth,
    /// L/R phase correlation (-1..1)
    PhaseCorrelation,
    TransientSharpness,
    TransientDensity,
    /// Spectral centroid, Hz
    SpectralCentroid,
    /// Sample rate, Hz
    SampleRate,
    BitDepth,
    /// Duration, seconds
    Duration,
    /// DC offset as fraction of full scale
    DcOffset,
    Subgenre,
    SubgenreConfidence,
    IsHybrid,
    HasClipping,
    IsSilent,
    /// "mono" / "stereo" / other layouts
    ChannelTopology,
}

impl SignalName {
    pub const ALL: [SignalName; 23] = [
        SignalName::Bpm,
        SignalName::SubBassEnergy,
        SignalName::IntegratedLoudness,
        SignalName::TruePeak,
        SignalName::CrestFactor,
        SignalName::DynamicRange,
        SignalName::LoudnessRange,
        SignalName::RmsLevel,
        SignalName::StereoWidth,
        SignalName::PhaseCorrelation,
        SignalName::TransientSharpness,
        SignalName::TransientDensity,
        SignalName::SpectralCentroid,
        SignalName::SampleRate,
        SignalName::BitDepth,
        SignalName::Duration,
        SignalName::DcOffset,
        SignalName::Subgenre,
        SignalName::SubgenreConfidence,
        SignalName::IsHybrid,
        SignalName::HasClipping,
        SignalName::IsSilent,
        SignalName::ChannelTopology,
    ];

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            SignalName::Bpm => "bpm",
            SignalName::SubBassEnergy => "subBassEnergy",
            SignalName::IntegratedLoudness => "integratedLoudness",
            SignalName::TruePeak => "truePeak",
            SignalName::CrestFactor => "crestFactor",
            SignalName::DynamicRange => "dynamicRange",
            SignalName::LoudnessRange => "loudnessRange",
            SignalName::RmsLevel => "rmsLevel",
            SignalName::StereoWidth => "stereoWidth",
            SignalName::PhaseCorrelation => "phaseCorrelation",
            SignalName::TransientSharpness => "transientSharpness",
            SignalName::TransientDensity => "transientDensity",
            SignalName::SpectralCentroid => "spectralCentroid",
            SignalName::SampleRate => "sampleRate",
            SignalName::BitDepth => "bitDepth",
            SignalName::Duration => "duration",
            SignalName::DcOffset => "dcOffset",
            SignalName::Subgenre => "subgenre",
            SignalName::SubgenreConfidence => "subgenreConfidence",
            SignalName::IsHybrid => "isHybrid",
            SignalName::HasClipping => "hasClipping",
            SignalName::IsSilent => "isSilent",
            SignalName::ChannelTopology => "channelTopology",
        }
    }
}

impl fmt::Display for SignalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("Unknown signal: {}", s))
    }
}

/// Tagged signal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for SignalValue {
    fn from(value: f64) -> Self {
        SignalValue::Number(value)
    }
}

impl From<i32> for SignalValue {
    fn from(value: i32) -> Self {
        SignalValue::Number(f64::from(value))
    }
}

impl From<u32> for SignalValue {
    fn from(value: u32) -> Self {
        SignalValue::Number(f64::from(value))
    }
}

impl From<bool> for SignalValue {
    fn from(value: bool) -> Self {
        SignalValue::Flag(value)
    }
}

impl From<&str> for SignalValue {
    fn from(value: &str) -> Self {
        SignalValue::Text(value.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(value: String) -> Self {
        SignalValue::Text(value)
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Flag(b) => write!(f, "{}", b),
            SignalValue::Number(n) => write!(f, "{}", n),
            SignalValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Flat signal vector keyed by `SignalName`
///
/// Backed by a `BTreeMap` so serialisation order is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignalVector {
    values: BTreeMap<SignalName, SignalValue>,
}

impl SignalVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: SignalName, value: impl Into<SignalValue>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    pub fn insert(&mut self, name: SignalName, value: impl Into<SignalValue>) -> Option<SignalValue> {
        self.values.insert(name, value.into())
    }

    pub fn remove(&mut self, name: SignalName) -> Option<SignalValue> {
        self.values.remove(&name)
    }

    pub fn get(&self, name: SignalName) -> Option<&SignalValue> {
        self.values.get(&name)
    }

    pub fn contains(&self, name: SignalName) -> bool {
        self.values.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SignalName, &SignalValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    /// Numeric value, `None` if absent, non-numeric or NaN
    ///
    /// Infinities are returned as-is: `-inf` loudness is how digital silence
    /// is reported by some analyzers.
    pub fn number(&self, name: SignalName) -> Option<f64> {
        match self.values.get(&name) {
            Some(SignalValue::Number(n)) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    /// Text value, `None` if absent or not text
    pub fn text(&self, name: SignalName) -> Option<&str> {
        match self.values.get(&name) {
            Some(SignalValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean value, `None` if absent or not a flag
    pub fn flag(&self, name: SignalName) -> Option<bool> {
        match self.values.get(&name) {
            Some(SignalValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// True when the text signal equals `expected` ignoring case and surrounding whitespace
    pub fn text_is(&self, name: SignalName, expected: &str) -> bool {
        self.text(name)
            .map(|s| s.trim().eq_ignore_ascii_case(expected))
            .unwrap_or(false)
    }

    /// Required signals that are absent, in the order given
    pub fn missing(&self, required: &[SignalName]) -> Vec<SignalName> {
        required
            .iter()
            .copied()
            .filter(|name| !self.contains(*name))
            .collect()
    }

    pub fn has_required_signals(&self, required: &[SignalName]) -> bool {
        required.iter().all(|name| self.contains(*name))
    }

    /// Build from a JSON object produced by the analysis pipeline
    ///
    /// Unknown keys, `null`s and nested values are ignored. Anything other
    /// than an object is rejected.
    pub fn from_json(value: &serde_json::Value) -> SignalResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            SignalError::InvalidSignalVector(format!(
                "expected JSON object, got {}",
                json_kind(value)
            ))
        })?;

        let mut vector = SignalVector::new();
        for (key, raw) in object {
            let Ok(name) = key.parse::<SignalName>() else {
                debug!("Ignoring unknown signal '{}'", key);
                continue;
            };

            let parsed = match raw {
                serde_json::Value::Bool(b) => Some(SignalValue::Flag(*b)),
                serde_json::Value::Number(n) => n.as_f64().map(SignalValue::Number),
                serde_json::Value::String(s) => Some(SignalValue::Text(s.clone())),
                _ => None,
            };

            match parsed {
                Some(v) => {
                    vector.values.insert(name, v);
                }
                None => debug!("Ignoring {} value for signal '{}'", json_kind(raw), key),
            }
        }

        Ok(vector)
    }
}

impl FromIterator<(SignalName, SignalValue)> for SignalVector {
    fn from_iter<I: IntoIterator<Item = (SignalName, SignalValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
