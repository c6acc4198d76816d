//! Hard out-of-distribution indicators
//!
//! Model-independent checks for audio no model should be trusted on.
//! Missing or non-numeric inputs never fire an indicator.

use crate::signals::{SignalName, SignalVector};
use crate::types::Severity;
use serde::Serialize;
use tracing::debug;

pub const SILENCE_MAX_LOUDNESS: f64 = -55.0;
pub const SILENCE_MAX_RMS: f64 = -60.0;
pub const NOISE_MAX_CREST_FACTOR: f64 = 1.2;
pub const MIN_DURATION_SECS: f64 = 3.0;
pub const MAX_DURATION_SECS: f64 = 1800.0;
pub const MONO_SUM_CANCELLATION_CORRELATION: f64 = -0.9;
pub const MAX_DC_OFFSET: f64 = 0.1;
pub const MIN_BPM: f64 = 40.0;
pub const MAX_BPM: f64 = 250.0;

pub const STANDARD_SAMPLE_RATES: [f64; 13] = [
    8000.0, 11025.0, 16000.0, 22050.0, 32000.0, 44100.0, 48000.0, 88200.0, 96000.0, 176400.0,
    192000.0, 352800.0, 384000.0,
];

/// HIGH indicators that together make a vector OOD
pub const OOD_HIGH_COUNT: usize = 2;

/// A hard OOD check
pub struct OodIndicator {
    pub id: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub check: fn(&SignalVector) -> bool,
}

impl std::fmt::Debug for OodIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OodIndicator")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .finish()
    }
}

pub static OOD_INDICATORS: [OodIndicator; 8] = [
    OodIndicator {
        id: "SILENCE",
        description: "Audio is silent or near-silent",
        severity: Severity::Critical,
        check: is_silence,
    },
    OodIndicator {
        id: "NOISE_ONLY",
        description: "Crest factor near 1 suggests noise without musical content",
        severity: Severity::High,
        check: is_noise_only,
    },
    OodIndicator {
        id: "EXTREME_DURATION",
        description: "Duration outside the range any model was trained on",
        severity: Severity::Medium,
        check: is_extreme_duration,
    },
    OodIndicator {
        id: "MONO_SUM_CANCELLATION",
        description: "Channels cancel when summed to mono",
        severity: Severity::High,
        check: is_mono_sum_cancellation,
    },
    OodIndicator {
        id: "CLIPPED_AUDIO",
        description: "True peak above full scale",
        severity: Severity::Medium,
        check: is_clipped,
    },
    OodIndicator {
        id: "DC_OFFSET",
        description: "Significant DC offset",
        severity: Severity::Medium,
        check: has_dc_offset,
    },
    OodIndicator {
        id: "EXTREME_BPM",
        description: "Tempo outside the musically plausible range",
        severity: Severity::Medium,
        check: is_extreme_bpm,
    },
    OodIndicator {
        id: "INVALID_SAMPLE_RATE",
        description: "Sample rate is not a standard audio rate",
        severity: Severity::Critical,
        check: is_invalid_sample_rate,
    },
];

fn is_silence(s: &SignalVector) -> bool {
    let quiet_loudness = s
        .number(SignalName::IntegratedLoudness)
        .is_some_and(|l| l < SILENCE_MAX_LOUDNESS);
    let quiet_rms = s
        .number(SignalName::RmsLevel)
        .is_some_and(|r| r < SILENCE_MAX_RMS);
    quiet_loudness || quiet_rms
}

fn is_noise_only(s: &SignalVector) -> bool {
    s.number(SignalName::CrestFactor)
        .is_some_and(|c| c < NOISE_MAX_CREST_FACTOR)
}

fn is_extreme_duration(s: &SignalVector) -> bool {
    s.number(SignalName::Duration)
        .is_some_and(|d| d < MIN_DURATION_SECS || d > MAX_DURATION_SECS)
}

fn is_mono_sum_cancellation(s: &SignalVector) -> bool {
    s.number(SignalName::PhaseCorrelation)
        .is_some_and(|c| c <= MONO_SUM_CANCELLATION_CORRELATION)
}

fn is_clipped(s: &SignalVector) -> bool {
    s.number(SignalName::TruePeak).is_some_and(|p| p > 0.0)
}

fn has_dc_offset(s: &SignalVector) -> bool {
    s.number(SignalName::DcOffset)
        .is_some_and(|d| d.abs() > MAX_DC_OFFSET)
}

fn is_extreme_bpm(s: &SignalVector) -> bool {
    s.number(SignalName::Bpm)
        .is_some_and(|b| b < MIN_BPM || b > MAX_BPM)
}

fn is_invalid_sample_rate(s: &SignalVector) -> bool {
    s.number(SignalName::SampleRate)
        .is_some_and(|rate| !STANDARD_SAMPLE_RATES.contains(&rate))
}

/// An indicator that fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredIndicator {
    pub id: String,
    pub description: String,
    pub severity: Severity,
}

/// Result of `check_ood_indicators`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OodCheck {
    pub is_ood: bool,
    pub indicators: Vec<TriggeredIndicator>,
    pub critical_count: usize,
    pub high_count: usize,
}

impl OodCheck {
    /// Most severe fired indicator
    pub fn worst_severity(&self) -> Severity {
        self.indicators
            .iter()
            .map(|i| i.severity)
            .max()
            .unwrap_or(Severity::None)
    }
}

/// Run every hard indicator
///
/// `isOod` when any CRITICAL indicator fires or at least two HIGH ones do.
pub fn check_ood_indicators(signals: &SignalVector) -> OodCheck {
    let indicators: Vec<TriggeredIndicator> = OOD_INDICATORS
        .iter()
        .filter(|indicator| (indicator.check)(signals))
        .map(|indicator| TriggeredIndicator {
            id: indicator.id.to_string(),
            description: indicator.description.to_string(),
            severity: indicator.severity,
        })
        .collect();

    let critical_count = indicators
        .iter()
        .filter(|i| i.severity == Severity::Critical)
        .count();
    let high_count = indicators
        .iter()
        .filter(|i| i.severity == Severity::High)
        .count();
    let is_ood = critical_count > 0 || high_count >= OOD_HIGH_COUNT;

    if !indicators.is_empty() {
        debug!(
            is_ood,
            fired = indicators.len(),
            "OOD indicators: {}",
            indicators
                .iter()
                .map(|i| i.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    OodCheck {
        is_ood,
        indicators,
        critical_count,
        high_count,
    }
}
