//! Built-in consistency rules
//!
//! Thresholds are inclusive on the pass side: a value exactly at a threshold
//! is consistent.

use super::{ConsistencyRule, Verdict};
use crate::signals::{SignalName, SignalVector};
use crate::types::Severity;

// Genre/feature thresholds
pub const LOFI_MAX_TRANSIENT_SHARPNESS: f64 = 0.65;
pub const DRILL_MIN_SUB_BASS: f64 = 0.4;
pub const TRAP_MIN_BPM: f64 = 60.0;
pub const TRAP_MAX_BPM: f64 = 190.0;

// Dynamics
pub const COMPRESSED_MAX_DYNAMIC_RANGE: f64 = 4.0;
pub const COMPRESSED_MAX_CREST_FACTOR: f64 = 6.0;

// Tempo vs transients
pub const FAST_TEMPO_BPM: f64 = 140.0;
pub const FAST_TEMPO_MIN_TRANSIENT_DENSITY: f64 = 0.1;

// Stereo
pub const MONO_MAX_STEREO_WIDTH: f64 = 0.1;
pub const STEREO_MIN_STEREO_WIDTH: f64 = 0.01;
pub const ANTI_PHASE_CORRELATION: f64 = -0.5;
pub const ANTI_PHASE_MIN_WIDTH: f64 = 0.2;

// Classification
pub const HYBRID_MAX_CONFIDENCE: f64 = 0.85;

// Peaks / silence
pub const CLIPPING_MIN_TRUE_PEAK: f64 = -1.0;
pub const UNCLIPPED_MAX_TRUE_PEAK: f64 = 0.0;
pub const SILENT_MAX_LOUDNESS: f64 = -40.0;
pub const AUDIBLE_MIN_LOUDNESS: f64 = -60.0;

/// Rule backed by a plain function, used for the compiled-in table
pub struct BuiltinRule {
    pub id: &'static str,
    pub description: &'static str,
    pub signals: &'static [SignalName],
    pub eval: fn(&SignalVector) -> Verdict,
}

impl ConsistencyRule for BuiltinRule {
    fn id(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        self.description
    }

    fn signals(&self) -> &[SignalName] {
        self.signals
    }

    fn evaluate(&self, signals: &SignalVector) -> Verdict {
        (self.eval)(signals)
    }
}

/// All built-in rules in evaluation order
pub fn builtin_rules() -> Vec<BuiltinRule> {
    vec![
        BuiltinRule {
            id: "LOFI_TRANSIENT",
            description: "Lo-fi material should not have sharp transients",
            signals: &[SignalName::Subgenre, SignalName::TransientSharpness],
            eval: lofi_transient,
        },
        BuiltinRule {
            id: "DRILL_BASS",
            description: "Drill is defined by heavy sub-bass",
            signals: &[SignalName::Subgenre, SignalName::SubBassEnergy],
            eval: drill_bass,
        },
        BuiltinRule {
            id: "TRAP_BPM",
            description: "Trap tempo should fall in a plausible band",
            signals: &[SignalName::Subgenre, SignalName::Bpm],
            eval: trap_bpm,
        },
        BuiltinRule {
            id: "DYNAMIC_COMPRESSION",
            description: "Low dynamic range and high crest factor both measure dynamics and cannot coexist",
            signals: &[SignalName::DynamicRange, SignalName::CrestFactor],
            eval: dynamic_compression,
        },
        BuiltinRule {
            id: "LOUDNESS_PEAK",
            description: "True peak cannot be below integrated loudness",
            signals: &[SignalName::IntegratedLoudness, SignalName::TruePeak],
            eval: loudness_peak,
        },
        BuiltinRule {
            id: "BPM_TRANSIENT_DENSITY",
            description: "Fast tempo implies non-trivial transient density",
            signals: &[SignalName::Bpm, SignalName::TransientDensity],
            eval: bpm_transient_density,
        },
        BuiltinRule {
            id: "STEREO_MONO_TOPOLOGY",
            description: "Stereo width must agree with channel topology",
            signals: &[SignalName::StereoWidth, SignalName::ChannelTopology],
            eval: stereo_mono_topology,
        },
        BuiltinRule {
            id: "CLASSIFICATION_CONFIDENCE_HYBRID",
            description: "Hybrid classifications should not carry very high confidence",
            signals: &[SignalName::SubgenreConfidence, SignalName::IsHybrid],
            eval: classification_confidence_hybrid,
        },
        BuiltinRule {
            id: "CLIPPING_PEAK",
            description: "Clipping flag must agree with the measured true peak",
            signals: &[SignalName::HasClipping, SignalName::TruePeak],
            eval: clipping_peak,
        },
        BuiltinRule {
            id: "SILENCE_LOUDNESS",
            description: "Silence flag must agree with integrated loudness",
            signals: &[SignalName::IsSilent, SignalName::IntegratedLoudness],
            eval: silence_loudness,
        },
        BuiltinRule {
            id: "PHASE_WIDTH",
            description: "Strong anti-phase content implies a wide stereo image",
            signals: &[SignalName::PhaseCorrelation, SignalName::StereoWidth],
            eval: phase_width,
        },
    ]
}

/// Skip verdict naming the reads that failed
fn unreadable(reads: &[(SignalName, bool)]) -> Verdict {
    Verdict::Unreadable(
        reads
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| *name)
            .collect(),
    )
}

fn lofi_transient(s: &SignalVector) -> Verdict {
    let Some(subgenre) = s.text(SignalName::Subgenre) else {
        return Verdict::Unreadable(vec![SignalName::Subgenre]);
    };
    if !subgenre.trim().eq_ignore_ascii_case("lofi") {
        return Verdict::Consistent;
    }
    let Some(sharpness) = s.number(SignalName::TransientSharpness) else {
        return Verdict::Unreadable(vec![SignalName::TransientSharpness]);
    };

    if sharpness > LOFI_MAX_TRANSIENT_SHARPNESS {
        Verdict::inconsistent(
            Severity::Medium,
            format!(
                "Lo-fi classification with sharp transients ({:.2})",
                sharpness
            ),
            format!("transientSharpness <= {} for lofi", LOFI_MAX_TRANSIENT_SHARPNESS),
            format!("transientSharpness = {}", sharpness),
        )
    } else {
        Verdict::Consistent
    }
}

fn drill_bass(s: &SignalVector) -> Verdict {
    let Some(subgenre) = s.text(SignalName::Subgenre) else {
        return Verdict::Unreadable(vec![SignalName::Subgenre]);
    };
    if !subgenre.trim().eq_ignore_ascii_case("drill") {
        return Verdict::Consistent;
    }
    let Some(sub_bass) = s.number(SignalName::SubBassEnergy) else {
        return Verdict::Unreadable(vec![SignalName::SubBassEnergy]);
    };

    if sub_bass < DRILL_MIN_SUB_BASS {
        Verdict::inconsistent(
            Severity::Low,
            format!("Drill classification with weak sub-bass ({:.2})", sub_bass),
            format!("subBassEnergy >= {} for drill", DRILL_MIN_SUB_BASS),
            format!("subBassEnergy = {}", sub_bass),
        )
    } else {
        Verdict::Consistent
    }
}

fn trap_bpm(s: &SignalVector) -> Verdict {
    let Some(subgenre) = s.text(SignalName::Subgenre) else {
        return Verdict::Unreadable(vec![SignalName::Subgenre]);
    };
    if !subgenre.trim().eq_ignore_ascii_case("trap") {
        return Verdict::Consistent;
    }
    let Some(bpm) = s.number(SignalName::Bpm) else {
        return Verdict::Unreadable(vec![SignalName::Bpm]);
    };

    if !(TRAP_MIN_BPM..=TRAP_MAX_BPM).contains(&bpm) {
        Verdict::inconsistent(
            Severity::Medium,
            format!("Trap classification at implausible tempo ({} BPM)", bpm),
            format!("{} <= bpm <= {} for trap", TRAP_MIN_BPM, TRAP_MAX_BPM),
            format!("bpm = {}", bpm),
        )
    } else {
        Verdict::Consistent
    }
}

fn dynamic_compression(s: &SignalVector) -> Verdict {
    let dr = s.number(SignalName::DynamicRange);
    let crest = s.number(SignalName::CrestFactor);
    let (Some(dr), Some(crest)) = (dr, crest) else {
        return unreadable(&[
            (SignalName::DynamicRange, dr.is_some()),
            (SignalName::CrestFactor, crest.is_some()),
        ]);
    };

    if dr < COMPRESSED_MAX_DYNAMIC_RANGE && crest > COMPRESSED_MAX_CREST_FACTOR {
        Verdict::inconsistent(
            Severity::High,
            format!(
                "Heavily compressed dynamic range ({} dB) with high crest factor ({})",
                dr, crest
            ),
            format!(
                "crestFactor <= {} when dynamicRange < {}",
                COMPRESSED_MAX_CREST_FACTOR, COMPRESSED_MAX_DYNAMIC_RANGE
            ),
            format!("dynamicRange = {}, crestFactor = {}", dr, crest),
        )
    } else {
        Verdict::Consistent
    }
}

fn loudness_peak(s: &SignalVector) -> Verdict {
    let loudness = s.number(SignalName::IntegratedLoudness);
    let peak = s.number(SignalName::TruePeak);
    let (Some(loudness), Some(peak)) = (loudness, peak) else {
        return unreadable(&[
            (SignalName::IntegratedLoudness, loudness.is_some()),
            (SignalName::TruePeak, peak.is_some()),
        ]);
    };

    if peak < loudness {
        Verdict::inconsistent(
            Severity::Critical,
            format!(
                "True peak ({} dBTP) below integrated loudness ({} LUFS)",
                peak, loudness
            ),
            "truePeak >= integratedLoudness",
            format!("truePeak = {}, integratedLoudness = {}", peak, loudness),
        )
    } else {
        Verdict::Consistent
    }
}

fn bpm_transient_density(s: &SignalVector) -> Verdict {
    let bpm = s.number(SignalName::Bpm);
    let density = s.number(SignalName::TransientDensity);
    let (Some(bpm), Some(density)) = (bpm, density) else {
        return unreadable(&[
            (SignalName::Bpm, bpm.is_some()),
            (SignalName::TransientDensity, density.is_some()),
        ]);
    };

    if bpm > FAST_TEMPO_BPM && density < FAST_TEMPO_MIN_TRANSIENT_DENSITY {
        Verdict::inconsistent(
            Severity::Medium,
            format!(
                "Fast tempo ({} BPM) with almost no transients ({:.2})",
                bpm, density
            ),
            format!(
                "transientDensity >= {} when bpm > {}",
                FAST_TEMPO_MIN_TRANSIENT_DENSITY, FAST_TEMPO_BPM
            ),
            format!("bpm = {}, transientDensity = {}", bpm, density),
        )
    } else {
        Verdict::Consistent
    }
}

fn stereo_mono_topology(s: &SignalVector) -> Verdict {
    let width = s.number(SignalName::StereoWidth);
    let topology = s.text(SignalName::ChannelTopology);
    let (Some(width), Some(_)) = (width, topology) else {
        return unreadable(&[
            (SignalName::StereoWidth, width.is_some()),
            (SignalName::ChannelTopology, topology.is_some()),
        ]);
    };

    if s.text_is(SignalName::ChannelTopology, "mono") && width > MONO_MAX_STEREO_WIDTH {
        return Verdict::inconsistent(
            Severity::Medium,
            format!("Mono topology with measurable stereo width ({:.2})", width),
            format!("stereoWidth <= {} for mono", MONO_MAX_STEREO_WIDTH),
            format!("stereoWidth = {}, channelTopology = mono", width),
        );
    }

    if s.text_is(SignalName::ChannelTopology, "stereo") && width < STEREO_MIN_STEREO_WIDTH {
        // dual-mono stereo files exist, so this direction is only informational
        return Verdict::inconsistent(
            Severity::Low,
            format!("Stereo topology with no stereo width ({:.3})", width),
            format!("stereoWidth >= {} for stereo", STEREO_MIN_STEREO_WIDTH),
            format!("stereoWidth = {}, channelTopology = stereo", width),
        );
    }

    Verdict::Consistent
}

fn classification_confidence_hybrid(s: &SignalVector) -> Verdict {
    let confidence = s.number(SignalName::SubgenreConfidence);
    let hybrid = s.flag(SignalName::IsHybrid);
    let (Some(confidence), Some(hybrid)) = (confidence, hybrid) else {
        return unreadable(&[
            (SignalName::SubgenreConfidence, confidence.is_some()),
            (SignalName::IsHybrid, hybrid.is_some()),
        ]);
    };

    if hybrid && confidence > HYBRID_MAX_CONFIDENCE {
        Verdict::inconsistent(
            Severity::Low,
            format!(
                "Hybrid classification with high single-genre confidence ({:.2})",
                confidence
            ),
            format!("subgenreConfidence <= {} when hybrid", HYBRID_MAX_CONFIDENCE),
            format!("subgenreConfidence = {}, isHybrid = true", confidence),
        )
    } else {
        Verdict::Consistent
    }
}

fn clipping_peak(s: &SignalVector) -> Verdict {
    let clipping = s.flag(SignalName::HasClipping);
    let peak = s.number(SignalName::TruePeak);
    let (Some(clipping), Some(peak)) = (clipping, peak) else {
        return unreadable(&[
            (SignalName::HasClipping, clipping.is_some()),
            (SignalName::TruePeak, peak.is_some()),
        ]);
    };

    if clipping && peak < CLIPPING_MIN_TRUE_PEAK {
        Verdict::inconsistent(
            Severity::High,
            format!("Clipping reported but true peak is {} dBTP", peak),
            format!("truePeak >= {} when hasClipping", CLIPPING_MIN_TRUE_PEAK),
            format!("hasClipping = true, truePeak = {}", peak),
        )
    } else if !clipping && peak > UNCLIPPED_MAX_TRUE_PEAK {
        Verdict::inconsistent(
            Severity::High,
            format!("True peak above full scale ({} dBTP) but no clipping reported", peak),
            format!("truePeak <= {} when not clipping", UNCLIPPED_MAX_TRUE_PEAK),
            format!("hasClipping = false, truePeak = {}", peak),
        )
    } else {
        Verdict::Consistent
    }
}

fn silence_loudness(s: &SignalVector) -> Verdict {
    let silent = s.flag(SignalName::IsSilent);
    let loudness = s.number(SignalName::IntegratedLoudness);
    let (Some(silent), Some(loudness)) = (silent, loudness) else {
        return unreadable(&[
            (SignalName::IsSilent, silent.is_some()),
            (SignalName::IntegratedLoudness, loudness.is_some()),
        ]);
    };

    if silent && loudness > SILENT_MAX_LOUDNESS {
        Verdict::inconsistent(
            Severity::High,
            format!("Silence reported at {} LUFS", loudness),
            format!("integratedLoudness <= {} when silent", SILENT_MAX_LOUDNESS),
            format!("isSilent = true, integratedLoudness = {}", loudness),
        )
    } else if !silent && loudness < AUDIBLE_MIN_LOUDNESS {
        Verdict::inconsistent(
            Severity::Medium,
            format!("Not flagged silent but loudness is {} LUFS", loudness),
            format!("integratedLoudness >= {} when not silent", AUDIBLE_MIN_LOUDNESS),
            format!("isSilent = false, integratedLoudness = {}", loudness),
        )
    } else {
        Verdict::Consistent
    }
}

fn phase_width(s: &SignalVector) -> Verdict {
    let correlation = s.number(SignalName::PhaseCorrelation);
    let width = s.number(SignalName::StereoWidth);
    let (Some(correlation), Some(width)) = (correlation, width) else {
        return unreadable(&[
            (SignalName::PhaseCorrelation, correlation.is_some()),
            (SignalName::StereoWidth, width.is_some()),
        ]);
    };

    if correlation < ANTI_PHASE_CORRELATION && width < ANTI_PHASE_MIN_WIDTH {
        Verdict::inconsistent(
            Severity::Medium,
            format!(
                "Anti-phase correlation ({:.2}) with a narrow image ({:.2})",
                correlation, width
            ),
            format!(
                "stereoWidth >= {} when phaseCorrelation < {}",
                ANTI_PHASE_MIN_WIDTH, ANTI_PHASE_CORRELATION
            ),
            format!("phaseCorrelation = {}, stereoWidth = {}", correlation, width),
        )
    } else {
        Verdict::Consistent
    }
}
