//! Test Helper Utilities
//!
//! Shared utilities for mqa-signals integration tests

#![allow(dead_code)]

pub mod log_capture;

pub use log_capture::{capture_logs, LogCapture};

use mqa_signals::{SignalName, SignalVector};

/// A clean modern master: every rule checkable, nothing inconsistent or drifting
pub fn clean_master() -> SignalVector {
    SignalVector::new()
        .with(SignalName::Subgenre, "trap")
        .with(SignalName::SubgenreConfidence, 0.72)
        .with(SignalName::IsHybrid, false)
        .with(SignalName::Bpm, 140.0)
        .with(SignalName::SubBassEnergy, 0.55)
        .with(SignalName::TransientSharpness, 0.6)
        .with(SignalName::TransientDensity, 0.5)
        .with(SignalName::SpectralCentroid, 2300.0)
        .with(SignalName::IntegratedLoudness, -10.0)
        .with(SignalName::TruePeak, -1.0)
        .with(SignalName::CrestFactor, 4.0)
        .with(SignalName::DynamicRange, 7.0)
        .with(SignalName::LoudnessRange, 6.0)
        .with(SignalName::RmsLevel, -13.0)
        .with(SignalName::StereoWidth, 0.65)
        .with(SignalName::PhaseCorrelation, 0.6)
        .with(SignalName::ChannelTopology, "stereo")
        .with(SignalName::HasClipping, false)
        .with(SignalName::IsSilent, false)
        .with(SignalName::SampleRate, 44100)
        .with(SignalName::Duration, 180.0)
        .with(SignalName::DcOffset, 0.0)
}
