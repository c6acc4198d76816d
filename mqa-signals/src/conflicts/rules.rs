//! Built-in parameter conflict rules
//!
//! Each rule reads canonical keys only; callers normalize first. Severity can
//! scale with how extreme the values are.

use super::parameters::{keys, ProcessingParameters};
use crate::types::{ConflictCategory, ConflictSeverity};

/// A conflict between requested processing parameters
pub struct ConflictRule {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ConflictCategory,
    pub description: &'static str,
    pub recommendation: &'static str,
    pub affected_params: &'static [&'static str],
    pub conditions: fn(&ProcessingParameters) -> bool,
    /// Only meaningful when `conditions` holds
    pub get_severity: fn(&ProcessingParameters) -> ConflictSeverity,
}

impl std::fmt::Debug for ConflictRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictRule")
            .field("id", &self.id)
            .field("category", &self.category)
            .finish()
    }
}

pub static CONFLICT_RULES: [ConflictRule; 7] = [
    ConflictRule {
        id: "EQ_BOOST_LIMITING",
        name: "EQ boost into tight limiting",
        category: ConflictCategory::EqDynamics,
        description: "Large EQ boosts feed a limiter with a low threshold, causing pumping and distortion",
        recommendation: "Reduce EQ boost to 3 dB or less, or raise the limiter threshold",
        affected_params: &[keys::EQ_BOOST_MAX, keys::LIMITER_THRESHOLD],
        conditions: eq_boost_limiting,
        get_severity: eq_boost_limiting_severity,
    },
    ConflictRule {
        id: "STEREO_MONO_CONFLICT",
        name: "Widening with mono compatibility",
        category: ConflictCategory::Stereo,
        description: "Stereo widening beyond unity breaks mono compatibility",
        recommendation: "Keep stereo width at or below 1.0 when mono compatibility is required",
        affected_params: &[keys::STEREO_WIDTH, keys::MONO_COMPATIBLE],
        conditions: stereo_mono,
        get_severity: stereo_mono_severity,
    },
    ConflictRule {
        id: "COMPRESSION_DYNAMICS_CONFLICT",
        name: "Heavy compression while preserving dynamics",
        category: ConflictCategory::Dynamics,
        description: "High compression ratios flatten the dynamics the job asks to preserve",
        recommendation: "Lower the compression ratio to 4:1 or less",
        affected_params: &[keys::COMPRESSION_RATIO, keys::PRESERVE_DYNAMICS],
        conditions: compression_dynamics,
        get_severity: compression_dynamics_severity,
    },
    ConflictRule {
        id: "LOUDNESS_DYNAMICS_CONFLICT",
        name: "Maximize loudness and preserve dynamics",
        category: ConflictCategory::Intent,
        description: "Maximizing loudness and preserving dynamics are opposed intents",
        recommendation: "Choose either loudness maximization or dynamics preservation",
        affected_params: &[keys::MAXIMIZE_LOUDNESS, keys::PRESERVE_DYNAMICS],
        conditions: loudness_dynamics,
        get_severity: loudness_dynamics_severity,
    },
    ConflictRule {
        id: "STACKED_LIMITERS",
        name: "Stacked limiters",
        category: ConflictCategory::Dynamics,
        description: "Multiple limiters in series compound distortion",
        recommendation: "Use a single limiter stage",
        affected_params: &[keys::LIMITER_COUNT],
        conditions: stacked_limiters,
        get_severity: stacked_limiters_severity,
    },
    ConflictRule {
        id: "BIT_DEPTH_DYNAMICS",
        name: "Low bit depth without dither",
        category: ConflictCategory::Format,
        description: "Low output bit depth without dither truncates quiet passages",
        recommendation: "Export at 24-bit or enable dither",
        affected_params: &[keys::BIT_DEPTH, keys::PRESERVE_DYNAMICS, keys::DITHER],
        conditions: bit_depth_dynamics,
        get_severity: bit_depth_dynamics_severity,
    },
    ConflictRule {
        id: "TARGET_CEILING_CONFLICT",
        name: "Loudness target too close to ceiling",
        category: ConflictCategory::Loudness,
        description: "Too little headroom between the loudness target and the true-peak ceiling",
        recommendation: "Keep the loudness target at least 4 LU below the true-peak ceiling",
        affected_params: &[keys::TARGET_LOUDNESS, keys::TRUE_PEAK_CEILING],
        conditions: target_ceiling,
        get_severity: target_ceiling_severity,
    },
];

pub const SAFE_EQ_BOOST: f64 = 3.0;
pub const LIMITER_CONFLICT_THRESHOLD: f64 = -3.0;
pub const MAX_MONO_SAFE_WIDTH: f64 = 1.0;
pub const MAX_DYNAMICS_SAFE_RATIO: f64 = 4.0;
pub const MIN_SAFE_BIT_DEPTH: f64 = 16.0;
pub const MIN_TARGET_HEADROOM: f64 = 4.0;

fn eq_boost_limiting(p: &ProcessingParameters) -> bool {
    match (p.number(keys::EQ_BOOST_MAX), p.number(keys::LIMITER_THRESHOLD)) {
        (Some(boost), Some(threshold)) => {
            boost > SAFE_EQ_BOOST && threshold <= LIMITER_CONFLICT_THRESHOLD
        }
        _ => false,
    }
}

fn eq_boost_limiting_severity(p: &ProcessingParameters) -> ConflictSeverity {
    let boost = p.number(keys::EQ_BOOST_MAX).unwrap_or(0.0);
    let threshold = p.number(keys::LIMITER_THRESHOLD).unwrap_or(0.0);
    if boost >= 9.0 && threshold <= -6.0 {
        ConflictSeverity::Blocking
    } else if boost >= 6.0 && threshold <= -4.5 {
        ConflictSeverity::High
    } else {
        ConflictSeverity::Medium
    }
}

fn stereo_mono(p: &ProcessingParameters) -> bool {
    p.is_enabled(keys::MONO_COMPATIBLE)
        && p
            .number(keys::STEREO_WIDTH)
            .is_some_and(|w| w > MAX_MONO_SAFE_WIDTH)
}

fn stereo_mono_severity(p: &ProcessingParameters) -> ConflictSeverity {
    if p.number(keys::STEREO_WIDTH).unwrap_or(0.0) > 1.5 {
        ConflictSeverity::High
    } else {
        ConflictSeverity::Medium
    }
}

fn compression_dynamics(p: &ProcessingParameters) -> bool {
    p.is_enabled(keys::PRESERVE_DYNAMICS)
        && p
            .number(keys::COMPRESSION_RATIO)
            .is_some_and(|r| r > MAX_DYNAMICS_SAFE_RATIO)
}

fn compression_dynamics_severity(p: &ProcessingParameters) -> ConflictSeverity {
    if p.number(keys::COMPRESSION_RATIO).unwrap_or(0.0) >= 10.0 {
        ConflictSeverity::High
    } else {
        ConflictSeverity::Medium
    }
}

fn loudness_dynamics(p: &ProcessingParameters) -> bool {
    p.is_enabled(keys::MAXIMIZE_LOUDNESS) && p.is_enabled(keys::PRESERVE_DYNAMICS)
}

fn loudness_dynamics_severity(_: &ProcessingParameters) -> ConflictSeverity {
    ConflictSeverity::High
}

fn stacked_limiters(p: &ProcessingParameters) -> bool {
    p.number(keys::LIMITER_COUNT).is_some_and(|c| c >= 2.0)
}

fn stacked_limiters_severity(p: &ProcessingParameters) -> ConflictSeverity {
    let count = p.number(keys::LIMITER_COUNT).unwrap_or(0.0);
    if count >= 4.0 {
        ConflictSeverity::Blocking
    } else if count >= 3.0 {
        ConflictSeverity::High
    } else {
        ConflictSeverity::Medium
    }
}

fn bit_depth_dynamics(p: &ProcessingParameters) -> bool {
    p.number(keys::BIT_DEPTH)
        .is_some_and(|d| d <= MIN_SAFE_BIT_DEPTH)
        && p.is_enabled(keys::PRESERVE_DYNAMICS)
        && !p.is_enabled(keys::DITHER)
}

fn bit_depth_dynamics_severity(p: &ProcessingParameters) -> ConflictSeverity {
    if p.number(keys::BIT_DEPTH).is_some_and(|d| d <= 8.0) {
        ConflictSeverity::High
    } else {
        ConflictSeverity::Low
    }
}

fn target_ceiling(p: &ProcessingParameters) -> bool {
    match (p.number(keys::TARGET_LOUDNESS), p.number(keys::TRUE_PEAK_CEILING)) {
        (Some(target), Some(ceiling)) => ceiling - target < MIN_TARGET_HEADROOM,
        _ => false,
    }
}

fn target_ceiling_severity(p: &ProcessingParameters) -> ConflictSeverity {
    let (Some(target), Some(ceiling)) = (
        p.number(keys::TARGET_LOUDNESS),
        p.number(keys::TRUE_PEAK_CEILING),
    ) else {
        return ConflictSeverity::Medium;
    };
    if target > ceiling {
        ConflictSeverity::Blocking
    } else if ceiling - target < 2.0 {
        ConflictSeverity::High
    } else {
        ConflictSeverity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rule(id: &str) -> &'static ConflictRule {
        CONFLICT_RULES.iter().find(|r| r.id == id).unwrap()
    }

    fn evaluate(id: &str, params: &ProcessingParameters) -> Option<ConflictSeverity> {
        let r = rule(id);
        (r.conditions)(params).then(|| (r.get_severity)(params))
    }

    #[test]
    fn test_ids_unique() {
        let ids: HashSet<_> = CONFLICT_RULES.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), CONFLICT_RULES.len());
    }

    #[test]
    fn test_eq_boost_limiting_tiers() {
        let p = |boost: f64, thr: f64| {
            ProcessingParameters::new()
                .with(keys::EQ_BOOST_MAX, boost)
                .with(keys::LIMITER_THRESHOLD, thr)
        };
        assert_eq!(evaluate("EQ_BOOST_LIMITING", &p(3.0, -6.0)), None);
        assert_eq!(evaluate("EQ_BOOST_LIMITING", &p(8.0, -2.0)), None);
        assert_eq!(
            evaluate("EQ_BOOST_LIMITING", &p(4.0, -3.0)),
            Some(ConflictSeverity::Medium)
        );
        assert_eq!(
            evaluate("EQ_BOOST_LIMITING", &p(6.0, -4.5)),
            Some(ConflictSeverity::High)
        );
        assert_eq!(
            evaluate("EQ_BOOST_LIMITING", &p(9.0, -6.0)),
            Some(ConflictSeverity::Blocking)
        );
    }

    #[test]
    fn test_stacked_limiters_scale() {
        let p = |n: i32| ProcessingParameters::new().with(keys::LIMITER_COUNT, n);
        assert_eq!(evaluate("STACKED_LIMITERS", &p(1)), None);
        assert_eq!(evaluate("STACKED_LIMITERS", &p(2)), Some(ConflictSeverity::Medium));
        assert_eq!(evaluate("STACKED_LIMITERS", &p(3)), Some(ConflictSeverity::High));
        assert_eq!(evaluate("STACKED_LIMITERS", &p(4)), Some(ConflictSeverity::Blocking));
        assert_eq!(evaluate("STACKED_LIMITERS", &p(7)), Some(ConflictSeverity::Blocking));
    }

    #[test]
    fn test_bit_depth_requires_missing_dither() {
        let p = ProcessingParameters::new()
            .with(keys::BIT_DEPTH, 16)
            .with(keys::PRESERVE_DYNAMICS, true);
        assert_eq!(evaluate("BIT_DEPTH_DYNAMICS", &p), Some(ConflictSeverity::Low));
        let dithered = p.clone().with(keys::DITHER, true);
        assert_eq!(evaluate("BIT_DEPTH_DYNAMICS", &dithered), None);
        let eight = p.with(keys::BIT_DEPTH, 8);
        assert_eq!(evaluate("BIT_DEPTH_DYNAMICS", &eight), Some(ConflictSeverity::High));
    }

    #[test]
    fn test_target_ceiling_tiers() {
        let p = |target: f64, ceiling: f64| {
            ProcessingParameters::new()
                .with(keys::TARGET_LOUDNESS, target)
                .with(keys::TRUE_PEAK_CEILING, ceiling)
        };
        assert_eq!(evaluate("TARGET_CEILING_CONFLICT", &p(-14.0, -1.0)), None);
        assert_eq!(evaluate("TARGET_CEILING_CONFLICT", &p(-5.0, -1.0)), None);
        assert_eq!(
            evaluate("TARGET_CEILING_CONFLICT", &p(-4.0, -1.0)),
            Some(ConflictSeverity::Medium)
        );
        assert_eq!(
            evaluate("TARGET_CEILING_CONFLICT", &p(-2.0, -1.0)),
            Some(ConflictSeverity::High)
        );
        assert_eq!(
            evaluate("TARGET_CEILING_CONFLICT", &p(0.0, -1.0)),
            Some(ConflictSeverity::Blocking)
        );
    }

    #[test]
    fn test_flags_must_be_explicit_booleans() {
        let p = ProcessingParameters::new()
            .with(keys::MAXIMIZE_LOUDNESS, "yes")
            .with(keys::PRESERVE_DYNAMICS, true);
        assert_eq!(evaluate("LOUDNESS_DYNAMICS_CONFLICT", &p), None);
    }
}
