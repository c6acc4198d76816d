//! Confidence reduction bridge integration tests

mod helpers;

use helpers::clean_master;
use mqa_signals::{
    apply_combined_reduction, apply_consistency_reduction, apply_drift_reduction,
    apply_named_reduction, check_consistency, detect_drift, ConsistencyStatus, DriftStatus,
    SignalName,
};

#[test]
fn test_contradictory_adjusted_is_clamped_subtraction() {
    for c in [0.0, 0.1, 0.3, 0.5, 0.95, 1.0] {
        let a = apply_consistency_reduction(c, ConsistencyStatus::Contradictory);
        let expected = f64::max(0.0, c - 0.30);
        assert!((a.adjusted - expected).abs() < 1e-12, "confidence {}", c);
        assert_eq!(a.reduction, 0.30);
    }
}

#[test]
fn test_adjusted_never_negative_or_above_original() {
    for status in ConsistencyStatus::ALL {
        for c in [0.0, 0.04, 0.5, 1.0] {
            let a = apply_consistency_reduction(c, status);
            assert!(a.adjusted >= 0.0);
            assert!(a.adjusted <= a.original);
        }
    }
    for status in DriftStatus::ALL {
        for c in [0.0, 0.04, 0.5, 1.0] {
            let a = apply_drift_reduction(c, status);
            assert!(a.adjusted >= 0.0);
            assert!(a.adjusted <= a.original);
        }
    }
}

#[test]
fn test_reduction_monotone_in_severity() {
    let consistency: Vec<f64> = ConsistencyStatus::ALL
        .iter()
        .map(|s| apply_consistency_reduction(1.0, *s).reduction)
        .collect();
    assert!(consistency.windows(2).all(|w| w[0] <= w[1]));

    let drift: Vec<f64> = DriftStatus::ALL
        .iter()
        .map(|s| apply_drift_reduction(1.0, *s).reduction)
        .collect();
    assert!(drift.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_was_reduced_false_when_already_zero() {
    let a = apply_drift_reduction(0.0, DriftStatus::OutOfDistribution);
    assert_eq!(a.adjusted, 0.0);
    assert!(!a.was_reduced);
}

#[test]
fn test_infinite_confidence_treated_as_zero() {
    let a = apply_consistency_reduction(f64::INFINITY, ConsistencyStatus::Inconsistent);
    assert_eq!(a.original, 0.0);
    assert_eq!(a.adjusted, 0.0);
    let json = serde_json::to_value(&a).unwrap();
    assert!(json["original"].is_number());
}

#[test]
fn test_named_reduction_matches_typed() {
    for status in ConsistencyStatus::ALL {
        assert_eq!(
            apply_named_reduction(0.8, status.as_str()),
            apply_consistency_reduction(0.8, status)
        );
    }
    for status in DriftStatus::ALL {
        assert_eq!(
            apply_named_reduction(0.8, status.as_str()),
            apply_drift_reduction(0.8, status)
        );
    }
    let unknown = apply_named_reduction(0.8, "consistent");
    assert_eq!(unknown.reduction, 0.0);
    assert!(!unknown.was_reduced);
}

#[test]
fn test_combined_equals_two_sequential_calls() {
    let combined = apply_combined_reduction(
        0.9,
        ConsistencyStatus::Inconsistent,
        DriftStatus::MinorDrift,
    );
    let first = apply_consistency_reduction(0.9, ConsistencyStatus::Inconsistent);
    let second = apply_drift_reduction(first.adjusted, DriftStatus::MinorDrift);

    assert_eq!(combined.adjusted, second.adjusted);
    assert_eq!(combined.consistency, first);
    assert_eq!(combined.drift, second);
    assert!((combined.total_reduction - 0.20).abs() < 1e-12);
    assert!(combined.was_reduced);
}

#[test]
fn test_reports_feed_the_bridge() {
    let v = clean_master()
        .with(SignalName::IsHybrid, true)
        .with(SignalName::SubgenreConfidence, 0.9);
    let consistency = check_consistency(&v);
    let drift = detect_drift(&v, "subgenre_v2");

    let adjusted = apply_combined_reduction(0.9, consistency.status, drift.status);
    assert_eq!(consistency.status, ConsistencyStatus::MinorInconsistency);
    assert_eq!(drift.status, DriftStatus::InDistribution);
    assert!(
        (adjusted.adjusted - (0.9 - consistency.confidence_reduction - drift.confidence_reduction))
            .abs()
            < 1e-12
    );
}
