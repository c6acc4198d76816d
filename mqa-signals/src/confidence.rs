//! Confidence reduction bridge
//!
//! Every consumer that reports a confidence number (ML classifier, heuristic
//! scorer) runs it through here first. Stateless: consistency and drift
//! reductions compose by applying one after the other.

use crate::consistency::consistency_reduction;
use crate::drift::drift_reduction;
use crate::types::{ConsistencyStatus, DriftStatus};
use serde::Serialize;
use tracing::debug;

/// One reduction step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceAdjustment {
    /// Input confidence, 0 if it was not finite
    pub original: f64,
    pub adjusted: f64,
    pub reduction: f64,
    pub was_reduced: bool,
    pub status: String,
}

/// Consistency then drift
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedAdjustment {
    pub original: f64,
    pub adjusted: f64,
    pub total_reduction: f64,
    pub was_reduced: bool,
    pub consistency: ConfidenceAdjustment,
    pub drift: ConfidenceAdjustment,
}

fn apply(confidence: f64, reduction: f64, status: &str) -> ConfidenceAdjustment {
    let original = if confidence.is_finite() { confidence } else { 0.0 };
    let adjusted = (original - reduction).max(0.0);

    ConfidenceAdjustment {
        original,
        adjusted,
        reduction,
        was_reduced: adjusted < original,
        status: status.to_string(),
    }
}

pub fn apply_consistency_reduction(confidence: f64, status: ConsistencyStatus) -> ConfidenceAdjustment {
    apply(confidence, consistency_reduction(status), status.as_str())
}

pub fn apply_drift_reduction(confidence: f64, status: DriftStatus) -> ConfidenceAdjustment {
    apply(confidence, drift_reduction(status), status.as_str())
}

/// Reduction by status name, consistency names first then drift names
///
/// An unknown name applies no reduction.
pub fn apply_named_reduction(confidence: f64, status_name: &str) -> ConfidenceAdjustment {
    if let Ok(status) = status_name.parse::<ConsistencyStatus>() {
        return apply_consistency_reduction(confidence, status);
    }
    if let Ok(status) = status_name.parse::<DriftStatus>() {
        return apply_drift_reduction(confidence, status);
    }

    debug!("Unknown status '{}', no confidence reduction", status_name);
    apply(confidence, 0.0, status_name)
}

/// Apply the consistency reduction, then the drift reduction to its result
pub fn apply_combined_reduction(
    confidence: f64,
    consistency: ConsistencyStatus,
    drift: DriftStatus,
) -> CombinedAdjustment {
    let first = apply_consistency_reduction(confidence, consistency);
    let second = apply_drift_reduction(first.adjusted, drift);

    CombinedAdjustment {
        original: first.original,
        adjusted: second.adjusted,
        total_reduction: first.original - second.adjusted,
        was_reduced: second.adjusted < first.original,
        consistency: first,
        drift: second,
    }
}
