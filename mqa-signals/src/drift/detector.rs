//! Statistical drift detection against training distributions
//!
//! Every signal present in both the vector and the model's distribution gets
//! a z-score, a weighted distance and a bounds check. The overall status
//! combines those with the hard OOD indicators.

use super::distributions::{DistributionCatalog, ModelInfo, SignalStats, TRAINING_DISTRIBUTIONS};
use super::ood::{check_ood_indicators, TriggeredIndicator};
use crate::signals::{SignalName, SignalVector};
use crate::types::{DriftStatus, Severity};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

// Per-signal z-score thresholds
pub const MINOR_DRIFT_Z: f64 = 1.5;
pub const SIGNIFICANT_DRIFT_Z: f64 = 2.5;
pub const OOD_Z: f64 = 4.0;

/// Aggregate weighted distance above which a vector is OOD outright
pub const AGGREGATE_OOD_DISTANCE: f64 = 4.0;

/// Bound violations that make a vector OOD outright
pub const OOD_BOUND_VIOLATIONS: usize = 3;

/// SIGNIFICANT_DRIFT signals that make the whole vector SIGNIFICANT_DRIFT
pub const SIGNIFICANT_SIGNAL_COUNT: usize = 2;

/// Cap applied to reported z-scores so reports stay finite
pub const MAX_REPORTED_Z: f64 = 100.0;

/// Confidence reduction per drift status
pub fn drift_reduction(status: DriftStatus) -> f64 {
    match status {
        DriftStatus::InDistribution => 0.0,
        DriftStatus::MinorDrift => 0.05,
        DriftStatus::SignificantDrift => 0.15,
        DriftStatus::OutOfDistribution => 0.30,
    }
}

/// `|value - mean| / std`
///
/// A degenerate `std` (zero, negative or non-finite) gives 0 when the value
/// equals the mean and `+inf` otherwise.
pub fn calculate_z_score(value: f64, mean: f64, std: f64) -> f64 {
    if std > 0.0 && std.is_finite() {
        (value - mean).abs() / std
    } else if value == mean {
        0.0
    } else {
        f64::INFINITY
    }
}

/// Weighted distance, weight defaults to 1
pub fn calculate_signal_distance(z_score: f64, weight: Option<f64>) -> f64 {
    z_score * weight.unwrap_or(1.0)
}

/// Per-signal status from a z-score
pub fn status_for_z_score(z_score: f64) -> DriftStatus {
    if z_score < MINOR_DRIFT_Z {
        DriftStatus::InDistribution
    } else if z_score < SIGNIFICANT_DRIFT_Z {
        DriftStatus::MinorDrift
    } else if z_score < OOD_Z {
        DriftStatus::SignificantDrift
    } else {
        DriftStatus::OutOfDistribution
    }
}

/// Which side of the training range a value fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundViolation {
    BelowMin,
    AboveMax,
}

/// Analysis of one signal against its training stats
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalDriftAnalysis {
    pub value: f64,
    /// Capped at [`MAX_REPORTED_Z`]
    pub z_score: f64,
    pub distance: f64,
    pub weight: f64,
    pub status: DriftStatus,
    pub in_bounds: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<BoundViolation>,
}

/// z-score, distance and bounds for one value
pub fn analyze_signal(value: f64, stats: &SignalStats) -> SignalDriftAnalysis {
    let z_score = calculate_z_score(value, stats.mean, stats.std).min(MAX_REPORTED_Z);
    let violation = if value < stats.min {
        Some(BoundViolation::BelowMin)
    } else if value > stats.max {
        Some(BoundViolation::AboveMax)
    } else {
        None
    };

    SignalDriftAnalysis {
        value,
        z_score,
        distance: calculate_signal_distance(z_score, Some(stats.weight)),
        weight: stats.weight,
        status: status_for_z_score(z_score),
        in_bounds: violation.is_none(),
        violation,
    }
}

/// Weighted mean z-score, `Σ z·w / Σ w`, 0 when there is nothing to weigh
pub fn calculate_aggregate_distance(per_signal: &BTreeMap<SignalName, SignalDriftAnalysis>) -> f64 {
    let total_weight: f64 = per_signal.values().map(|a| a.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = per_signal.values().map(|a| a.distance).sum();
    weighted / total_weight
}

/// Statistical status before OOD indicators are applied
pub fn get_overall_drift_status(
    per_signal: &BTreeMap<SignalName, SignalDriftAnalysis>,
    aggregate_distance: f64,
) -> DriftStatus {
    let bound_violations = per_signal.values().filter(|a| !a.in_bounds).count();
    if bound_violations >= OOD_BOUND_VIOLATIONS || aggregate_distance > AGGREGATE_OOD_DISTANCE {
        return DriftStatus::OutOfDistribution;
    }

    if per_signal
        .values()
        .any(|a| a.status == DriftStatus::OutOfDistribution)
    {
        return DriftStatus::SignificantDrift;
    }

    let significant = per_signal
        .values()
        .filter(|a| a.status == DriftStatus::SignificantDrift)
        .count();
    if significant >= SIGNIFICANT_SIGNAL_COUNT {
        return DriftStatus::SignificantDrift;
    }

    per_signal
        .values()
        .map(|a| a.status)
        .max()
        .unwrap_or(DriftStatus::InDistribution)
}

/// A value outside its training range
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftViolation {
    pub signal: SignalName,
    pub kind: BoundViolation,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftSummary {
    pub signals_analyzed: usize,
    /// Present in the distribution but not a finite number
    pub signals_skipped: usize,
    pub in_distribution: usize,
    pub minor_drift: usize,
    pub significant_drift: usize,
    pub out_of_distribution: usize,
    pub bound_violations: usize,
    pub ood_indicators: usize,
}

/// Result of `detect_drift`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    pub status: DriftStatus,
    pub aggregate_distance: f64,
    pub per_signal: BTreeMap<SignalName, SignalDriftAnalysis>,
    pub ood_indicators: Vec<TriggeredIndicator>,
    pub is_ood: bool,
    pub violations: Vec<DriftViolation>,
    pub summary: DriftSummary,
    pub confidence_reduction: f64,
    #[serde(rename = "shouldTrustML")]
    pub should_trust_ml: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DriftReport {
    fn unknown_model(model_id: &str) -> Self {
        let status = DriftStatus::InDistribution;
        Self {
            model_id: model_id.to_string(),
            model_version: None,
            status,
            aggregate_distance: 0.0,
            per_signal: BTreeMap::new(),
            ood_indicators: Vec::new(),
            is_ood: false,
            violations: Vec::new(),
            summary: DriftSummary::default(),
            confidence_reduction: drift_reduction(status),
            should_trust_ml: true,
            error: Some(format!("Unknown model: {}", model_id)),
        }
    }
}

/// Result of `check_multiple_models`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiModelDriftReport {
    /// Worst status across models
    pub overall_status: DriftStatus,
    #[serde(rename = "shouldTrustAnyML")]
    pub should_trust_any_ml: bool,
    pub confidence_reduction: f64,
    /// Per-model reports in the order requested
    pub models: Vec<DriftReport>,
}

/// Drift detector over a distribution catalog
#[derive(Debug, Clone, Copy)]
pub struct DriftDetector<'c> {
    catalog: &'c DistributionCatalog,
}

impl Default for DriftDetector<'static> {
    fn default() -> Self {
        Self {
            catalog: &TRAINING_DISTRIBUTIONS,
        }
    }
}

impl<'c> DriftDetector<'c> {
    pub fn new(catalog: &'c DistributionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c DistributionCatalog {
        self.catalog
    }

    pub fn list_models(&self) -> Vec<ModelInfo> {
        self.catalog.list_models()
    }

    /// Compare a vector with one model's training distribution
    ///
    /// Never fails: an unknown model yields IN_DISTRIBUTION with `error` set.
    /// Fired OOD indicators that do not reach `isOod` still raise the status
    /// (HIGH to at least SIGNIFICANT_DRIFT, others to at least MINOR_DRIFT),
    /// which is stricter than the statistical ladder alone.
    pub fn detect_drift(&self, signals: &SignalVector, model_id: &str) -> DriftReport {
        let Some(distribution) = self.catalog.get(model_id) else {
            warn!("Unknown model: {}", model_id);
            return DriftReport::unknown_model(model_id);
        };

        let mut per_signal = BTreeMap::new();
        let mut violations = Vec::new();
        let mut summary = DriftSummary::default();

        for (&name, stats) in &distribution.signals {
            if !signals.contains(name) {
                continue;
            }
            let Some(value) = signals.number(name).filter(|v| v.is_finite()) else {
                summary.signals_skipped += 1;
                continue;
            };

            let analysis = analyze_signal(value, stats);
            if let Some(kind) = analysis.violation {
                violations.push(DriftViolation {
                    signal: name,
                    kind,
                    value,
                    min: stats.min,
                    max: stats.max,
                });
            }
            match analysis.status {
                DriftStatus::InDistribution => summary.in_distribution += 1,
                DriftStatus::MinorDrift => summary.minor_drift += 1,
                DriftStatus::SignificantDrift => summary.significant_drift += 1,
                DriftStatus::OutOfDistribution => summary.out_of_distribution += 1,
            }
            per_signal.insert(name, analysis);
        }

        summary.signals_analyzed = per_signal.len();
        summary.bound_violations = violations.len();

        let aggregate_distance = calculate_aggregate_distance(&per_signal);
        let mut status = get_overall_drift_status(&per_signal, aggregate_distance);

        let ood = check_ood_indicators(signals);
        summary.ood_indicators = ood.indicators.len();
        if ood.is_ood {
            status = DriftStatus::OutOfDistribution;
        } else {
            // any fired indicator floors the status, stricter than the statistical ladder
            for indicator in &ood.indicators {
                let floor = if indicator.severity >= Severity::High {
                    DriftStatus::SignificantDrift
                } else {
                    DriftStatus::MinorDrift
                };
                status = status.max(floor);
            }
        }

        debug!(
            model = model_id,
            status = %status,
            aggregate_distance,
            analyzed = summary.signals_analyzed,
            is_ood = ood.is_ood,
            "Drift check complete"
        );

        DriftReport {
            model_id: model_id.to_string(),
            model_version: Some(distribution.version.clone()),
            status,
            aggregate_distance,
            per_signal,
            ood_indicators: ood.indicators,
            is_ood: ood.is_ood,
            violations,
            summary,
            confidence_reduction: drift_reduction(status),
            should_trust_ml: status != DriftStatus::OutOfDistribution,
            error: None,
        }
    }

    /// Run `detect_drift` for each model and take the worst
    pub fn check_multiple_models<S: AsRef<str>>(
        &self,
        signals: &SignalVector,
        model_ids: &[S],
    ) -> MultiModelDriftReport {
        let models: Vec<DriftReport> = model_ids
            .iter()
            .map(|id| self.detect_drift(signals, id.as_ref()))
            .collect();

        let overall_status = models
            .iter()
            .map(|r| r.status)
            .max()
            .unwrap_or(DriftStatus::InDistribution);

        MultiModelDriftReport {
            overall_status,
            should_trust_any_ml: models.iter().any(|r| r.should_trust_ml),
            confidence_reduction: drift_reduction(overall_status),
            models,
        }
    }
}

/// `detect_drift` against the built-in catalog
pub fn detect_drift(signals: &SignalVector, model_id: &str) -> DriftReport {
    DriftDetector::default().detect_drift(signals, model_id)
}

pub fn check_multiple_models<S: AsRef<str>>(
    signals: &SignalVector,
    model_ids: &[S],
) -> MultiModelDriftReport {
    DriftDetector::default().check_multiple_models(signals, model_ids)
}
