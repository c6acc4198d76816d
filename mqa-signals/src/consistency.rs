//! Consistency checker
//!
//! Runs a rule registry against a signal vector and folds the results into a
//! `ConsistencyReport`. Rules with missing inputs are skipped: they count in
//! `summary.skipped` but never in the score or the status.
//!
//! Status aggregation:
//! - any CRITICAL violation, or 2+ HIGH: CONTRADICTORY
//! - weighted severity sum above 2: INCONSISTENT
//! - any violation: MINOR_INCONSISTENCY
//! - otherwise CONSISTENT

use crate::rules::{RuleRegistry, RuleResult, CONSISTENCY_RULES};
use crate::signals::{SignalName, SignalVector};
use crate::types::{ConsistencyStatus, Severity};
use serde::Serialize;
use tracing::debug;

/// Weighted severity sum above which violations are INCONSISTENT
pub const INCONSISTENT_WEIGHT_THRESHOLD: u32 = 2;

/// HIGH violations that together make a vector CONTRADICTORY
pub const CONTRADICTORY_HIGH_COUNT: usize = 2;

/// Confidence reduction per consistency status
pub fn consistency_reduction(status: ConsistencyStatus) -> f64 {
    match status {
        ConsistencyStatus::Consistent => 0.0,
        ConsistencyStatus::MinorInconsistency => 0.05,
        ConsistencyStatus::Inconsistent => 0.15,
        ConsistencyStatus::Contradictory => 0.30,
    }
}

/// Recommended action for a violation of the given severity
pub fn recommendation_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Manual review required",
        Severity::High => "Verify signal extraction and re-run analysis",
        Severity::Medium => "Review classification against measured signals",
        Severity::Low => "Informational; monitor for recurrence",
        Severity::None => "No action required",
    }
}

/// Aggregate status from a set of violations
///
/// Non-violations in the slice are ignored.
pub fn calculate_aggregate_status(violations: &[RuleResult]) -> ConsistencyStatus {
    let violations: Vec<&RuleResult> = violations.iter().filter(|r| r.is_violation()).collect();
    if violations.is_empty() {
        return ConsistencyStatus::Consistent;
    }

    let critical = violations
        .iter()
        .any(|v| v.severity == Severity::Critical);
    let high = violations
        .iter()
        .filter(|v| v.severity == Severity::High)
        .count();
    if critical || high >= CONTRADICTORY_HIGH_COUNT {
        return ConsistencyStatus::Contradictory;
    }

    let weighted: u32 = violations.iter().map(|v| v.severity.weight()).sum();
    if weighted > INCONSISTENT_WEIGHT_THRESHOLD {
        ConsistencyStatus::Inconsistent
    } else {
        ConsistencyStatus::MinorInconsistency
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencySummary {
    pub total_rules: usize,
    pub checked: usize,
    pub skipped: usize,
    pub passed: usize,
    pub violations: usize,
}

/// Result of `check_consistency`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub status: ConsistencyStatus,
    /// passed / (passed + violations), 1.0 when nothing was checked
    pub consistency_score: f64,
    pub violations: Vec<RuleResult>,
    /// Ids of rules that were checked and held
    pub passed_rules: Vec<String>,
    pub summary: ConsistencySummary,
    pub confidence_reduction: f64,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.status == ConsistencyStatus::Consistent
    }

    /// Most severe violation, `NONE` when there are none
    pub fn worst_severity(&self) -> Severity {
        self.violations
            .iter()
            .map(|v| v.severity)
            .max()
            .unwrap_or(Severity::None)
    }
}

/// Result of `quick_check`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickCheck {
    pub consistent: bool,
    pub worst_severity: Severity,
    pub violation_count: usize,
}

/// A CRITICAL violation with the signals it involves
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContradictoryPair {
    pub rule_id: String,
    pub signals: Vec<SignalName>,
    pub message: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// Human-readable bundle for one violation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InconsistencyExplanation {
    pub rule_id: String,
    /// `None` when the rule is not in the checker's registry
    pub description: Option<String>,
    pub signals: Vec<SignalName>,
    pub severity: Severity,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub message: Option<String>,
    pub recommendation: String,
}

/// Runs a registry against signal vectors
#[derive(Debug, Clone, Copy)]
pub struct ConsistencyChecker<'a> {
    registry: &'a RuleRegistry,
}

impl Default for ConsistencyChecker<'static> {
    fn default() -> Self {
        Self {
            registry: &CONSISTENCY_RULES,
        }
    }
}

impl<'a> ConsistencyChecker<'a> {
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a RuleRegistry {
        self.registry
    }

    /// Run every rule and aggregate
    pub fn check_consistency(&self, signals: &SignalVector) -> ConsistencyReport {
        let mut violations = Vec::new();
        let mut passed_rules = Vec::new();
        let mut skipped = 0;

        for rule in self.registry.iter() {
            let result = rule.check(signals);
            if result.is_skipped() {
                skipped += 1;
            } else if result.is_violation() {
                violations.push(result);
            } else {
                passed_rules.push(result.rule_id);
            }
        }

        let passed = passed_rules.len();
        let checked = passed + violations.len();
        let consistency_score = if checked == 0 {
            1.0
        } else {
            passed as f64 / checked as f64
        };

        let status = calculate_aggregate_status(&violations);

        debug!(
            status = %status,
            checked,
            skipped,
            violations = violations.len(),
            "Consistency check complete"
        );

        ConsistencyReport {
            status,
            consistency_score,
            summary: ConsistencySummary {
                total_rules: self.registry.len(),
                checked,
                skipped,
                passed,
                violations: violations.len(),
            },
            violations,
            passed_rules,
            confidence_reduction: consistency_reduction(status),
        }
    }

    /// Worst severity and violation count, without building a report
    pub fn quick_check(&self, signals: &SignalVector) -> QuickCheck {
        let mut worst_severity = Severity::None;
        let mut violation_count = 0;

        for rule in self.registry.iter() {
            let result = rule.check(signals);
            if result.is_violation() {
                violation_count += 1;
                worst_severity = worst_severity.max(result.severity);
            }
        }

        QuickCheck {
            consistent: violation_count == 0,
            worst_severity,
            violation_count,
        }
    }

    /// Run only the named rules, in the order requested
    pub fn check_specific_rules<S: AsRef<str>>(
        &self,
        signals: &SignalVector,
        rule_ids: &[S],
    ) -> Vec<RuleResult> {
        rule_ids
            .iter()
            .map(|id| {
                let id = id.as_ref();
                match self.registry.get(id) {
                    Some(rule) => rule.check(signals),
                    None => {
                        debug!("Rule not found: {}", id);
                        RuleResult::not_found(id, self.registry.suggest(id))
                    }
                }
            })
            .collect()
    }

    /// CRITICAL violations only
    pub fn get_contradictory_pairs(&self, signals: &SignalVector) -> Vec<ContradictoryPair> {
        self.registry
            .iter()
            .filter_map(|rule| {
                let result = rule.check(signals);
                if result.is_violation() && result.severity == Severity::Critical {
                    Some(ContradictoryPair {
                        rule_id: result.rule_id,
                        signals: rule.signals().to_vec(),
                        message: result.message,
                        expected: result.expected,
                        actual: result.actual,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn explain_inconsistency(&self, violation: &RuleResult) -> InconsistencyExplanation {
        let rule = self.registry.get(&violation.rule_id);

        InconsistencyExplanation {
            rule_id: violation.rule_id.clone(),
            description: rule.map(|r| r.description().to_string()),
            signals: rule.map(|r| r.signals().to_vec()).unwrap_or_default(),
            severity: violation.severity,
            expected: violation.expected.clone(),
            actual: violation.actual.clone(),
            message: violation.message.clone(),
            recommendation: recommendation_for(violation.severity).to_string(),
        }
    }
}

/// `check_consistency` against the canonical registry
pub fn check_consistency(signals: &SignalVector) -> ConsistencyReport {
    ConsistencyChecker::default().check_consistency(signals)
}

pub fn quick_check(signals: &SignalVector) -> QuickCheck {
    ConsistencyChecker::default().quick_check(signals)
}

pub fn check_specific_rules<S: AsRef<str>>(
    signals: &SignalVector,
    rule_ids: &[S],
) -> Vec<RuleResult> {
    ConsistencyChecker::default().check_specific_rules(signals, rule_ids)
}

pub fn get_contradictory_pairs(signals: &SignalVector) -> Vec<ContradictoryPair> {
    ConsistencyChecker::default().get_contradictory_pairs(signals)
}

pub fn explain_inconsistency(violation: &RuleResult) -> InconsistencyExplanation {
    ConsistencyChecker::default().explain_inconsistency(violation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Inconsistency;

    fn violation(id: &str, severity: Severity) -> RuleResult {
        RuleResult::violation(
            id,
            Inconsistency {
                severity,
                message: String::new(),
                expected: String::new(),
                actual: String::new(),
            },
        )
    }

    #[test]
    fn test_aggregate_status_thresholds() {
        use ConsistencyStatus::*;
        assert_eq!(calculate_aggregate_status(&[]), Consistent);
        assert_eq!(
            calculate_aggregate_status(&[violation("A", Severity::Low)]),
            MinorInconsistency
        );
        assert_eq!(
            calculate_aggregate_status(&[violation("A", Severity::Medium)]),
            MinorInconsistency
        );
        assert_eq!(
            calculate_aggregate_status(&[violation("A", Severity::Low), violation("B", Severity::Low)]),
            MinorInconsistency
        );
        assert_eq!(
            calculate_aggregate_status(&[violation("A", Severity::High)]),
            Inconsistent
        );
        assert_eq!(
            calculate_aggregate_status(&[
                violation("A", Severity::Medium),
                violation("B", Severity::Low)
            ]),
            Inconsistent
        );
        assert_eq!(
            calculate_aggregate_status(&[
                violation("A", Severity::High),
                violation("B", Severity::High)
            ]),
            Contradictory
        );
        assert_eq!(
            calculate_aggregate_status(&[violation("A", Severity::Critical)]),
            Contradictory
        );
    }

    #[test]
    fn test_aggregate_ignores_non_violations() {
        let passed = RuleResult::consistent("A");
        let skipped = RuleResult::missing_signals("B", vec![SignalName::Bpm]);
        assert_eq!(
            calculate_aggregate_status(&[passed, skipped]),
            ConsistencyStatus::Consistent
        );
    }

    #[test]
    fn test_reduction_is_monotone() {
        let reductions: Vec<f64> = ConsistencyStatus::ALL
            .iter()
            .map(|s| consistency_reduction(*s))
            .collect();
        assert!(reductions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reductions[0], 0.0);
    }

    #[test]
    fn test_recommendation_table() {
        assert_eq!(recommendation_for(Severity::Critical), "Manual review required");
        assert_eq!(recommendation_for(Severity::None), "No action required");
    }

    #[test]
    fn test_score_counts_only_checked_rules() {
        let signals = SignalVector::new()
            .with(SignalName::IntegratedLoudness, -14.0)
            .with(SignalName::TruePeak, -20.0)
            .with(SignalName::DynamicRange, 8.0)
            .with(SignalName::CrestFactor, 4.0);
        let report = check_consistency(&signals);
        assert_eq!(report.summary.checked, 2);
        assert_eq!(report.consistency_score, 0.5);
        assert_eq!(report.status, ConsistencyStatus::Contradictory);
        assert_eq!(report.passed_rules, vec!["DYNAMIC_COMPRESSION".to_string()]);
    }
}
