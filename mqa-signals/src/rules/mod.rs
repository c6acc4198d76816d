//! Consistency rule registry
//!
//! A rule names the signals it needs and checks one cross-signal physical or
//! statistical implausibility. Rules are pure: the same vector always gives
//! the same `RuleResult`, and bad input yields "consistent" or a skip, never
//! a panic.
//!
//! Contract:
//! - `get_available_rules()` returns metadata only
//! - `get_rule(id)` looks a rule up by id
//! - `CONSISTENCY_RULES` is the canonical ordered registry consumed by the checker

pub mod builtin;
pub mod registry;

pub use registry::{get_available_rules, get_rule, RuleRegistry, CONSISTENCY_RULES};

use crate::signals::{SignalName, SignalVector};
use crate::types::Severity;
use serde::{Deserialize, Serialize};

/// A consistency rule
///
/// Implementors only provide `evaluate`; the default `check` handles the
/// missing-signal skip so `evaluate` can assume every required signal is present.
/// A signal that is present but unreadable (NaN, wrong type) is reported back
/// through `Verdict::Unreadable` and skipped the same way.
pub trait ConsistencyRule: Send + Sync {
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    /// Required signals, in reporting order
    fn signals(&self) -> &[SignalName];

    /// Evaluate with all required signals present
    fn evaluate(&self, signals: &SignalVector) -> Verdict;

    fn check(&self, signals: &SignalVector) -> RuleResult {
        let missing = signals.missing(self.signals());
        if !missing.is_empty() {
            return RuleResult::missing_signals(self.id(), missing);
        }

        match self.evaluate(signals) {
            Verdict::Consistent => RuleResult::consistent(self.id()),
            Verdict::Inconsistent(finding) => RuleResult::violation(self.id(), finding),
            Verdict::Unreadable(signals) => RuleResult::missing_signals(self.id(), signals),
        }
    }

    fn info(&self) -> RuleInfo {
        RuleInfo {
            id: self.id().to_string(),
            description: self.description().to_string(),
            signals: self.signals().to_vec(),
        }
    }
}

/// Outcome of evaluating a rule
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Consistent,
    Inconsistent(Inconsistency),
    /// Required signals present but not usable as the rule's input type
    Unreadable(Vec<SignalName>),
}

/// Details of a violated rule
#[derive(Debug, Clone, PartialEq)]
pub struct Inconsistency {
    pub severity: Severity,
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl Verdict {
    pub fn inconsistent(
        severity: Severity,
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Verdict::Inconsistent(Inconsistency {
            severity,
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        })
    }
}

/// Rule metadata without the check function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleInfo {
    pub id: String,
    pub description: String,
    pub signals: Vec<SignalName>,
}

/// Why a rule was not checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingSignals,
    RuleNotFound,
}

/// Result of running one rule against a vector
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub rule_id: String,
    pub checked: bool,
    pub consistent: bool,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_signals: Vec<SignalName>,
    /// Closest registered id for `rule_not_found`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl RuleResult {
    fn base(rule_id: &str, checked: bool, consistent: bool, severity: Severity) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            checked,
            consistent,
            severity,
            message: None,
            expected: None,
            actual: None,
            reason: None,
            missing_signals: Vec::new(),
            suggestion: None,
        }
    }

    pub fn consistent(rule_id: &str) -> Self {
        Self::base(rule_id, true, true, Severity::None)
    }

    pub fn violation(rule_id: &str, finding: Inconsistency) -> Self {
        Self {
            message: Some(finding.message),
            expected: Some(finding.expected),
            actual: Some(finding.actual),
            ..Self::base(rule_id, true, false, finding.severity)
        }
    }

    pub fn missing_signals(rule_id: &str, missing: Vec<SignalName>) -> Self {
        Self {
            reason: Some(SkipReason::MissingSignals),
            missing_signals: missing,
            ..Self::base(rule_id, false, true, Severity::None)
        }
    }

    pub fn not_found(rule_id: &str, suggestion: Option<String>) -> Self {
        Self {
            reason: Some(SkipReason::RuleNotFound),
            suggestion,
            ..Self::base(rule_id, false, true, Severity::None)
        }
    }

    /// Checked and failed
    pub fn is_violation(&self) -> bool {
        self.checked && !self.consistent
    }

    pub fn is_skipped(&self) -> bool {
        !self.checked
    }
}
