//! Parameter conflict detection and resolution suggestions

use super::parameters::{keys, normalize_parameters, ParamValue, ProcessingParameters};
use super::rules::{
    ConflictRule, CONFLICT_RULES, MAX_DYNAMICS_SAFE_RATIO, MAX_MONO_SAFE_WIDTH,
    MIN_TARGET_HEADROOM, SAFE_EQ_BOOST,
};
use crate::types::{ConflictCategory, ConflictSeverity};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One detected conflict
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub rule_id: String,
    pub name: String,
    pub category: ConflictCategory,
    pub severity: ConflictSeverity,
    pub description: String,
    pub recommendation: String,
    pub affected_params: Vec<String>,
    /// Values of the affected parameters that were present
    pub values: BTreeMap<String, ParamValue>,
}

impl Conflict {
    fn from_rule(rule: &ConflictRule, params: &ProcessingParameters) -> Self {
        let values = rule
            .affected_params
            .iter()
            .filter_map(|key| params.get(key).map(|v| (key.to_string(), v.clone())))
            .collect();

        Self {
            rule_id: rule.id.to_string(),
            name: rule.name.to_string(),
            category: rule.category,
            severity: (rule.get_severity)(params),
            description: rule.description.to_string(),
            recommendation: rule.recommendation.to_string(),
            affected_params: rule.affected_params.iter().map(|k| k.to_string()).collect(),
            values,
        }
    }
}

/// Result of `detect_conflicts`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDetection {
    pub has_conflicts: bool,
    /// Severity descending, rule order within equal severity
    pub conflicts: Vec<Conflict>,
    /// Highest severity, `null` when there are no conflicts
    pub severity: Option<ConflictSeverity>,
}

/// Result of `detect_parameter_conflicts`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub conflicts: Vec<Conflict>,
    /// Category → rule ids
    pub by_category: BTreeMap<ConflictCategory, Vec<String>>,
    pub has_blocking_conflict: bool,
    pub can_proceed: bool,
    /// Deduplicated, in conflict order
    pub recommendations: Vec<String>,
    pub severity: Option<ConflictSeverity>,
    /// Effective merged parameters the rules ran against
    pub parameters: ProcessingParameters,
}

/// Result of `validate_parameters`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterValidation {
    pub is_valid: bool,
    pub has_errors: bool,
    pub has_warnings: bool,
    /// BLOCKING conflicts
    pub errors: Vec<Conflict>,
    pub warnings: Vec<Conflict>,
}

/// Suggested parameter change for one conflict
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionSuggestion {
    pub rule_id: String,
    pub parameter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<ParamValue>,
    pub suggested: ParamValue,
    pub reason: String,
}

/// Conflict detector over a rule table
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector<'r> {
    rules: &'r [ConflictRule],
}

impl Default for ConflictDetector<'static> {
    fn default() -> Self {
        Self {
            rules: &CONFLICT_RULES,
        }
    }
}

impl<'r> ConflictDetector<'r> {
    pub fn new(rules: &'r [ConflictRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'r [ConflictRule] {
        self.rules
    }

    /// Normalize and run every rule
    pub fn detect_conflicts(&self, params: &ProcessingParameters) -> ConflictDetection {
        let params = normalize_parameters(params);
        let conflicts = self.detect_normalized(&params);
        let severity = conflicts.first().map(|c| c.severity);

        ConflictDetection {
            has_conflicts: !conflicts.is_empty(),
            conflicts,
            severity,
        }
    }

    fn detect_normalized(&self, params: &ProcessingParameters) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = self
            .rules
            .iter()
            .filter(|rule| (rule.conditions)(params))
            .map(|rule| Conflict::from_rule(rule, params))
            .collect();

        // stable: rule order survives within a severity
        conflicts.sort_by(|a, b| b.severity.cmp(&a.severity));
        conflicts
    }

    /// Merge current ← proposed ← intent, then detect
    pub fn detect_parameter_conflicts(
        &self,
        current: &ProcessingParameters,
        proposed: &ProcessingParameters,
        intent: &ProcessingParameters,
    ) -> ConflictReport {
        let mut parameters = normalize_parameters(current);
        parameters.merge(&normalize_parameters(proposed));
        parameters.merge(&normalize_parameters(intent));

        let conflicts = self.detect_normalized(&parameters);

        let mut by_category: BTreeMap<ConflictCategory, Vec<String>> = BTreeMap::new();
        for conflict in &conflicts {
            by_category
                .entry(conflict.category)
                .or_default()
                .push(conflict.rule_id.clone());
        }

        let mut recommendations: Vec<String> = Vec::new();
        for conflict in &conflicts {
            if !recommendations.contains(&conflict.recommendation) {
                recommendations.push(conflict.recommendation.clone());
            }
        }

        let has_blocking_conflict = conflicts
            .iter()
            .any(|c| c.severity == ConflictSeverity::Blocking);
        let severity = conflicts.first().map(|c| c.severity);

        if has_blocking_conflict {
            info!(
                "Blocking parameter conflict: {}",
                conflicts
                    .iter()
                    .filter(|c| c.severity == ConflictSeverity::Blocking)
                    .map(|c| c.rule_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        } else {
            debug!(conflicts = conflicts.len(), "Parameter conflict check complete");
        }

        ConflictReport {
            has_conflicts: !conflicts.is_empty(),
            conflicts,
            by_category,
            has_blocking_conflict,
            can_proceed: !has_blocking_conflict,
            recommendations,
            severity,
            parameters,
        }
    }

    /// BLOCKING conflicts are errors, everything else a warning
    pub fn validate_parameters(&self, params: &ProcessingParameters) -> ParameterValidation {
        let (errors, warnings): (Vec<Conflict>, Vec<Conflict>) = self
            .detect_conflicts(params)
            .conflicts
            .into_iter()
            .partition(|c| c.severity == ConflictSeverity::Blocking);

        ParameterValidation {
            is_valid: errors.is_empty(),
            has_errors: !errors.is_empty(),
            has_warnings: !warnings.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Deterministic parameter adjustments for known conflicts
///
/// Unknown rule ids yield nothing.
pub fn suggest_resolutions(
    params: &ProcessingParameters,
    conflicts: &[Conflict],
) -> Vec<ResolutionSuggestion> {
    let params = normalize_parameters(params);

    conflicts
        .iter()
        .filter_map(|conflict| {
            let (parameter, suggested, reason): (&str, ParamValue, String) =
                match conflict.rule_id.as_str() {
                    "EQ_BOOST_LIMITING" => (
                        keys::EQ_BOOST_MAX,
                        ParamValue::Number(SAFE_EQ_BOOST),
                        format!("Limit EQ boost to {} dB before the limiter", SAFE_EQ_BOOST),
                    ),
                    "STEREO_MONO_CONFLICT" => (
                        keys::STEREO_WIDTH,
                        ParamValue::Number(MAX_MONO_SAFE_WIDTH),
                        "Clamp stereo width to keep mono compatibility".to_string(),
                    ),
                    "COMPRESSION_DYNAMICS_CONFLICT" => (
                        keys::COMPRESSION_RATIO,
                        ParamValue::Number(MAX_DYNAMICS_SAFE_RATIO),
                        "Reduce compression ratio to preserve dynamics".to_string(),
                    ),
                    "LOUDNESS_DYNAMICS_CONFLICT" => (
                        keys::MAXIMIZE_LOUDNESS,
                        ParamValue::Flag(false),
                        "Disable loudness maximization to preserve dynamics".to_string(),
                    ),
                    "STACKED_LIMITERS" => (
                        keys::LIMITER_COUNT,
                        ParamValue::Number(1.0),
                        "Use a single limiter stage".to_string(),
                    ),
                    "BIT_DEPTH_DYNAMICS" => (
                        keys::BIT_DEPTH,
                        ParamValue::Number(24.0),
                        "Export at 24-bit".to_string(),
                    ),
                    "TARGET_CEILING_CONFLICT" => {
                        let ceiling = params.number(keys::TRUE_PEAK_CEILING)?;
                        (
                            keys::TARGET_LOUDNESS,
                            ParamValue::Number(ceiling - MIN_TARGET_HEADROOM),
                            format!(
                                "Keep the loudness target {} LU below the ceiling",
                                MIN_TARGET_HEADROOM
                            ),
                        )
                    }
                    _ => return None,
                };

            Some(ResolutionSuggestion {
                rule_id: conflict.rule_id.clone(),
                parameter: parameter.to_string(),
                current: params.get(parameter).cloned(),
                suggested,
                reason,
            })
        })
        .collect()
}

/// `detect_conflicts` with the built-in rules
pub fn detect_conflicts(params: &ProcessingParameters) -> ConflictDetection {
    ConflictDetector::default().detect_conflicts(params)
}

pub fn detect_parameter_conflicts(
    current: &ProcessingParameters,
    proposed: &ProcessingParameters,
    intent: &ProcessingParameters,
) -> ConflictReport {
    ConflictDetector::default().detect_parameter_conflicts(current, proposed, intent)
}

pub fn validate_parameters(params: &ProcessingParameters) -> ParameterValidation {
    ConflictDetector::default().validate_parameters(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_params_no_conflicts() {
        let detection = detect_conflicts(&ProcessingParameters::new());
        assert!(!detection.has_conflicts);
        assert_eq!(detection.severity, None);
    }

    #[test]
    fn test_sorted_by_severity_desc() {
        let params = ProcessingParameters::new()
            .with("mono_compatible", true)
            .with("width", 1.2)
            .with("limiter_count", 4)
            .with("maximize_loudness", true)
            .with("preserve_dynamics", true);
        let detection = detect_conflicts(&params);
        let ids: Vec<&str> = detection.conflicts.iter().map(|c| c.rule_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["STACKED_LIMITERS", "LOUDNESS_DYNAMICS_CONFLICT", "STEREO_MONO_CONFLICT"]
        );
        assert_eq!(detection.severity, Some(ConflictSeverity::Blocking));
    }

    #[test]
    fn test_conflict_records_affected_values() {
        let params = ProcessingParameters::new()
            .with(keys::EQ_BOOST_MAX, 5.0)
            .with(keys::LIMITER_THRESHOLD, -3.0);
        let conflict = &detect_conflicts(&params).conflicts[0];
        assert_eq!(conflict.values.len(), 2);
        assert_eq!(conflict.values[keys::EQ_BOOST_MAX], ParamValue::Number(5.0));
    }

    #[test]
    fn test_suggestions_for_known_ids_only() {
        let params = ProcessingParameters::new()
            .with(keys::TARGET_LOUDNESS, -3.0)
            .with(keys::TRUE_PEAK_CEILING, -1.0);
        let mut conflicts = detect_conflicts(&params).conflicts;
        let mut unknown = conflicts[0].clone();
        unknown.rule_id = "SOMETHING_ELSE".to_string();
        conflicts.push(unknown);

        let suggestions = suggest_resolutions(&params, &conflicts);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].parameter, keys::TARGET_LOUDNESS);
        assert_eq!(suggestions[0].suggested, ParamValue::Number(-5.0));
        assert_eq!(suggestions[0].current, Some(ParamValue::Number(-3.0)));
    }
}
