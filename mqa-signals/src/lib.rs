//! # MQA Signal Core
//!
//! Cross-signal consistency and drift detection for the mastering QA backend:
//! - Consistency rule registry and checker over signal vectors
//! - Drift detection against static training distributions, with hard OOD indicators
//! - Processing parameter conflict detection
//! - Confidence reduction bridge for downstream confidence numbers
//!
//! All checks are pure and synchronous. Static tables are built once and
//! never mutated.

pub mod confidence;
pub mod conflicts;
pub mod consistency;
pub mod drift;
pub mod engine;
pub mod error;
pub mod rules;
pub mod signals;
pub mod types;

pub use confidence::{
    apply_combined_reduction, apply_consistency_reduction, apply_drift_reduction,
    apply_named_reduction, CombinedAdjustment, ConfidenceAdjustment,
};
pub use conflicts::{
    detect_conflicts, detect_parameter_conflicts, normalize_parameters, suggest_resolutions,
    validate_parameters, ConflictDetector, ConflictReport, ParamValue, ProcessingParameters,
};
pub use consistency::{
    calculate_aggregate_status, check_consistency, check_specific_rules,
    explain_inconsistency, get_contradictory_pairs, quick_check, ConsistencyChecker,
    ConsistencyReport,
};
pub use drift::{
    calculate_signal_distance, calculate_z_score, check_multiple_models, check_ood_indicators,
    detect_drift, list_models, DriftDetector, DriftReport,
};
pub use engine::{SignalAnalysis, SignalCore};
pub use error::{SignalError, SignalResult};
pub use rules::{get_available_rules, get_rule, ConsistencyRule, RuleRegistry, CONSISTENCY_RULES};
pub use signals::{SignalName, SignalValue, SignalVector};
pub use types::{ConflictCategory, ConflictSeverity, ConsistencyStatus, DriftStatus, Severity};
