//! Processing parameter conflict detection
//!
//! Runs at job-submission time over requested parameters, independent of
//! analysis signals. Callers gate on `canProceed`.

pub mod detector;
pub mod parameters;
pub mod rules;

pub use detector::{
    detect_conflicts, detect_parameter_conflicts, suggest_resolutions, validate_parameters,
    Conflict, ConflictDetection, ConflictDetector, ConflictReport, ParameterValidation,
    ResolutionSuggestion,
};
pub use parameters::{normalize_parameters, ParamValue, ProcessingParameters};
pub use rules::{ConflictRule, CONFLICT_RULES};
