//! Drift and out-of-distribution detection
//!
//! - `distributions`: static per-model training statistics
//! - `ood`: hard, model-independent OOD indicators
//! - `detector`: z-score analysis and status aggregation

pub mod detector;
pub mod distributions;
pub mod ood;

pub use detector::{
    analyze_signal, calculate_signal_distance, calculate_z_score, check_multiple_models,
    detect_drift, drift_reduction, get_overall_drift_status, DriftDetector, DriftReport,
    MultiModelDriftReport, SignalDriftAnalysis,
};
pub use distributions::{
    list_models, DistributionCatalog, ModelInfo, SignalStats, TrainingDistribution,
    TRAINING_DISTRIBUTIONS,
};
pub use ood::{check_ood_indicators, OodCheck, OodIndicator, OOD_INDICATORS};
