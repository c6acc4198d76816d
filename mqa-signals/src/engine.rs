//! Startup-configured signal core
//!
//! Owns a rule registry and a distribution catalog built once at startup
//! (built-ins plus configuration). After construction it is only ever read,
//! so a single instance can be shared across request handlers.

use crate::confidence::{apply_combined_reduction, CombinedAdjustment};
use crate::conflicts::ConflictDetector;
use crate::consistency::{ConsistencyChecker, ConsistencyReport};
use crate::drift::{DistributionCatalog, DriftDetector, MultiModelDriftReport};
use crate::error::SignalResult;
use crate::rules::{ConsistencyRule, RuleRegistry};
use crate::signals::SignalVector;
use mqa_common::config::{ConfigResolver, TomlConfig};
use serde::Serialize;
use tracing::info;

#[derive(Debug)]
pub struct SignalCore {
    registry: RuleRegistry,
    catalog: DistributionCatalog,
}

/// Consistency and drift results for one signal vector
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalAnalysis {
    pub consistency: ConsistencyReport,
    pub drift: MultiModelDriftReport,
}

impl SignalAnalysis {
    /// Apply both reductions to a model confidence
    pub fn adjust_confidence(&self, confidence: f64) -> CombinedAdjustment {
        apply_combined_reduction(confidence, self.consistency.status, self.drift.overall_status)
    }
}

impl Default for SignalCore {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SignalCore {
    /// Built-in rules and distributions only
    pub fn builtin() -> Self {
        Self {
            registry: RuleRegistry::builtin(),
            catalog: DistributionCatalog::builtin(),
        }
    }

    pub fn from_config(config: &TomlConfig) -> SignalResult<Self> {
        let catalog = DistributionCatalog::from_config(&config.drift)?;
        let registry = RuleRegistry::builtin();

        info!(
            "Signal core ready: {} consistency rules, {} models",
            registry.len(),
            catalog.len()
        );
        Ok(Self { registry, catalog })
    }

    /// Resolve, load and apply configuration
    pub fn load(resolver: &ConfigResolver) -> SignalResult<Self> {
        let config = resolver.load()?;
        Self::from_config(&config)
    }

    /// Add a rule before the core is shared
    pub fn register_rule(&mut self, rule: Box<dyn ConsistencyRule>) -> SignalResult<()> {
        self.registry.register(rule)
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &DistributionCatalog {
        &self.catalog
    }

    pub fn checker(&self) -> ConsistencyChecker<'_> {
        ConsistencyChecker::new(&self.registry)
    }

    pub fn drift_detector(&self) -> DriftDetector<'_> {
        DriftDetector::new(&self.catalog)
    }

    pub fn conflict_detector(&self) -> ConflictDetector<'static> {
        ConflictDetector::default()
    }

    /// Consistency check plus drift against each model
    pub fn analyze<S: AsRef<str>>(&self, signals: &SignalVector, model_ids: &[S]) -> SignalAnalysis {
        SignalAnalysis {
            consistency: self.checker().check_consistency(signals),
            drift: self.drift_detector().check_multiple_models(signals, model_ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalName;
    use crate::types::{ConsistencyStatus, DriftStatus};

    #[test]
    fn test_builtin_core_matches_statics() {
        let core = SignalCore::builtin();
        assert_eq!(core.registry().len(), crate::rules::CONSISTENCY_RULES.len());
        assert_eq!(core.catalog(), &*crate::drift::TRAINING_DISTRIBUTIONS);
    }

    #[test]
    fn test_analyze_and_adjust() {
        let core = SignalCore::builtin();
        let signals = SignalVector::new()
            .with(SignalName::IntegratedLoudness, -14.0)
            .with(SignalName::TruePeak, -20.0);
        let analysis = core.analyze(&signals, &["loudness_analysis"]);
        assert_eq!(analysis.consistency.status, ConsistencyStatus::Contradictory);
        // truePeak far below the training range
        assert_eq!(analysis.drift.overall_status, DriftStatus::OutOfDistribution);
        assert!(!analysis.drift.should_trust_any_ml);

        let adjusted = analysis.adjust_confidence(0.9);
        assert!((adjusted.adjusted - 0.3).abs() < 1e-9);
        assert!(adjusted.was_reduced);
    }
}
