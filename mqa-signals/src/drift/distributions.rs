//! Static training distributions
//!
//! Per-model summary statistics of the data each ML model was trained on.
//! The built-in table is compiled in; extra models may be added from
//! configuration at startup. A catalog is immutable once built.

use crate::error::{SignalError, SignalResult};
use crate::signals::SignalName;
use mqa_common::config::{DistributionConfig, DriftConfig, SignalStatsConfig};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Distribution of one signal in a model's training set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub weight: f64,
}

impl SignalStats {
    pub const fn new(mean: f64, std: f64, min: f64, max: f64, weight: f64) -> Self {
        Self {
            mean,
            std,
            min,
            max,
            weight,
        }
    }

    /// Check the stats are usable: all finite, `std >= 0`, `min <= max`, `weight >= 0`
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("max", self.max),
            ("weight", self.weight),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{} is not finite ({})", name, value));
        }
        if self.std < 0.0 {
            return Err(format!("std must be >= 0 (got {})", self.std));
        }
        if self.min > self.max {
            return Err(format!("min {} exceeds max {}", self.min, self.max));
        }
        if self.weight < 0.0 {
            return Err(format!("weight must be >= 0 (got {})", self.weight));
        }
        Ok(())
    }
}

impl From<SignalStatsConfig> for SignalStats {
    fn from(c: SignalStatsConfig) -> Self {
        Self::new(c.mean, c.std, c.min, c.max, c.weight.unwrap_or(1.0))
    }
}

/// Training distribution of one model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDistribution {
    pub model_id: String,
    pub version: String,
    pub signals: BTreeMap<SignalName, SignalStats>,
}

impl TrainingDistribution {
    pub fn new(model_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            version: version.into(),
            signals: BTreeMap::new(),
        }
    }

    pub fn with_signal(mut self, name: SignalName, stats: SignalStats) -> Self {
        self.signals.insert(name, stats);
        self
    }

    pub fn get(&self, name: SignalName) -> Option<&SignalStats> {
        self.signals.get(&name)
    }

    pub fn validate(&self) -> SignalResult<()> {
        for (name, stats) in &self.signals {
            stats
                .validate()
                .map_err(|reason| SignalError::InvalidDistribution {
                    model: self.model_id.clone(),
                    signal: name.to_string(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Build from a configured entry
    ///
    /// Unknown signal names are skipped with a warning; invalid stats are errors.
    pub fn from_config(model_id: &str, config: &DistributionConfig) -> SignalResult<Self> {
        let mut distribution = Self::new(model_id, config.version.clone());
        for (raw_name, stats) in &config.signals {
            match raw_name.parse::<SignalName>() {
                Ok(name) => {
                    distribution.signals.insert(name, SignalStats::from(*stats));
                }
                Err(_) => warn!(
                    "Ignoring unknown signal '{}' in distribution '{}'",
                    raw_name, model_id
                ),
            }
        }
        distribution.validate()?;
        Ok(distribution)
    }
}

/// Model summary returned by `list_models`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub model_id: String,
    pub version: String,
    pub signal_count: usize,
}

/// Immutable set of training distributions keyed by model id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistributionCatalog {
    models: BTreeMap<String, TrainingDistribution>,
}

/// Built-in catalog
pub static TRAINING_DISTRIBUTIONS: Lazy<DistributionCatalog> =
    Lazy::new(DistributionCatalog::builtin);

impl DistributionCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with the compiled-in models
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for distribution in builtin_distributions() {
            catalog
                .models
                .insert(distribution.model_id.clone(), distribution);
        }
        catalog
    }

    /// Built-ins plus configured models; configured entries replace built-ins of the same id
    pub fn from_config(config: &DriftConfig) -> SignalResult<Self> {
        let mut catalog = Self::builtin();
        for (model_id, entry) in &config.distributions {
            let distribution = TrainingDistribution::from_config(model_id, entry)?;
            if catalog.models.contains_key(model_id) {
                warn!(
                    "Configured distribution '{}' overrides built-in model",
                    model_id
                );
            }
            info!(
                "Registered distribution '{}' v{} ({} signals)",
                model_id,
                distribution.version,
                distribution.signals.len()
            );
            catalog.insert(distribution)?;
        }
        Ok(catalog)
    }

    /// Add or replace a model after validating it
    pub fn insert(&mut self, distribution: TrainingDistribution) -> SignalResult<()> {
        distribution.validate()?;
        self.models
            .insert(distribution.model_id.clone(), distribution);
        Ok(())
    }

    pub fn get(&self, model_id: &str) -> Option<&TrainingDistribution> {
        self.models.get(model_id)
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.models.contains_key(model_id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Model ids with versions and signal counts, sorted by id
    pub fn list_models(&self) -> Vec<ModelInfo> {
        self.models
            .values()
            .map(|d| ModelInfo {
                model_id: d.model_id.clone(),
                version: d.version.clone(),
                signal_count: d.signals.len(),
            })
            .collect()
    }
}

/// List the built-in models
pub fn list_models() -> Vec<ModelInfo> {
    TRAINING_DISTRIBUTIONS.list_models()
}

fn builtin_distributions() -> Vec<TrainingDistribution> {
    use SignalName::*;

    vec![
        TrainingDistribution::new("subgenre_v2", "2.1.0")
            .with_signal(Bpm, SignalStats::new(118.0, 28.0, 60.0, 200.0, 1.0))
            .with_signal(SubBassEnergy, SignalStats::new(0.45, 0.15, 0.05, 0.95, 0.8))
            .with_signal(TransientSharpness, SignalStats::new(0.55, 0.15, 0.1, 0.95, 0.8))
            .with_signal(TransientDensity, SignalStats::new(0.45, 0.18, 0.02, 0.95, 0.6))
            .with_signal(SpectralCentroid, SignalStats::new(2200.0, 700.0, 600.0, 6000.0, 0.6))
            .with_signal(IntegratedLoudness, SignalStats::new(-10.5, 3.0, -24.0, -4.0, 1.0))
            .with_signal(CrestFactor, SignalStats::new(4.0, 1.5, 1.4, 12.0, 0.7))
            .with_signal(StereoWidth, SignalStats::new(0.6, 0.18, 0.05, 1.2, 0.5)),
        TrainingDistribution::new("loudness_analysis", "1.3.0")
            .with_signal(IntegratedLoudness, SignalStats::new(-12.0, 4.0, -30.0, -3.0, 1.2))
            .with_signal(TruePeak, SignalStats::new(-1.0, 1.2, -9.0, 1.5, 1.0))
            .with_signal(LoudnessRange, SignalStats::new(6.5, 3.0, 1.0, 20.0, 0.8))
            .with_signal(DynamicRange, SignalStats::new(8.0, 3.0, 2.0, 20.0, 1.0))
            .with_signal(CrestFactor, SignalStats::new(4.0, 1.5, 1.4, 12.0, 0.8))
            .with_signal(RmsLevel, SignalStats::new(-14.0, 4.0, -35.0, -4.0, 0.8)),
        TrainingDistribution::new("stereo_analysis", "1.0.0")
            .with_signal(StereoWidth, SignalStats::new(0.6, 0.2, 0.0, 1.4, 1.0))
            .with_signal(PhaseCorrelation, SignalStats::new(0.55, 0.2, -0.3, 1.0, 1.2))
            .with_signal(SubBassEnergy, SignalStats::new(0.45, 0.15, 0.05, 0.95, 0.5)),
    ]
}
