//! Shared severity and status types
//!
//! Every enum here is totally ordered from least to most severe so that
//! "worst of" aggregation is a plain `max()`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Consistency severity
// ============================================================================

/// Severity of a consistency rule violation or OOD indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Weight used by the aggregate status calculation
    pub fn weight(self) -> u32 {
        match self {
            Severity::None => 0,
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Report statuses
// ============================================================================

/// Overall status of a consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsistencyStatus {
    Consistent,
    MinorInconsistency,
    Inconsistent,
    Contradictory,
}

impl ConsistencyStatus {
    pub const ALL: [ConsistencyStatus; 4] = [
        ConsistencyStatus::Consistent,
        ConsistencyStatus::MinorInconsistency,
        ConsistencyStatus::Inconsistent,
        ConsistencyStatus::Contradictory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConsistencyStatus::Consistent => "CONSISTENT",
            ConsistencyStatus::MinorInconsistency => "MINOR_INCONSISTENCY",
            ConsistencyStatus::Inconsistent => "INCONSISTENT",
            ConsistencyStatus::Contradictory => "CONTRADICTORY",
        }
    }
}

impl fmt::Display for ConsistencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown consistency status: {}", s))
    }
}

/// Overall or per-signal drift status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftStatus {
    InDistribution,
    MinorDrift,
    SignificantDrift,
    OutOfDistribution,
}

impl DriftStatus {
    pub const ALL: [DriftStatus; 4] = [
        DriftStatus::InDistribution,
        DriftStatus::MinorDrift,
        DriftStatus::SignificantDrift,
        DriftStatus::OutOfDistribution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DriftStatus::InDistribution => "IN_DISTRIBUTION",
            DriftStatus::MinorDrift => "MINOR_DRIFT",
            DriftStatus::SignificantDrift => "SIGNIFICANT_DRIFT",
            DriftStatus::OutOfDistribution => "OUT_OF_DISTRIBUTION",
        }
    }
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown drift status: {}", s))
    }
}

// ============================================================================
// Parameter conflicts
// ============================================================================

/// Severity of a processing parameter conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
    /// Job must not proceed with these parameters
    Blocking,
}

impl ConflictSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictSeverity::Low => "LOW",
            ConflictSeverity::Medium => "MEDIUM",
            ConflictSeverity::High => "HIGH",
            ConflictSeverity::Blocking => "BLOCKING",
        }
    }
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping used for `byCategory` buckets in conflict reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictCategory {
    /// EQ interacting with dynamics processing
    EqDynamics,
    Stereo,
    Dynamics,
    /// Contradictory stated intents
    Intent,
    /// Output format (bit depth, dither)
    Format,
    Loudness,
}
