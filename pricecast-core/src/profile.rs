//! Training profiles: named speed/accuracy trade-offs for the forest.
//!
//! - **UltraFast**: 50 trees, depth 8
//! - **Fast**: 100 trees, depth 10
//! - **Balanced**: 150 trees, depth 12 (default)
//! - **HighPrecision**: 200 trees, depth 15
//!
//! Lighter profiles also cap how much model-fit confidence they can earn
//! (`fit_ceiling`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("unknown training profile '{0}' (expected one of: ultra_fast, fast, balanced, high_precision)")]
    UnknownProfile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrainingProfile {
    UltraFast,
    Fast,
    #[default]
    Balanced,
    HighPrecision,
}

impl TrainingProfile {
    pub const ALL: [TrainingProfile; 4] = [
        Self::UltraFast,
        Self::Fast,
        Self::Balanced,
        Self::HighPrecision,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::UltraFast => "ultra_fast",
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::HighPrecision => "high_precision",
        }
    }

    pub fn tree_count(&self) -> usize {
        match self {
            Self::UltraFast => 50,
            Self::Fast => 100,
            Self::Balanced => 150,
            Self::HighPrecision => 200,
        }
    }

    pub fn max_depth(&self) -> usize {
        match self {
            Self::UltraFast => 8,
            Self::Fast => 10,
            Self::Balanced => 12,
            Self::HighPrecision => 15,
        }
    }

    /// Expected wall-clock training time, in minutes.
    pub fn expected_minutes(&self) -> RangeInclusive<u32> {
        match self {
            Self::UltraFast => 1..=2,
            Self::Fast => 2..=3,
            Self::Balanced => 3..=4,
            Self::HighPrecision => 5..=8,
        }
    }

    /// [`expected_minutes`](Self::expected_minutes) in seconds; the
    /// `expected_duration_seconds` field of a profile record.
    pub fn expected_duration_seconds(&self) -> RangeInclusive<u64> {
        let minutes = self.expected_minutes();
        u64::from(*minutes.start()) * 60..=u64::from(*minutes.end()) * 60
    }

    /// Human-readable form of [`expected_minutes`](Self::expected_minutes).
    pub fn expected_duration(&self) -> String {
        let range = self.expected_minutes();
        format!("~{}-{} min", range.start(), range.end())
    }

    /// Upper bound on the model-fit confidence component.
    pub fn fit_ceiling(&self) -> f64 {
        match self {
            Self::UltraFast => 0.85,
            Self::Fast => 0.90,
            Self::Balanced => 0.95,
            Self::HighPrecision => 1.00,
        }
    }
}

/// Look up a profile by name. There is no fallback for unknown names.
pub fn select(name: &str) -> Result<TrainingProfile, ProfileError> {
    name.parse()
}

impl fmt::Display for TrainingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrainingProfile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ProfileError::UnknownProfile(s.to_string()))
    }
}
