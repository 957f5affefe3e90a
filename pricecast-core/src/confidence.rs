//! ConfidenceScorer: one score in [0, 1] from model fit, data freshness and
//! feature stability.
//!
//! - model_fit = clamp(1 - MAPE / mape_ceiling) * profile fit ceiling
//! - data_recency = 0.5^(age / half_life), 1.0 for age <= 0
//! - feature_stability = features_used / features_expected
//! - combined = weighted sum of the three, clamped
//!
//! Pure and deterministic: identical inputs give a bit-identical score.

use crate::model::RegressionMetrics;
use crate::profile::TrainingProfile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfidenceError {
    #[error("confidence weights must sum to 1.0 (got {sum})")]
    InvalidWeights { sum: f64 },

    #[error("confidence weight '{name}' must be finite and non-negative (got {value})")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("'{name}' must be positive and finite (got {value})")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub model_fit: f64,
    pub data_recency: f64,
    pub feature_stability: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            model_fit: 0.6,
            data_recency: 0.25,
            feature_stability: 0.15,
        }
    }
}

impl ConfidenceWeights {
    pub fn validate(&self) -> Result<(), ConfidenceError> {
        for (name, value) in [
            ("model_fit", self.model_fit),
            ("data_recency", self.data_recency),
            ("feature_stability", self.feature_stability),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfidenceError::NegativeWeight { name, value });
            }
        }
        let sum = self.model_fit + self.data_recency + self.feature_stability;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfidenceError::InvalidWeights { sum });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub weights: ConfidenceWeights,
    /// MAPE at which the model-fit component reaches zero.
    pub mape_ceiling: f64,
    /// Data age at which the recency component halves.
    pub half_life_days: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            mape_ceiling: 0.20,
            half_life_days: 30.0,
        }
    }
}

impl ConfidenceConfig {
    pub fn validate(&self) -> Result<(), ConfidenceError> {
        self.weights.validate()?;
        for (name, value) in [
            ("mape_ceiling", self.mape_ceiling),
            ("half_life_days", self.half_life_days),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfidenceError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// What the scorer needs to know about a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub fit: RegressionMetrics,
    /// Candidate feature columns offered to the assembler.
    pub features_expected: usize,
    /// Feature columns that survived into the matrix.
    pub features_used: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub model_fit_component: f64,
    pub data_recency_component: f64,
    pub feature_stability_component: f64,
    pub combined_score: f64,
}

/// Scores predictions under a validated [`ConfidenceConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceScorer {
    config: ConfidenceConfig,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self {
            config: ConfidenceConfig::default(),
        }
    }
}

impl ConfidenceScorer {
    pub fn new(config: ConfidenceConfig) -> Result<Self, ConfidenceError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    pub fn score(
        &self,
        metrics: &ModelMetrics,
        profile: TrainingProfile,
        data_age_days: i64,
    ) -> ConfidenceBreakdown {
        let fit = self.model_fit(metrics.fit.mape, profile);
        let recency = self.recency(data_age_days);
        let stability = stability(metrics.features_used, metrics.features_expected);

        let w = &self.config.weights;
        let combined = w.model_fit * fit + w.data_recency * recency + w.feature_stability * stability;

        ConfidenceBreakdown {
            model_fit_component: fit,
            data_recency_component: recency,
            feature_stability_component: stability,
            combined_score: combined.clamp(0.0, 1.0),
        }
    }

    /// Zero when MAPE is unknown.
    pub fn model_fit(&self, mape: Option<f64>, profile: TrainingProfile) -> f64 {
        match mape {
            Some(m) if m.is_finite() => {
                (1.0 - m / self.config.mape_ceiling).clamp(0.0, 1.0) * profile.fit_ceiling()
            }
            _ => 0.0,
        }
    }

    /// Non-increasing in age.
    pub fn recency(&self, data_age_days: i64) -> f64 {
        if data_age_days <= 0 {
            return 1.0;
        }
        0.5_f64
            .powf(data_age_days as f64 / self.config.half_life_days)
            .clamp(0.0, 1.0)
    }
}

fn stability(used: usize, expected: usize) -> f64 {
    if expected == 0 {
        return 1.0;
    }
    (used as f64 / expected as f64).clamp(0.0, 1.0)
}

/// Score with the default configuration.
pub fn score(metrics: &ModelMetrics, profile: TrainingProfile, data_age_days: i64) -> ConfidenceBreakdown {
    ConfidenceScorer::default().score(metrics, profile, data_age_days)
}
