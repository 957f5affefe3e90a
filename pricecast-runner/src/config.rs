//! Pipeline configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! target_column = "price"
//! horizon_days = 1
//! profile = "balanced"
//! validation_fraction = 0.2
//!
//! [lags]
//! lags = [1, 2, 3, 7, 14, 30]
//!
//! [confidence.weights]
//! model_fit = 0.6
//! data_recency = 0.25
//! feature_stability = 0.15
//! ```

use pricecast_core::confidence::{ConfidenceConfig, ConfidenceError};
use pricecast_core::features::LagConfig;
use pricecast_core::model::ForestConfig;
use pricecast_core::{ColumnName, SchemaError, TrainingProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid confidence settings: {0}")]
    Confidence(#[from] ConfidenceError),

    #[error("invalid target column: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Forest settings not covered by the training profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestSettings {
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestSettings {
    fn default() -> Self {
        Self {
            min_samples_split: 5,
            min_samples_leaf: 2,
        }
    }
}

/// Everything a [`PredictionPipeline`](crate::PredictionPipeline) run needs
/// besides the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input series the model forecasts.
    pub target_column: String,
    /// How many rows ahead the target is taken.
    pub horizon_days: usize,
    pub profile: TrainingProfile,
    /// Share of the most recent rows held out for evaluation.
    pub validation_fraction: f64,
    /// Refit on all rows after evaluation before forecasting.
    pub refit_on_full: bool,
    pub seed: u64,
    /// Fewer complete rows than this is an error.
    pub min_training_rows: usize,
    pub lags: LagConfig,
    pub confidence: ConfidenceConfig,
    pub forest: ForestSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: "price".into(),
            horizon_days: 1,
            profile: TrainingProfile::default(),
            validation_fraction: 0.2,
            refit_on_full: true,
            seed: 42,
            min_training_rows: 30,
            lags: LagConfig::default(),
            confidence: ConfidenceConfig::default(),
            forest: ForestSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.price_column()?;
        if self.horizon_days == 0 {
            return Err(ConfigError::Invalid("horizon_days must be >= 1".into()));
        }
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "validation_fraction must be in (0, 1), got {}",
                self.validation_fraction
            )));
        }
        if self.min_training_rows < 2 {
            return Err(ConfigError::Invalid("min_training_rows must be >= 2".into()));
        }
        let lags = &self.lags;
        if lags.lags.contains(&0) || lags.pct_changes.contains(&0) {
            return Err(ConfigError::Invalid("lag and percent-change horizons must be >= 1".into()));
        }
        if lags.volatility_windows.iter().any(|&w| w < 2) {
            return Err(ConfigError::Invalid("volatility windows must be >= 2".into()));
        }
        if self.forest.min_samples_leaf == 0 {
            return Err(ConfigError::Invalid("forest.min_samples_leaf must be >= 1".into()));
        }
        self.confidence.validate()?;
        Ok(())
    }

    /// The target series as a validated column name.
    pub fn price_column(&self) -> Result<ColumnName, ConfigError> {
        Ok(ColumnName::raw(&self.target_column)?)
    }

    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            min_samples_split: self.forest.min_samples_split,
            min_samples_leaf: self.forest.min_samples_leaf,
            ..ForestConfig::for_profile(self.profile, self.seed)
        }
    }

    /// Deterministic BLAKE3 hash of the configuration.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
