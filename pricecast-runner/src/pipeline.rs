//! PredictionPipeline: clean → features → fit → forecast → confidence.

use crate::config::{ConfigError, PipelineConfig};
use crate::loader::compute_dataset_hash;
use crate::report::{PredictionReport, SCHEMA_VERSION};
use chrono::{Days, NaiveDate};
use pricecast_core::confidence::{ConfidenceError, ConfidenceScorer, ModelMetrics};
use pricecast_core::data::{clean, CleaningReport};
use pricecast_core::features::{assemble, calendar_columns, lag_columns, AssembledFeatures, IndicatorEngine};
use pricecast_core::indicators::rolling::lead;
use pricecast_core::model::{ModelError, RandomForest, Regressor, RegressionMetrics};
use pricecast_core::{ColumnName, Frame, SchemaError};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("not enough complete rows to train: need {required}, have {available}")]
    InsufficientRows { required: usize, available: usize },

    #[error("forecast date out of range")]
    DateOutOfRange,

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("confidence error: {0}")]
    Confidence(#[from] ConfidenceError),
}

/// Cleaned frame with every feature column and the target, plus what the
/// cleaner and assembler did to it.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub frame: Frame,
    pub cleaning: CleaningReport,
    pub assembled: AssembledFeatures,
    pub target: ColumnName,
}

/// One configured pipeline. Holds no per-run state, so a single instance
/// can serve concurrent runs.
#[derive(Debug)]
pub struct PredictionPipeline {
    config: PipelineConfig,
    price: ColumnName,
    engine: IndicatorEngine,
    scorer: ConfidenceScorer,
}

impl PredictionPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let price = config.price_column()?;
        let scorer = ConfidenceScorer::new(config.confidence)?;
        Ok(Self {
            config,
            price,
            engine: IndicatorEngine::standard(),
            scorer,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn target(&self) -> ColumnName {
        ColumnName::Target(self.config.horizon_days)
    }

    /// Clean the input, build every feature family concurrently, add the
    /// target and assemble the training matrix.
    pub fn build_features(&self, input: &Frame) -> Result<FeatureSet, PipelineError> {
        let (cleaned, cleaning) = clean(input);

        let (indicators, (seasonal, lags)) = rayon::join(
            || self.engine.compute_columns(&cleaned, &self.price),
            || {
                rayon::join(
                    || calendar_columns(&cleaned),
                    || lag_columns(&cleaned, &self.price, &self.config.lags),
                )
            },
        );

        let target = self.target();
        let target_values = lead(cleaned.require(&self.price)?, self.config.horizon_days);

        let mut frame = cleaned;
        frame.merge(indicators?)?;
        frame.merge(seasonal)?;
        frame.merge(lags?)?;
        frame.insert(target.clone(), target_values)?;

        let assembled = assemble(&frame, &target)?;
        Ok(FeatureSet {
            frame,
            cleaning,
            assembled,
            target,
        })
    }

    /// Fit, evaluate on the most recent rows and forecast from the latest
    /// complete feature row.
    pub fn run(&self, input: &Frame, as_of: NaiveDate) -> Result<PredictionReport, PipelineError> {
        let started = Instant::now();
        let features = self.build_features(input)?;
        let assembled = &features.assembled;

        let available = assembled.len();
        if available < self.config.min_training_rows {
            return Err(PipelineError::InsufficientRows {
                required: self.config.min_training_rows,
                available,
            });
        }
        let latest = assembled.latest.as_ref().ok_or(PipelineError::InsufficientRows {
            required: self.config.min_training_rows,
            available: 0,
        })?;

        let validation_rows = validation_size(available, self.config.validation_fraction);
        let training_rows = available - validation_rows;
        let (train, valid) = assembled.matrix.split_at(training_rows);
        let (train_y, valid_y) = assembled.target.split_at(training_rows);

        let forest_config = self.config.forest_config();
        let mut forest = RandomForest::new(forest_config.clone());
        forest.fit(&train, train_y)?;
        let predictions = forest.predict(&valid)?;
        let metrics = RegressionMetrics::calculate(valid_y, &predictions);
        debug!(
            mae = metrics.mae,
            rmse = metrics.rmse,
            r2 = metrics.r2,
            rows = validation_rows,
            "hold-out evaluation"
        );

        if self.config.refit_on_full {
            forest.fit(&assembled.matrix, &assembled.target)?;
        }

        let row: Vec<f64> = assembled
            .matrix
            .columns()
            .iter()
            .map(|c| latest.get(c).unwrap_or(f64::NAN))
            .collect();
        let predicted_value = forest.predict_one(&row)?;

        let target_date = latest
            .date
            .checked_add_days(Days::new(self.config.horizon_days as u64))
            .ok_or(PipelineError::DateOutOfRange)?;
        let last_observed = features.frame.last_date().unwrap_or(latest.date);
        let data_age_days = (as_of - last_observed).num_days();
        if data_age_days < 0 {
            warn!(%as_of, %last_observed, "as-of date precedes the last observation");
        }

        let model_metrics = ModelMetrics {
            fit: metrics,
            features_expected: assembled.candidate_count,
            features_used: assembled.feature_count(),
        };
        let confidence = self.scorer.score(&model_metrics, self.config.profile, data_age_days);

        let dataset_hash = compute_dataset_hash(input);
        let fingerprint = run_fingerprint(&self.config.fingerprint()?, &dataset_hash);

        info!(
            target = %self.config.target_column,
            %target_date,
            predicted = predicted_value,
            confidence = confidence.combined_score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "prediction complete"
        );

        Ok(PredictionReport {
            schema_version: SCHEMA_VERSION,
            target_column: self.config.target_column.clone(),
            predicted_value,
            feature_date: latest.date,
            target_date,
            horizon_days: self.config.horizon_days,
            as_of,
            data_age_days,
            confidence,
            metrics,
            profile: self.config.profile,
            tree_count: forest_config.n_trees,
            max_depth: forest_config.max_depth,
            training_rows,
            validation_rows,
            features_expected: assembled.candidate_count,
            features_used: assembled.feature_count(),
            dropped_features: assembled.dropped_columns.clone(),
            cleaning: features.cleaning.clone(),
            dataset_hash,
            fingerprint,
        })
    }
}

/// Hold-out size: at least one row, and at least one row left to train on.
fn validation_size(rows: usize, fraction: f64) -> usize {
    let n = (rows as f64 * fraction).round() as usize;
    n.clamp(1, rows.saturating_sub(1).max(1))
}

fn run_fingerprint(config_hash: &str, dataset_hash: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(config_hash.as_bytes());
    hasher.update(dataset_hash.as_bytes());
    hasher.finalize().to_hex().to_string()
}
