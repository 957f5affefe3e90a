//! Prediction report: the serializable output of one pipeline run.

use chrono::NaiveDate;
use pricecast_core::data::CleaningReport;
use pricecast_core::model::RegressionMetrics;
use pricecast_core::{ColumnName, ConfidenceBreakdown, TrainingProfile};
use serde::{Deserialize, Serialize};

/// Current schema version for serialized reports.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub schema_version: u32,
    pub target_column: String,
    pub predicted_value: f64,
    /// Date of the feature row the forecast was made from.
    pub feature_date: NaiveDate,
    /// `feature_date` plus the horizon.
    pub target_date: NaiveDate,
    pub horizon_days: usize,
    pub as_of: NaiveDate,
    pub data_age_days: i64,
    pub confidence: ConfidenceBreakdown,
    /// Hold-out metrics of the evaluation fit.
    pub metrics: RegressionMetrics,
    pub profile: TrainingProfile,
    pub tree_count: usize,
    pub max_depth: usize,
    pub training_rows: usize,
    pub validation_rows: usize,
    pub features_expected: usize,
    pub features_used: usize,
    pub dropped_features: Vec<ColumnName>,
    pub cleaning: CleaningReport,
    pub dataset_hash: String,
    /// BLAKE3 over the configuration and the dataset hash.
    pub fingerprint: String,
}

impl PredictionReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Short human-readable summary, one fact per line.
    pub fn summary(&self) -> String {
        let mape = self
            .metrics
            .mape
            .map(|m| format!("{:.2}%", m * 100.0))
            .unwrap_or_else(|| "n/a".into());
        let mut lines = vec![
            format!(
                "{} on {} (horizon {}d): {:.4}",
                self.target_column, self.target_date, self.horizon_days, self.predicted_value
            ),
            format!(
                "confidence {:.3} (fit {:.3}, recency {:.3}, stability {:.3})",
                self.confidence.combined_score,
                self.confidence.model_fit_component,
                self.confidence.data_recency_component,
                self.confidence.feature_stability_component
            ),
            format!(
                "hold-out: MAE {:.4}, RMSE {:.4}, MAPE {}, R² {:.3} over {} rows",
                self.metrics.mae, self.metrics.rmse, mape, self.metrics.r2, self.validation_rows
            ),
            format!(
                "profile {} ({} trees, depth {}), trained on {} rows",
                self.profile, self.tree_count, self.max_depth, self.training_rows
            ),
            format!(
                "features {}/{} used, data age {} days, {} outliers cleaned",
                self.features_used,
                self.features_expected,
                self.data_age_days,
                self.cleaning.total_outliers()
            ),
        ];
        if !self.dropped_features.is_empty() {
            let dropped: Vec<String> = self.dropped_features.iter().map(|c| c.to_string()).collect();
            lines.push(format!("dropped: {}", dropped.join(", ")));
        }
        lines.push(format!("fingerprint {}", &self.fingerprint[..self.fingerprint.len().min(16)]));
        lines.join("\n")
    }
}
