//! Regression models fitted on the assembled feature matrix.

pub mod forest;
pub mod metrics;
pub mod tree;

pub use forest::{ForestConfig, RandomForest};
pub use metrics::RegressionMetrics;
pub use tree::{RegressionTree, TreeParams};

use crate::domain::FeatureMatrix;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model has not been fitted")]
    NotFitted,
}

/// A regression model over feature rows.
pub trait Regressor: Send + Sync {
    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<(), ModelError>;

    fn predict_one(&self, features: &[f64]) -> Result<f64, ModelError>;

    /// Predict every row of a matrix.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        features.rows().iter().map(|r| self.predict_one(r)).collect()
    }
}
