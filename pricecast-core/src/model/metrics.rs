//! Regression metrics for hold-out evaluation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub rmse: f64,
    /// Mean absolute percentage error as a fraction (0.05 = 5%). `None` when
    /// every actual value is zero.
    pub mape: Option<f64>,
    pub r2: f64,
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Score predictions against actuals. Both slices must have equal length;
    /// extra elements of the longer one are ignored.
    pub fn calculate(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len());
        let (actual, predicted) = (&actual[..n], &predicted[..n]);
        Self {
            mae: mean_absolute_error(actual, predicted),
            rmse: mean_squared_error(actual, predicted).sqrt(),
            mape: mean_absolute_percentage_error(actual, predicted),
            r2: r_squared(actual, predicted),
            n_samples: n,
        }
    }
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Zero actuals are skipped.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let ratios: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .filter(|(t, _)| t.abs() > 1e-10)
        .map(|(t, p)| ((t - p) / t).abs())
        .collect();
    if ratios.is_empty() {
        return None;
    }
    Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
}

/// R² = 1 - SS_res / SS_tot. A constant actual series gives 0.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual.iter().zip(predicted).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = actual.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot < 1e-10 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}
