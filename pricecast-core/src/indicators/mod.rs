//! Technical indicators over a single price series.
//!
//! Indicators are pure functions: price history in, one or more named
//! columns out, each the same length as the input. Warmup positions are
//! `NaN`. No value at row t may depend on prices after row t.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use bollinger::Bollinger;
pub use ema::{ema_of_series, Ema};
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::Stochastic;

use crate::domain::ColumnName;

/// A technical indicator.
///
/// `compute` returns every column listed by `outputs`, in that order.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "macd_12_26_9").
    fn name(&self) -> &str;

    /// Number of rows needed before every output is defined.
    fn lookback(&self) -> usize;

    /// Columns this indicator produces.
    fn outputs(&self) -> Vec<ColumnName>;

    fn compute(&self, prices: &[f64]) -> Vec<(ColumnName, Vec<f64>)>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
