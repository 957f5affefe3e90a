//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Five columns from one pass:
//! - Middle: SMA(price, period)
//! - Upper / Lower: middle +/- mult * stddev(price, period)
//! - Width: upper - lower
//! - Position: (price - lower) / (upper - lower), missing when the bands
//!   collapse (zero width)
//!
//! Uses sample stddev (divide by N - 1).
//! Lookback: period - 1.

use super::rolling::{rolling_mean, rolling_std};
use super::Indicator;
use crate::domain::ColumnName;

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        assert!(
            multiplier > 0.0 && multiplier.is_finite(),
            "Bollinger multiplier must be positive and finite"
        );
        Self {
            period,
            multiplier,
            name: format!("bollinger_{period}_{multiplier}"),
        }
    }
}

impl Default for Bollinger {
    fn default() -> Self {
        Self::new(20, 2.0)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn outputs(&self) -> Vec<ColumnName> {
        vec![
            ColumnName::BollingerMiddle,
            ColumnName::BollingerUpper,
            ColumnName::BollingerLower,
            ColumnName::BollingerWidth,
            ColumnName::BollingerPosition,
        ]
    }

    fn compute(&self, prices: &[f64]) -> Vec<(ColumnName, Vec<f64>)> {
        let middle = rolling_mean(prices, self.period);
        let std = rolling_std(prices, self.period);
        let n = prices.len();

        let mut upper = vec![f64::NAN; n];
        let mut lower = vec![f64::NAN; n];
        let mut width = vec![f64::NAN; n];
        let mut position = vec![f64::NAN; n];

        for i in 0..n {
            let half_width = self.multiplier * std[i];
            upper[i] = middle[i] + half_width;
            lower[i] = middle[i] - half_width;
            width[i] = upper[i] - lower[i];
            // NaN width fails the comparison too.
            if width[i] > 0.0 {
                position[i] = (prices[i] - lower[i]) / width[i];
            }
        }

        vec![
            (ColumnName::BollingerMiddle, middle),
            (ColumnName::BollingerUpper, upper),
            (ColumnName::BollingerLower, lower),
            (ColumnName::BollingerWidth, width),
            (ColumnName::BollingerPosition, position),
        ]
    }
}
