//! Simple Moving Average (SMA).
//!
//! Rolling mean of price over a trailing window.
//! Lookback: window - 1 (first valid value at index window-1).

use super::rolling::rolling_mean;
use super::Indicator;
use crate::domain::ColumnName;

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "SMA window must be >= 1");
        Self {
            window,
            name: format!("sma_{window}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn outputs(&self) -> Vec<ColumnName> {
        vec![ColumnName::Sma(self.window)]
    }

    fn compute(&self, prices: &[f64]) -> Vec<(ColumnName, Vec<f64>)> {
        vec![(ColumnName::Sma(self.window), rolling_mean(prices, self.window))]
    }
}
