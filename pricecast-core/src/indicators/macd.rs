//! Moving Average Convergence Divergence (MACD).
//!
//! MACD = EMA(fast) - EMA(slow); signal = EMA(signal) of MACD;
//! histogram = MACD - signal. EMAs are seeded at the first price, so all
//! three lines are defined from the first row.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::ColumnName;

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD spans must be >= 1");
        assert!(fast < slow, "MACD fast span must be shorter than slow span");
        Self {
            fast,
            slow,
            signal,
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn outputs(&self) -> Vec<ColumnName> {
        vec![
            ColumnName::Macd,
            ColumnName::MacdSignal,
            ColumnName::MacdHistogram,
        ]
    }

    fn compute(&self, prices: &[f64]) -> Vec<(ColumnName, Vec<f64>)> {
        let fast = ema_of_series(prices, self.fast);
        let slow = ema_of_series(prices, self.slow);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_of_series(&macd, self.signal);
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        vec![
            (ColumnName::Macd, macd),
            (ColumnName::MacdSignal, signal),
            (ColumnName::MacdHistogram, histogram),
        ]
    }
}
