//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * price[t] + (1 - alpha) * EMA[t-1],
//! alpha = 2 / (span + 1), no bias adjustment.
//! Seed: EMA at the first non-missing price equals that price.
//! Lookback: 0.

use super::Indicator;
use crate::domain::ColumnName;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn outputs(&self) -> Vec<ColumnName> {
        vec![ColumnName::Ema(self.span)]
    }

    fn compute(&self, prices: &[f64]) -> Vec<(ColumnName, Vec<f64>)> {
        vec![(ColumnName::Ema(self.span), ema_of_series(prices, self.span))]
    }
}

/// EMA of an arbitrary series. Used directly by MACD for the signal line.
///
/// Leading `NaN`s stay `NaN`; a `NaN` after the seed yields `NaN` at that
/// position and the recursion resumes from the last defined value.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        let ema = match prev {
            None => v,
            Some(p) => alpha * v + (1.0 - alpha) * p,
        };
        result[i] = ema;
        prev = Some(ema);
    }

    result
}
