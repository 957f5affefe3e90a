//! IndicatorEngine: runs a fixed set of indicators over one price column.

use crate::domain::{ColumnName, Frame, SchemaError};
use crate::indicators::{Bollinger, Ema, Indicator, Macd, Rsi, Sma, Stochastic};
use rayon::prelude::*;
use tracing::debug;

pub const SMA_WINDOWS: [usize; 4] = [7, 14, 20, 30];
pub const EMA_SPANS: [usize; 3] = [7, 14, 21];

/// A set of indicators computed together over a price series.
pub struct IndicatorEngine {
    indicators: Vec<Box<dyn Indicator>>,
}

impl IndicatorEngine {
    pub fn new(indicators: Vec<Box<dyn Indicator>>) -> Self {
        Self { indicators }
    }

    /// SMA {7,14,20,30}, EMA {7,14,21}, Bollinger(20, 2), RSI(14),
    /// MACD(12, 26, 9), Stochastic(14, 3).
    pub fn standard() -> Self {
        let mut indicators: Vec<Box<dyn Indicator>> = Vec::new();
        for w in SMA_WINDOWS {
            indicators.push(Box::new(Sma::new(w)));
        }
        for s in EMA_SPANS {
            indicators.push(Box::new(Ema::new(s)));
        }
        indicators.push(Box::new(Bollinger::default()));
        indicators.push(Box::new(Rsi::default()));
        indicators.push(Box::new(Macd::default()));
        indicators.push(Box::new(Stochastic::default()));
        Self::new(indicators)
    }

    pub fn indicators(&self) -> &[Box<dyn Indicator>] {
        &self.indicators
    }

    /// Rows needed before every indicator column is defined.
    pub fn warmup(&self) -> usize {
        self.indicators
            .iter()
            .map(|ind| ind.lookback())
            .max()
            .unwrap_or(0)
    }

    /// Every column the engine produces.
    pub fn outputs(&self) -> Vec<ColumnName> {
        self.indicators.iter().flat_map(|ind| ind.outputs()).collect()
    }

    /// Indicator columns only, on the input's date axis.
    pub fn compute_columns(&self, frame: &Frame, price: &ColumnName) -> Result<Frame, SchemaError> {
        let prices = frame.require(price)?;

        let computed: Vec<Vec<(ColumnName, Vec<f64>)>> = self
            .indicators
            .par_iter()
            .map(|ind| ind.compute(prices))
            .collect();

        let mut out = frame.empty_like();
        for (name, values) in computed.into_iter().flatten() {
            out.put(name, values);
        }
        debug!(
            indicators = self.indicators.len(),
            columns = out.width(),
            warmup = self.warmup(),
            "computed indicators"
        );
        Ok(out)
    }

    /// The input frame with indicator columns appended. The price column is
    /// left unchanged.
    pub fn compute_indicators(&self, frame: &Frame, price: &ColumnName) -> Result<Frame, SchemaError> {
        let columns = self.compute_columns(frame, price)?;
        let mut out = frame.clone();
        out.merge(columns)?;
        Ok(out)
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for IndicatorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.indicators.iter().map(|ind| ind.name()))
            .finish()
    }
}

/// [`IndicatorEngine::standard`] applied to one frame.
pub fn compute_indicators(frame: &Frame, price: &ColumnName) -> Result<Frame, SchemaError> {
    IndicatorEngine::standard().compute_indicators(frame, price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame(prices: Vec<f64>) -> Frame {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..prices.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        Frame::new(dates)
            .with_column(ColumnName::raw("price").unwrap(), prices)
            .unwrap()
    }

    #[test]
    fn standard_set_produces_expected_columns() {
        let engine = IndicatorEngine::standard();
        let outputs = engine.outputs();
        assert_eq!(outputs.len(), 4 + 3 + 5 + 1 + 3 + 2);
        assert!(outputs.contains(&ColumnName::Sma(30)));
        assert!(outputs.contains(&ColumnName::Ema(21)));
        assert!(outputs.contains(&ColumnName::Rsi(14)));
        assert!(outputs.contains(&ColumnName::StochasticD));
        assert_eq!(engine.warmup(), 29);
    }

    #[test]
    fn price_column_is_unchanged() {
        let prices: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
        let f = frame(prices.clone());
        let price = ColumnName::raw("price").unwrap();
        let out = compute_indicators(&f, &price).unwrap();
        assert_eq!(out.column(&price).unwrap(), prices.as_slice());
        assert_eq!(out.width(), 1 + 18);
        assert_eq!(out.len(), 40);
    }

    #[test]
    fn sma_30_only_on_last_row_of_30() {
        let f = frame((0..30).map(|i| 100.0 + i as f64).collect());
        let out = compute_indicators(&f, &ColumnName::raw("price").unwrap()).unwrap();
        let sma = out.column(&ColumnName::Sma(30)).unwrap();
        assert!(sma[..29].iter().all(|v| v.is_nan()));
        assert!((sma[29] - 114.5).abs() < 1e-10);
    }

    #[test]
    fn missing_price_column_is_error() {
        let f = frame(vec![1.0, 2.0]);
        let err = compute_indicators(&f, &ColumnName::raw("coal_price").unwrap()).unwrap_err();
        assert_eq!(err, SchemaError::MissingColumn("coal_price".into()));
    }

    #[test]
    fn custom_engine() {
        let engine = IndicatorEngine::new(vec![Box::new(Sma::new(2))]);
        let out = engine
            .compute_columns(&frame(vec![1.0, 3.0]), &ColumnName::raw("price").unwrap())
            .unwrap();
        assert_eq!(out.column(&ColumnName::Sma(2)).unwrap()[1], 2.0);
        assert_eq!(out.width(), 1);
    }
}
