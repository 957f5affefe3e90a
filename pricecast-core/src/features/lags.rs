//! LagFeatureBuilder: shifted prices, percent changes, rolling volatility.
//!
//! Leading rows without enough history stay missing; the assembler drops
//! them.

use crate::domain::{ColumnName, Frame, SchemaError};
use crate::indicators::rolling::{rolling_std, shift};
use serde::{Deserialize, Serialize};

/// Horizons for the lag builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagConfig {
    pub lags: Vec<usize>,
    pub pct_changes: Vec<usize>,
    pub volatility_windows: Vec<usize>,
}

impl Default for LagConfig {
    fn default() -> Self {
        Self {
            lags: vec![1, 2, 3, 7, 14, 30],
            pct_changes: vec![1, 7, 14, 30],
            volatility_windows: vec![7, 14, 30],
        }
    }
}

impl LagConfig {
    /// Rows needed before every lag column is defined.
    pub fn warmup(&self) -> usize {
        let lag = self.lags.iter().copied().max().unwrap_or(0);
        let pct = self.pct_changes.iter().copied().max().unwrap_or(0);
        let vol = self
            .volatility_windows
            .iter()
            .map(|w| w.saturating_sub(1))
            .max()
            .unwrap_or(0);
        lag.max(pct).max(vol)
    }

    pub fn outputs(&self) -> Vec<ColumnName> {
        self.lags
            .iter()
            .map(|&l| ColumnName::Lag(l))
            .chain(self.pct_changes.iter().map(|&h| ColumnName::PctChange(h)))
            .chain(self.volatility_windows.iter().map(|&w| ColumnName::Volatility(w)))
            .collect()
    }
}

/// Lag columns only, on the input's date axis.
pub fn lag_columns(frame: &Frame, price: &ColumnName, config: &LagConfig) -> Result<Frame, SchemaError> {
    let prices = frame.require(price)?;
    let mut out = frame.empty_like();

    for &l in &config.lags {
        out.put(ColumnName::Lag(l), shift(prices, l));
    }
    for &h in &config.pct_changes {
        out.put(ColumnName::PctChange(h), pct_change(prices, h));
    }
    for &w in &config.volatility_windows {
        out.put(ColumnName::Volatility(w), rolling_std(prices, w));
    }

    Ok(out)
}

/// The input frame with lag columns appended.
pub fn add_lags(frame: &Frame, price: &ColumnName, config: &LagConfig) -> Result<Frame, SchemaError> {
    let columns = lag_columns(frame, price, config)?;
    let mut out = frame.clone();
    out.merge(columns)?;
    Ok(out)
}

/// `(p[t] - p[t-h]) / p[t-h]`. A zero or missing base gives `NaN`.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<f64> {
    let base = shift(values, periods);
    values
        .iter()
        .zip(&base)
        .map(|(&p, &b)| {
            if b == 0.0 || b.is_nan() || p.is_nan() {
                f64::NAN
            } else {
                (p - b) / b
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn price() -> ColumnName {
        ColumnName::raw("price").unwrap()
    }

    fn frame(prices: Vec<f64>) -> Frame {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let dates = (0..prices.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        Frame::new(dates).with_column(price(), prices).unwrap()
    }

    #[test]
    fn lags_shift_prices() {
        let config = LagConfig {
            lags: vec![1, 2],
            pct_changes: vec![],
            volatility_windows: vec![],
        };
        let out = add_lags(&frame(vec![1.0, 2.0, 3.0]), &price(), &config).unwrap();
        let lag1 = out.column(&ColumnName::Lag(1)).unwrap();
        let lag2 = out.column(&ColumnName::Lag(2)).unwrap();
        assert!(lag1[0].is_nan());
        assert_eq!(&lag1[1..], &[1.0, 2.0]);
        assert!(lag2[1].is_nan());
        assert_eq!(lag2[2], 1.0);
    }

    #[test]
    fn pct_change_basic_and_zero_base() {
        let r = pct_change(&[100.0, 110.0, 0.0, 5.0], 1);
        assert!(r[0].is_nan());
        assert!((r[1] - 0.1).abs() < 1e-12);
        assert!((r[2] + 1.0).abs() < 1e-12);
        assert!(r[3].is_nan());
    }

    #[test]
    fn volatility_is_rolling_sample_std() {
        let config = LagConfig {
            lags: vec![],
            pct_changes: vec![],
            volatility_windows: vec![3],
        };
        let out = lag_columns(&frame(vec![1.0, 2.0, 3.0, 5.0]), &price(), &config).unwrap();
        let vol = out.column(&ColumnName::Volatility(3)).unwrap();
        assert!(vol[1].is_nan());
        assert!((vol[2] - 1.0).abs() < 1e-12);
        // [2, 3, 5]: mean 10/3, sample var 7/3
        assert!((vol[3] - (7.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn default_config_outputs_and_warmup() {
        let config = LagConfig::default();
        assert_eq!(config.outputs().len(), 6 + 4 + 3);
        assert_eq!(config.warmup(), 30);
        let out = lag_columns(&frame((1..=40).map(f64::from).collect()), &price(), &config).unwrap();
        assert_eq!(out.width(), 13);
        assert!(out.column(&ColumnName::Lag(30)).unwrap()[29].is_nan());
        assert_eq!(out.column(&ColumnName::Lag(30)).unwrap()[30], 1.0);
    }

    #[test]
    fn missing_price_is_error() {
        let err = add_lags(&Frame::default(), &price(), &LagConfig::default()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn(_)));
    }
}
