//! Relative Strength Index (RSI).
//!
//! Simple rolling means of gains and of absolute losses over `period`
//! price changes (no Wilder smoothing).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → RSI = 100 (flat prices included);
//! avg_gain == 0 → RSI = 0.

use super::rolling::rolling_mean;
use super::Indicator;
use crate::domain::ColumnName;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn outputs(&self) -> Vec<ColumnName> {
        vec![ColumnName::Rsi(self.period)]
    }

    fn compute(&self, prices: &[f64]) -> Vec<(ColumnName, Vec<f64>)> {
        let n = prices.len();
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];
        for i in 1..n {
            let change = prices[i] - prices[i - 1];
            if change.is_nan() {
                continue;
            }
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        let rsi = avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| compute_rsi(g, l))
            .collect();

        vec![(ColumnName::Rsi(self.period), rsi)]
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        return f64::NAN;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
        Rsi::new(period).compute(prices).remove(0).1
    }

    #[test]
    fn rsi_all_gains() {
        let r = rsi(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(r[..3].iter().all(|v| v.is_nan()));
        assert_approx(r[3], 100.0, DEFAULT_EPSILON);
        assert_approx(r[4], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_all_losses() {
        let r = rsi(&[14.0, 13.0, 12.0, 11.0, 10.0], 3);
        assert_approx(r[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_flat_prices_is_100() {
        let r = rsi(&[5.0; 6], 3);
        assert_approx(r[5], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_simple_means() {
        // Changes: +2, -1, +1 → avg gain 1, avg loss 1/3 → RS 3 → RSI 75
        let r = rsi(&[10.0, 12.0, 11.0, 12.0], 3);
        assert_approx(r[3], 75.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_window_slides() {
        // Changes: +2, -1, +1, -2 → window at 4 is [-1, +1, -2]
        // avg gain 1/3, avg loss 1 → RS 1/3 → RSI 25
        let r = rsi(&[10.0, 12.0, 11.0, 12.0, 10.0], 3);
        assert_approx(r[4], 25.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_default_first_value_at_14() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let r = rsi(&prices, 14);
        assert!(r[13].is_nan());
        assert!(!r[14].is_nan());
        assert_eq!(Rsi::default().lookback(), 14);
    }
}
