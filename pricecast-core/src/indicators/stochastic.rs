//! Stochastic Oscillator over a close-only series.
//!
//! %K = 100 * (price - min(period)) / (max(period) - min(period))
//! %D = SMA(smoothing) of %K
//! A flat window (max == min) gives %K = 50.
//! Lookback: period - 1 for %K, period + smoothing - 2 for %D.

use super::rolling::{rolling_max, rolling_mean, rolling_min};
use super::Indicator;
use crate::domain::ColumnName;

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    smoothing: usize,
    name: String,
}

impl Stochastic {
    pub fn new(period: usize, smoothing: usize) -> Self {
        assert!(period >= 1, "Stochastic period must be >= 1");
        assert!(smoothing >= 1, "Stochastic smoothing must be >= 1");
        Self {
            period,
            smoothing,
            name: format!("stochastic_{period}_{smoothing}"),
        }
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new(14, 3)
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + self.smoothing - 2
    }

    fn outputs(&self) -> Vec<ColumnName> {
        vec![ColumnName::StochasticK, ColumnName::StochasticD]
    }

    fn compute(&self, prices: &[f64]) -> Vec<(ColumnName, Vec<f64>)> {
        let lo = rolling_min(prices, self.period);
        let hi = rolling_max(prices, self.period);

        let k: Vec<f64> = (0..prices.len())
            .map(|i| {
                let range = hi[i] - lo[i];
                if range.is_nan() || prices[i].is_nan() {
                    f64::NAN
                } else if range == 0.0 {
                    50.0
                } else {
                    (100.0 * (prices[i] - lo[i]) / range).clamp(0.0, 100.0)
                }
            })
            .collect();
        let d = rolling_mean(&k, self.smoothing);

        vec![(ColumnName::StochasticK, k), (ColumnName::StochasticD, d)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn k_at_window_extremes() {
        let out = Stochastic::new(3, 2).compute(&[1.0, 2.0, 3.0, 2.0, 1.0]);
        let k = &out[0].1;
        assert!(k[0].is_nan() && k[1].is_nan());
        assert_approx(k[2], 100.0, DEFAULT_EPSILON);
        // window [2, 3, 2] → (2 - 2) / 1
        assert_approx(k[3], 0.0, DEFAULT_EPSILON);
        assert_approx(k[4], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_window_is_fifty() {
        let out = Stochastic::new(3, 3).compute(&[7.0; 5]);
        assert_approx(out[0].1[4], 50.0, DEFAULT_EPSILON);
        assert_approx(out[1].1[4], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn d_is_mean_of_k() {
        // k = [NaN, NaN, 100, 0, 0] → d(2) = [NaN, NaN, NaN, 50, 0]
        let out = Stochastic::new(3, 2).compute(&[1.0, 2.0, 3.0, 2.0, 1.0]);
        let d = &out[1].1;
        assert!(d[2].is_nan());
        assert_approx(d[3], 50.0, DEFAULT_EPSILON);
        assert_approx(d[4], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn lookback() {
        assert_eq!(Stochastic::default().lookback(), 15);
    }
}
