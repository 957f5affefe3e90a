//! Synthetic daily price series for tests and benchmarks.
//!
//! Everything here is fake data: a seeded random walk with optional drift
//! and annual seasonality. This crate is only ever pulled in as a
//! dev-dependency, so production code paths cannot receive synthetic input.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for a synthetic random walk.
#[derive(Debug, Clone)]
pub struct WalkSpec {
    /// Label mixed into the seed, so "price" and "coal_price" differ.
    pub name: String,
    pub start: NaiveDate,
    pub days: usize,
    pub start_price: f64,
    /// Mean daily return.
    pub drift: f64,
    /// Half-range of the uniform daily return shock.
    pub shock: f64,
    /// Amplitude of a yearly sine overlay, as a fraction of price.
    pub seasonal_amplitude: f64,
    /// Skip Saturdays and Sundays.
    pub business_days_only: bool,
    pub seed: u64,
}

impl WalkSpec {
    pub fn new(name: impl Into<String>, days: usize) -> Self {
        Self {
            name: name.into(),
            start: NaiveDate::from_ymd_opt(2023, 1, 2).expect("valid date"),
            days,
            start_price: 100.0,
            drift: 0.0003,
            shock: 0.02,
            seasonal_amplitude: 0.0,
            business_days_only: false,
            seed: 42,
        }
    }

    pub fn starting(mut self, start: NaiveDate) -> Self {
        self.start = start;
        self
    }

    pub fn price(mut self, start_price: f64) -> Self {
        self.start_price = start_price;
        self
    }

    pub fn drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn shock(mut self, shock: f64) -> Self {
        self.shock = shock;
        self
    }

    pub fn seasonal(mut self, amplitude: f64) -> Self {
        self.seasonal_amplitude = amplitude;
        self
    }

    pub fn business_days(mut self) -> Self {
        self.business_days_only = true;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A generated series: parallel dates and values.
#[derive(Debug, Clone)]
pub struct SyntheticSeries {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl SyntheticSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Median of the values (NaNs ignored).
    pub fn median(&self) -> f64 {
        let mut sorted: Vec<f64> = self.values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return f64::NAN;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    /// Overwrite the value at `index` with `factor` times the median.
    pub fn plant_outlier(&mut self, index: usize, factor: f64) -> f64 {
        let value = self.median() * factor;
        self.values[index] = value;
        value
    }
}

/// Generate a random walk. The seed is derived from `seed` and `name`
/// through BLAKE3, so the same spec always yields the same series.
pub fn random_walk(spec: &WalkSpec) -> SyntheticSeries {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&spec.seed.to_le_bytes());
    hasher.update(spec.name.as_bytes());
    let seed: [u8; 32] = *hasher.finalize().as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut dates = Vec::with_capacity(spec.days);
    let mut values = Vec::with_capacity(spec.days);
    let mut level = spec.start_price;
    let mut current = spec.start;

    while dates.len() < spec.days {
        let weekday = current.weekday();
        if spec.business_days_only && (weekday == Weekday::Sat || weekday == Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = spec.drift + rng.gen_range(-spec.shock..=spec.shock);
        level = (level * (1.0 + daily_return)).max(0.01);

        let phase = 2.0 * std::f64::consts::PI * current.ordinal0() as f64 / 365.0;
        let seasonal = 1.0 + spec.seasonal_amplitude * phase.sin();

        dates.push(current);
        values.push(level * seasonal);
        current += Duration::days(1);
    }

    SyntheticSeries {
        name: spec.name.clone(),
        dates,
        values,
    }
}

/// A commodity basket aligned on the same calendar: a target `price` plus
/// independent `iron_ore_price`, `coal_price` and `usd_mxn_rate` series.
pub fn commodity_basket(days: usize, seed: u64) -> Vec<SyntheticSeries> {
    let base = WalkSpec::new("price", days).price(850.0).seasonal(0.03).seed(seed);
    let price = random_walk(&base);
    let iron = random_walk(&WalkSpec::new("iron_ore_price", days).price(110.0).seed(seed));
    let coal = random_walk(&WalkSpec::new("coal_price", days).price(140.0).shock(0.03).seed(seed));
    let fx = random_walk(
        &WalkSpec::new("usd_mxn_rate", days)
            .price(17.5)
            .drift(0.0)
            .shock(0.005)
            .seed(seed),
    );
    vec![price, iron, coal, fx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_spec_same_series() {
        let spec = WalkSpec::new("price", 50);
        let a = random_walk(&spec);
        let b = random_walk(&spec);
        assert_eq!(a.values, b.values);
        assert_eq!(a.dates, b.dates);
    }

    #[test]
    fn name_changes_series() {
        let a = random_walk(&WalkSpec::new("price", 50));
        let b = random_walk(&WalkSpec::new("coal_price", 50));
        assert_ne!(a.values, b.values);
    }

    #[test]
    fn dates_strictly_increasing() {
        let s = random_walk(&WalkSpec::new("price", 120).business_days());
        assert_eq!(s.len(), 120);
        assert!(s.dates.windows(2).all(|w| w[0] < w[1]));
        assert!(s
            .dates
            .iter()
            .all(|d| d.weekday() != Weekday::Sat && d.weekday() != Weekday::Sun));
    }

    #[test]
    fn plant_outlier_uses_median() {
        let mut s = random_walk(&WalkSpec::new("price", 101));
        let median = s.median();
        let planted = s.plant_outlier(10, 10.0);
        assert!((planted - 10.0 * median).abs() < 1e-9);
        assert_eq!(s.values[10], planted);
    }

    #[test]
    fn basket_is_aligned() {
        let basket = commodity_basket(60, 7);
        assert_eq!(basket.len(), 4);
        for s in &basket {
            assert_eq!(s.dates, basket[0].dates);
            assert!(s.values.iter().all(|v| *v > 0.0));
        }
    }
}
