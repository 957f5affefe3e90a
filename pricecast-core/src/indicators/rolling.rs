//! Trailing rolling-window primitives shared by the indicators and the lag
//! builder.
//!
//! Every function returns a vector of the input's length. Position `i` holds
//! the statistic over `values[i + 1 - window..=i]`, or `NaN` while the window
//! is not yet full or contains a `NaN`.

/// Rolling arithmetic mean.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_in_window = false;
    for &v in values.iter().take(window) {
        if v.is_nan() {
            nan_in_window = true;
        }
        sum += v;
    }
    if !nan_in_window {
        result[window - 1] = sum / window as f64;
    }

    for i in window..n {
        let leaving = values[i - window];
        let entering = values[i];

        if entering.is_nan() || leaving.is_nan() || nan_in_window {
            // Running sum is poisoned; rescan the window.
            nan_in_window = false;
            sum = 0.0;
            for &v in &values[(i + 1 - window)..=i] {
                if v.is_nan() {
                    nan_in_window = true;
                }
                sum += v;
            }
            if nan_in_window {
                continue;
            }
        } else {
            sum = sum - leaving + entering;
        }

        result[i] = sum / window as f64;
    }

    result
}

/// Rolling sample standard deviation (divides by `window - 1`).
/// A window of 1 has no sample spread and yields `NaN`.
///
/// Deviations are taken from the window's first value, so a flat window is
/// exactly `0.0` no matter what preceded it.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &values[(i + 1 - window)..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let pivot = slice[0];
        let mean = slice.iter().map(|v| v - pivot).sum::<f64>() / window as f64;
        let var = slice
            .iter()
            .map(|v| {
                let d = v - pivot - mean;
                d * d
            })
            .sum::<f64>()
            / (window - 1) as f64;
        result[i] = var.max(0.0).sqrt();
    }

    result
}

/// Rolling minimum.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_fold(values, window, f64::min)
}

/// Rolling maximum.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_fold(values, window, f64::max)
}

fn rolling_fold(values: &[f64], window: usize, f: fn(f64, f64) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &values[(i + 1 - window)..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = slice.iter().copied().reduce(f).unwrap_or(f64::NAN);
    }

    result
}

/// `values[i - periods]`, `NaN` for the first `periods` positions.
pub fn shift(values: &[f64], periods: usize) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| if i >= periods { values[i - periods] } else { f64::NAN })
        .collect()
}

/// `values[i + periods]`, `NaN` for the last `periods` positions.
pub fn lead(values: &[f64], periods: usize) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| values.get(i + periods).copied().unwrap_or(f64::NAN))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn mean_basic() {
        let r = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);
        assert!(r[..4].iter().all(|v| v.is_nan()));
        assert_approx(r[4], 12.0, DEFAULT_EPSILON);
        assert_approx(r[5], 13.0, DEFAULT_EPSILON);
        assert_approx(r[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn mean_nan_propagation() {
        let r = rolling_mean(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0], 3);
        assert!(r[2].is_nan());
        assert!(r[3].is_nan());
        assert!(r[4].is_nan());
        assert_approx(r[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn mean_too_short() {
        assert!(rolling_mean(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn std_is_sample_std() {
        // [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, sum sq dev 32, sample var 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let r = rolling_std(&values, 8);
        assert_approx(r[7], (32.0_f64 / 7.0).sqrt(), 1e-12);
    }

    #[test]
    fn std_of_constant_is_zero() {
        let r = rolling_std(&[3.0; 5], 3);
        assert_eq!(r[4], 0.0);
    }

    #[test]
    fn flat_window_after_varied_history_is_exactly_zero() {
        let mut values = vec![0.3, 7.1, 0.7, 2.9, 5.5, 0.1, 9.3, 4.4];
        values.extend([0.1; 6]);
        let r = rolling_std(&values, 5);
        assert_eq!(r[12], 0.0);
        assert_eq!(r[13], 0.0);
        assert!(r[11] > 0.0);
    }

    #[test]
    fn min_max_track_window() {
        let values = [5.0, 1.0, 4.0, 2.0, 8.0];
        let lo = rolling_min(&values, 3);
        let hi = rolling_max(&values, 3);
        assert_eq!(&lo[2..], &[1.0, 1.0, 2.0]);
        assert_eq!(&hi[2..], &[5.0, 4.0, 8.0]);
    }

    #[test]
    fn shift_and_lead() {
        let values = [1.0, 2.0, 3.0];
        let s = shift(&values, 1);
        assert!(s[0].is_nan());
        assert_eq!(&s[1..], &[1.0, 2.0]);
        let l = lead(&values, 2);
        assert_eq!(l[0], 3.0);
        assert!(l[1].is_nan() && l[2].is_nan());
    }
}
