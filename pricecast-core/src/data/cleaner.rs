//! Cleaner: dedupe, sort, IQR outlier marking, forward/backward fill.
//!
//! Row count is preserved per column so all columns of a frame stay aligned
//! on the same date axis. Outliers are not dropped, they are marked missing
//! and then filled from their in-bound neighbours.

use crate::domain::{ColumnName, Frame};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Tukey fence multiplier.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// What the cleaner changed, per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub duplicates_removed: usize,
    pub outliers: BTreeMap<ColumnName, usize>,
    pub filled: BTreeMap<ColumnName, usize>,
    /// Columns with IQR = 0, where outlier marking was skipped.
    pub degenerate: Vec<ColumnName>,
}

impl CleaningReport {
    pub fn total_outliers(&self) -> usize {
        self.outliers.values().sum()
    }
}

/// Inclusive outlier bounds for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Zero-variance column: bounds collapse to a point.
    pub fn is_degenerate(&self) -> bool {
        self.iqr() == 0.0
    }
}

/// Clean a frame. Empty frames come back unchanged.
pub fn clean(frame: &Frame) -> (Frame, CleaningReport) {
    let mut report = CleaningReport {
        input_rows: frame.len(),
        ..Default::default()
    };

    if frame.is_empty() {
        return (frame.clone(), report);
    }

    let rows = dedupe_sorted_rows(frame.dates());
    report.duplicates_removed = frame.len() - rows.len();
    let mut out = frame.take_rows(&rows);
    report.output_rows = out.len();

    for (name, values) in out.columns_mut() {
        for v in values.iter_mut() {
            if v.is_infinite() {
                *v = f64::NAN;
            }
        }

        match iqr_bounds(values) {
            Some(bounds) if bounds.is_degenerate() => {
                debug!(column = %name, value = bounds.q1, "degenerate column, skipping outlier marking");
                report.degenerate.push(name.clone());
            }
            Some(bounds) => {
                let marked = mark_outliers(values, &bounds);
                if marked > 0 {
                    report.outliers.insert(name.clone(), marked);
                }
            }
            None => {}
        }

        let filled = forward_fill(values) + backward_fill(values);
        if filled > 0 {
            report.filled.insert(name.clone(), filled);
        }
    }

    debug!(
        rows = report.output_rows,
        duplicates = report.duplicates_removed,
        outliers = report.total_outliers(),
        "cleaned frame"
    );

    (out, report)
}

/// Row indices to keep: the last occurrence of each date, in ascending
/// date order.
fn dedupe_sorted_rows(dates: &[NaiveDate]) -> Vec<usize> {
    let mut last: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (i, date) in dates.iter().enumerate() {
        last.insert(*date, i);
    }
    last.into_values().collect()
}

/// Linear-interpolated quantile of a sorted, NaN-free slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Q1/Q3 fences over the non-missing values, or `None` if all are missing.
pub fn iqr_bounds(values: &[f64]) -> Option<IqrBounds> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    Some(IqrBounds {
        q1,
        q3,
        lower: q1 - IQR_MULTIPLIER * iqr,
        upper: q3 + IQR_MULTIPLIER * iqr,
    })
}

/// Replace out-of-bound values with `NaN`. Returns how many were marked.
pub fn mark_outliers(values: &mut [f64], bounds: &IqrBounds) -> usize {
    let mut marked = 0;
    for v in values.iter_mut() {
        if !v.is_nan() && !bounds.contains(*v) {
            *v = f64::NAN;
            marked += 1;
        }
    }
    marked
}

/// Carry the last seen value forward over `NaN` gaps. Returns cells filled.
pub fn forward_fill(values: &mut [f64]) -> usize {
    let mut last = f64::NAN;
    let mut filled = 0;
    for v in values.iter_mut() {
        if v.is_nan() {
            if !last.is_nan() {
                *v = last;
                filled += 1;
            }
        } else {
            last = *v;
        }
    }
    filled
}

/// Fill leading `NaN`s from the first present value. Returns cells filled.
pub fn backward_fill(values: &mut [f64]) -> usize {
    let mut next = f64::NAN;
    let mut filled = 0;
    for v in values.iter_mut().rev() {
        if v.is_nan() {
            if !next.is_nan() {
                *v = next;
                filled += 1;
            }
        } else {
            next = *v;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn price() -> ColumnName {
        ColumnName::raw("price").unwrap()
    }

    #[test]
    fn quantile_matches_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        // pos = 0.25 * 3 = 0.75 → 1 + 0.75
        assert!((quantile_sorted(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile_sorted(&[5.0], 0.75), 5.0);
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn dedupe_keeps_last_and_sorts() {
        let frame = Frame::new(vec![d(3), d(1), d(2), d(1)])
            .with_column(price(), vec![30.0, 10.0, 20.0, 11.0])
            .unwrap();
        let (out, report) = clean(&frame);

        assert_eq!(out.dates(), &[d(1), d(2), d(3)]);
        assert_eq!(out.column(&price()).unwrap(), &[11.0, 20.0, 30.0]);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.input_rows, 4);
        assert_eq!(report.output_rows, 3);
    }

    #[test]
    fn outlier_is_marked_then_forward_filled() {
        let values = vec![10.5, 11.0, 10.5, 500.0, 10.8, 11.2, 10.9, 11.1];
        let dates = (1..=8).map(d).collect();
        let frame = Frame::new(dates).with_column(price(), values).unwrap();
        let (out, report) = clean(&frame);

        let cleaned = out.column(&price()).unwrap();
        assert_eq!(cleaned[3], 10.5);
        assert_eq!(report.outliers.get(&price()), Some(&1));
        assert_eq!(report.filled.get(&price()), Some(&1));
    }

    #[test]
    fn leading_gap_is_backward_filled() {
        let frame = Frame::new(vec![d(1), d(2), d(3)])
            .with_column(price(), vec![f64::NAN, f64::NAN, 7.0])
            .unwrap();
        let (out, _) = clean(&frame);
        assert_eq!(out.column(&price()).unwrap(), &[7.0, 7.0, 7.0]);
    }

    #[test]
    fn constant_column_is_left_alone() {
        let frame = Frame::new(vec![d(1), d(2), d(3), d(4), d(5)])
            .with_column(price(), vec![4.0, 4.0, 4.0, 4.0, 4.0])
            .unwrap();
        let (out, report) = clean(&frame);
        assert_eq!(out.column(&price()).unwrap(), &[4.0; 5]);
        assert_eq!(report.degenerate, vec![price()]);
        assert!(report.outliers.is_empty());
    }

    #[test]
    fn zero_iqr_skips_marking_even_with_spike() {
        // Q1 == Q3 == 4 → IQR = 0, so the spike survives by policy.
        let frame = Frame::new((1..=9).map(d).collect())
            .with_column(price(), vec![4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 9.0])
            .unwrap();
        let (out, report) = clean(&frame);
        assert_eq!(out.column(&price()).unwrap()[8], 9.0);
        assert_eq!(report.degenerate.len(), 1);
    }

    #[test]
    fn infinite_values_become_missing_and_filled() {
        let frame = Frame::new(vec![d(1), d(2), d(3)])
            .with_column(price(), vec![1.0, f64::INFINITY, 1.5])
            .unwrap();
        let (out, _) = clean(&frame);
        assert_eq!(out.column(&price()).unwrap(), &[1.0, 1.0, 1.5]);
    }

    #[test]
    fn all_missing_column_stays_missing() {
        let frame = Frame::new(vec![d(1), d(2)])
            .with_column(price(), vec![f64::NAN, f64::NAN])
            .unwrap();
        let (out, _) = clean(&frame);
        assert!(out.column(&price()).unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn empty_frame_is_returned_unchanged() {
        let frame = Frame::default();
        let (out, report) = clean(&frame);
        assert!(out.is_empty());
        assert_eq!(report.output_rows, 0);
    }

    #[test]
    fn columns_are_cleaned_independently() {
        let coal = ColumnName::raw("coal_price").unwrap();
        let frame = Frame::new((1..=6).map(d).collect())
            .with_column(price(), vec![1.0, 2.0, 3.0, 2.0, 1.0, 2.0])
            .unwrap()
            .with_column(coal.clone(), vec![5.0, 5.1, 5.2, 99.0, 5.1, 5.0])
            .unwrap();
        let (out, report) = clean(&frame);
        assert_eq!(out.column(&price()).unwrap(), &[1.0, 2.0, 3.0, 2.0, 1.0, 2.0]);
        assert_eq!(out.column(&coal).unwrap()[3], 5.2);
        assert!(!report.outliers.contains_key(&price()));
    }
}
