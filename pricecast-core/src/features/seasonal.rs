//! SeasonalEncoder: calendar features and their cyclic encodings.

use crate::domain::{ColumnName, Frame};
use chrono::{Datelike, NaiveDate};
use std::f64::consts::TAU;

pub const MONTH_PERIOD: f64 = 12.0;
pub const DAY_OF_WEEK_PERIOD: f64 = 7.0;

/// Calendar columns only, on the input's date axis.
///
/// Day of week counts from Monday = 0. Week of year is the ISO week.
pub fn calendar_columns(frame: &Frame) -> Frame {
    let dates = frame.dates();
    let mut out = frame.empty_like();

    let month: Vec<f64> = dates.iter().map(|d| d.month() as f64).collect();
    let dow: Vec<f64> = dates
        .iter()
        .map(|d| d.weekday().num_days_from_monday() as f64)
        .collect();

    out.put(ColumnName::Year, map(dates, |d| d.year() as f64));
    out.put(ColumnName::Day, map(dates, |d| d.day() as f64));
    out.put(ColumnName::DayOfYear, map(dates, |d| d.ordinal() as f64));
    out.put(ColumnName::WeekOfYear, map(dates, |d| d.iso_week().week() as f64));
    out.put(ColumnName::Quarter, map(dates, |d| ((d.month() - 1) / 3 + 1) as f64));

    out.put(ColumnName::MonthSin, cyclic(&month, MONTH_PERIOD, f64::sin));
    out.put(ColumnName::MonthCos, cyclic(&month, MONTH_PERIOD, f64::cos));
    out.put(ColumnName::DayOfWeekSin, cyclic(&dow, DAY_OF_WEEK_PERIOD, f64::sin));
    out.put(ColumnName::DayOfWeekCos, cyclic(&dow, DAY_OF_WEEK_PERIOD, f64::cos));
    out.put(ColumnName::Month, month);
    out.put(ColumnName::DayOfWeek, dow);

    out
}

/// The input frame with calendar columns appended.
pub fn encode(frame: &Frame) -> Frame {
    let mut out = frame.clone();
    for (name, values) in calendar_columns(frame).columns() {
        out.put(name.clone(), values.to_vec());
    }
    out
}

fn map(dates: &[NaiveDate], f: impl Fn(&NaiveDate) -> f64) -> Vec<f64> {
    dates.iter().map(f).collect()
}

fn cyclic(values: &[f64], period: f64, f: fn(f64) -> f64) -> Vec<f64> {
    values.iter().map(|x| f(TAU * x / period)).collect()
}
