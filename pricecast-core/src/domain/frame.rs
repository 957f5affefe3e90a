//! Date-keyed table of numeric columns.

use super::column::{ColumnName, SchemaError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A single dated value of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Rectangular table keyed by date. Missing cells are `NaN`.
///
/// Before cleaning, dates may repeat or be out of order; after
/// [`clean`](crate::data::clean) they are strictly increasing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<ColumnName, Vec<f64>>,
}

impl Frame {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: BTreeMap::new(),
        }
    }

    /// Outer-join several series on date. Dates absent from a series become
    /// missing cells; a date repeated within one series keeps its last value.
    pub fn align(series: Vec<(ColumnName, Vec<Observation>)>) -> Self {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, obs)| obs.iter().map(|o| o.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut frame = Self::new(dates);
        for (name, obs) in series {
            let by_date: HashMap<NaiveDate, f64> =
                obs.iter().map(|o| (o.date, o.value)).collect();
            let values = frame
                .dates
                .iter()
                .map(|d| by_date.get(d).copied().unwrap_or(f64::NAN))
                .collect();
            frame.columns.insert(name, values);
        }
        frame
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_column(mut self, name: ColumnName, values: Vec<f64>) -> Result<Self, SchemaError> {
        self.insert(name, values)?;
        Ok(self)
    }

    /// Insert or replace a column. Its length must match the date axis.
    pub fn insert(&mut self, name: ColumnName, values: Vec<f64>) -> Result<(), SchemaError> {
        if values.len() != self.dates.len() {
            return Err(SchemaError::LengthMismatch {
                column: name.to_string(),
                expected: self.dates.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn remove(&mut self, name: &ColumnName) -> Option<Vec<f64>> {
        self.columns.remove(name)
    }

    pub fn column(&self, name: &ColumnName) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Like [`column`](Self::column) but missing columns are a schema error.
    pub fn require(&self, name: &ColumnName) -> Result<&[f64], SchemaError> {
        self.column(name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    }

    pub fn contains(&self, name: &ColumnName) -> bool {
        self.columns.contains_key(name)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &ColumnName> {
        self.columns.keys()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&ColumnName, &[f64])> {
        self.columns.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Mutable access to every column, used by in-place cleaning passes.
    pub(crate) fn columns_mut(&mut self) -> impl Iterator<Item = (&ColumnName, &mut Vec<f64>)> {
        self.columns.iter_mut()
    }

    /// Insert a column computed from this frame's own date axis.
    pub(crate) fn put(&mut self, name: ColumnName, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.dates.len());
        self.columns.insert(name, values);
    }

    /// A frame with the same date axis and no columns.
    pub fn empty_like(&self) -> Self {
        Self::new(self.dates.clone())
    }

    /// Move every column of `other` into `self`. Both frames must share the
    /// same date axis; columns in `other` replace same-named ones.
    pub fn merge(&mut self, other: Frame) -> Result<(), SchemaError> {
        if other.dates != self.dates {
            return Err(SchemaError::DateMismatch);
        }
        self.columns.extend(other.columns);
        Ok(())
    }

    /// New frame with the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        let dates = rows.iter().map(|&i| self.dates[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| (name.clone(), rows.iter().map(|&i| values[i]).collect()))
            .collect();
        Self { dates, columns }
    }

    /// The column as observations, skipping missing cells.
    pub fn observations(&self, name: &ColumnName) -> Option<Vec<Observation>> {
        let values = self.column(name)?;
        Some(
            self.dates
                .iter()
                .zip(values)
                .filter(|(_, v)| !v.is_nan())
                .map(|(&date, &value)| Observation { date, value })
                .collect(),
        )
    }

    /// Count of missing (`NaN` or infinite) cells in a column.
    pub fn missing_count(&self, name: &ColumnName) -> Option<usize> {
        self.column(name)
            .map(|values| values.iter().filter(|v| !v.is_finite()).count())
    }
}
