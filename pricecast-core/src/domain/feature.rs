//! Assembled feature matrix and its rows.

use super::column::ColumnName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dated row of features. Never contains missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub values: BTreeMap<ColumnName, f64>,
}

impl FeatureRow {
    pub fn get(&self, name: &ColumnName) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Row-major feature matrix with a fixed column order.
///
/// Every value is finite; the assembler guarantees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    dates: Vec<NaiveDate>,
    columns: Vec<ColumnName>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        columns: Vec<ColumnName>,
        rows: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(dates.len(), rows.len());
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            dates,
            columns,
            rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_values(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn row(&self, index: usize) -> Option<FeatureRow> {
        let values = self.rows.get(index)?;
        Some(FeatureRow {
            date: self.dates[index],
            values: self.columns.iter().cloned().zip(values.iter().copied()).collect(),
        })
    }

    /// Column-major copy of one feature.
    pub fn column(&self, name: &ColumnName) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Split into `[0, at)` and `[at, len)` row ranges.
    pub fn split_at(&self, at: usize) -> (FeatureMatrix, FeatureMatrix) {
        let at = at.min(self.len());
        let head = Self {
            dates: self.dates[..at].to_vec(),
            columns: self.columns.clone(),
            rows: self.rows[..at].to_vec(),
        };
        let tail = Self {
            dates: self.dates[at..].to_vec(),
            columns: self.columns.clone(),
            rows: self.rows[at..].to_vec(),
        };
        (head, tail)
    }

    /// Number of non-finite cells. Zero for any matrix built by the assembler.
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.iter())
            .filter(|v| !v.is_finite())
            .count()
    }
}
