//! FeatureAssembler: frame → complete feature matrix and target vector.

use crate::domain::{ColumnName, FeatureMatrix, FeatureRow, Frame, SchemaError};
use chrono::NaiveDate;
use tracing::info;

/// Candidate columns missing in more than this fraction of rows are dropped.
pub const MAX_MISSING_FRACTION: f64 = 0.5;

/// Output of [`assemble`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledFeatures {
    /// Rows with every feature and the target present.
    pub matrix: FeatureMatrix,
    /// Target value per matrix row.
    pub target: Vec<f64>,
    /// Candidates removed for excessive missingness.
    pub dropped_columns: Vec<ColumnName>,
    /// Columns considered before the missingness filter.
    pub candidate_count: usize,
    /// Latest row with every kept feature present, whether or not its target
    /// is known. This is the row a forecast is made from.
    pub latest: Option<FeatureRow>,
}

impl AssembledFeatures {
    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.matrix.width()
    }
}

/// Build the training matrix.
///
/// Every column except `target` is a candidate feature. Candidates with a
/// missing fraction above [`MAX_MISSING_FRACTION`] are dropped, then any row
/// with a missing feature or missing target is removed. An empty frame gives
/// an empty result.
pub fn assemble(frame: &Frame, target: &ColumnName) -> Result<AssembledFeatures, SchemaError> {
    if frame.is_empty() {
        return Ok(AssembledFeatures::default());
    }
    let target_values = frame.require(target)?;
    let rows = frame.len();

    let mut kept: Vec<(ColumnName, &[f64])> = Vec::new();
    let mut dropped_columns = Vec::new();
    let mut candidate_count = 0;
    for (name, values) in frame.columns() {
        if name == target {
            continue;
        }
        candidate_count += 1;
        let missing = values.iter().filter(|v| !v.is_finite()).count();
        if missing as f64 / rows as f64 > MAX_MISSING_FRACTION {
            dropped_columns.push(name.clone());
        } else {
            kept.push((name.clone(), values));
        }
    }

    let features_complete = |i: usize| kept.iter().all(|(_, values)| values[i].is_finite());
    let row_values = |i: usize| kept.iter().map(|(_, values)| values[i]).collect::<Vec<f64>>();

    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut matrix_rows = Vec::new();
    let mut target_out = Vec::new();
    let mut latest = None;
    for i in 0..rows {
        if !features_complete(i) {
            continue;
        }
        latest = Some(i);
        if target_values[i].is_finite() {
            dates.push(frame.dates()[i]);
            matrix_rows.push(row_values(i));
            target_out.push(target_values[i]);
        }
    }

    let columns: Vec<ColumnName> = kept.iter().map(|(name, _)| name.clone()).collect();
    let latest = latest.map(|i| FeatureRow {
        date: frame.dates()[i],
        values: columns.iter().cloned().zip(row_values(i)).collect(),
    });

    info!(
        features = columns.len(),
        dropped = dropped_columns.len(),
        rows = target_out.len(),
        input_rows = rows,
        "assembled feature matrix"
    );

    Ok(AssembledFeatures {
        matrix: FeatureMatrix::from_parts(dates, columns, matrix_rows),
        target: target_out,
        dropped_columns,
        candidate_count,
        latest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: f64 = f64::NAN;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn frame() -> Frame {
        Frame::new((1..=6).map(d).collect())
            .with_column(ColumnName::raw("price").unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap()
            .with_column(ColumnName::Lag(1), vec![NAN, 1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .with_column(ColumnName::Sma(30), vec![NAN, NAN, NAN, NAN, 9.0, 9.0])
            .unwrap()
            .with_column(ColumnName::Target(1), vec![2.0, 3.0, 4.0, 5.0, 6.0, NAN])
            .unwrap()
    }

    #[test]
    fn drops_sparse_columns_and_incomplete_rows() {
        let out = assemble(&frame(), &ColumnName::Target(1)).unwrap();

        assert_eq!(out.candidate_count, 3);
        assert_eq!(out.dropped_columns, vec![ColumnName::Sma(30)]);
        assert_eq!(out.feature_count(), 2);
        assert_eq!(out.len(), 4);
        assert_eq!(out.matrix.len(), out.target.len());
        assert_eq!(out.matrix.missing_count(), 0);
        assert_eq!(out.matrix.dates().first(), Some(&d(2)));
        assert_eq!(out.target, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn latest_row_ignores_missing_target() {
        let out = assemble(&frame(), &ColumnName::Target(1)).unwrap();
        let latest = out.latest.unwrap();
        assert_eq!(latest.date, d(6));
        assert_eq!(latest.get(&ColumnName::Lag(1)), Some(5.0));
        assert_eq!(latest.get(&ColumnName::Target(1)), None);
    }

    #[test]
    fn exactly_half_missing_is_kept() {
        let f = Frame::new((1..=4).map(d).collect())
            .with_column(ColumnName::Lag(2), vec![NAN, NAN, 1.0, 2.0])
            .unwrap()
            .with_column(ColumnName::Target(1), vec![1.0, 1.0, 1.0, 1.0])
            .unwrap();
        let out = assemble(&f, &ColumnName::Target(1)).unwrap();
        assert!(out.dropped_columns.is_empty());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn empty_frame_gives_empty_result() {
        let out = assemble(&Frame::default(), &ColumnName::Target(1)).unwrap();
        assert!(out.is_empty());
        assert!(out.latest.is_none());
    }

    #[test]
    fn missing_target_is_schema_error() {
        let f = Frame::new(vec![d(1)])
            .with_column(ColumnName::Lag(1), vec![1.0])
            .unwrap();
        let err = assemble(&f, &ColumnName::Target(1)).unwrap_err();
        assert_eq!(err, SchemaError::MissingColumn("target_1d".into()));
    }
}
