//! Feature matrix export: Polars `DataFrame`, Parquet and CSV.
//!
//! Column order is `date`, the features in matrix order, then the target.

use crate::domain::ColumnName;
use crate::features::AssembledFeatures;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("polars error: {0}")]
    Polars(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("unsupported export format for '{0}' (expected .parquet or .csv)")]
    UnsupportedFormat(String),
}

/// Feature rows plus target as a `DataFrame` with a `Date`-typed key column.
pub fn to_dataframe(features: &AssembledFeatures, target: &ColumnName) -> Result<DataFrame, ExportError> {
    let matrix = &features.matrix;
    let days: Vec<i32> = matrix.dates().iter().map(|d| epoch_days(*d)).collect();

    let mut columns = Vec::with_capacity(matrix.width() + 2);
    columns.push(
        Column::new("date".into(), days)
            .cast(&DataType::Date)
            .map_err(|e| ExportError::Polars(format!("date cast: {e}")))?,
    );
    for (i, name) in matrix.columns().iter().enumerate() {
        let values: Vec<f64> = matrix.rows().iter().map(|r| r[i]).collect();
        columns.push(Column::new(name.to_string().into(), values));
    }
    columns.push(Column::new(target.to_string().into(), features.target.clone()));

    DataFrame::new(columns).map_err(|e| ExportError::Polars(format!("dataframe creation: {e}")))
}

pub fn write_parquet(
    features: &AssembledFeatures,
    target: &ColumnName,
    path: &Path,
) -> Result<(), ExportError> {
    let mut df = to_dataframe(features, target)?;
    let file = fs::File::create(path)?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| ExportError::Polars(format!("write parquet: {e}")))?;
    Ok(())
}

pub fn write_csv(features: &AssembledFeatures, target: &ColumnName, path: &Path) -> Result<(), ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv(e.to_string());
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;

    let mut header = vec!["date".to_string()];
    header.extend(features.matrix.columns().iter().map(|c| c.to_string()));
    header.push(target.to_string());
    wtr.write_record(&header).map_err(csv_err)?;

    for (i, row) in features.matrix.rows().iter().enumerate() {
        let mut record = Vec::with_capacity(row.len() + 2);
        record.push(features.matrix.dates()[i].to_string());
        record.extend(row.iter().map(|v| v.to_string()));
        record.push(features.target[i].to_string());
        wtr.write_record(&record).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write by file extension: `.parquet` or `.csv`.
pub fn write_features(
    features: &AssembledFeatures,
    target: &ColumnName,
    path: &Path,
) -> Result<(), ExportError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("parquet") => write_parquet(features, target, path),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => write_csv(features, target, path),
        _ => Err(ExportError::UnsupportedFormat(path.display().to_string())),
    }
}

fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frame;
    use crate::features::assemble;

    fn assembled() -> AssembledFeatures {
        let d = |day| NaiveDate::from_ymd_opt(2024, 4, day).unwrap();
        let frame = Frame::new(vec![d(1), d(2), d(3)])
            .with_column(ColumnName::Lag(1), vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_column(ColumnName::Rsi(14), vec![40.0, 50.0, 60.0])
            .unwrap()
            .with_column(ColumnName::Target(1), vec![2.0, 3.0, f64::NAN])
            .unwrap();
        assemble(&frame, &ColumnName::Target(1)).unwrap()
    }

    #[test]
    fn epoch_offset() {
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1);
    }

    #[test]
    fn dataframe_layout() {
        let df = to_dataframe(&assembled(), &ColumnName::Target(1)).unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["date", "rsi_14", "price_lag_1", "target_1d"]);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn parquet_round_trip_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.parquet");
        write_features(&assembled(), &ColumnName::Target(1), &path).unwrap();

        let file = fs::File::open(&path).unwrap();
        let df = ParquetReader::new(file).finish().unwrap();
        assert_eq!(df.shape(), (2, 4));
    }

    #[test]
    fn csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        write_features(&assembled(), &ColumnName::Target(1), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,rsi_14,price_lag_1,target_1d");
        assert_eq!(lines[1], "2024-04-01,40,1,2");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = write_features(&assembled(), &ColumnName::Target(1), Path::new("out.xlsx")).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(_)));
    }
}
