//! CSV table loading.
//!
//! The first column is `date` (`YYYY-MM-DD`); every other column is a named
//! numeric series. Blank cells and `NaN`/`null`/`NA` become missing values.
//! Rows are kept in file order; the cleaner sorts and dedupes them.
//!
//! Several sources (one file per provider, say) are outer-joined on date
//! with [`load_many`].

use chrono::NaiveDate;
use pricecast_core::{ColumnName, Frame, SchemaError};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MISSING_MARKERS: [&str; 5] = ["", "nan", "null", "na", "n/a"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("first column must be 'date', found '{0}'")]
    MissingDateColumn(String),

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("row {row}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}, column '{column}': invalid number '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("column schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("no input tables given")]
    NoInput,
}

/// A loaded table and the BLAKE3 hash of its contents.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub frame: Frame,
    pub dataset_hash: String,
}

pub fn load_csv(path: &Path) -> Result<LoadedTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(file)
}

pub fn read_csv<R: Read>(reader: R) -> Result<LoadedTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut fields = headers.iter();
    match fields.next() {
        Some(first) if first.eq_ignore_ascii_case("date") => {}
        other => return Err(LoadError::MissingDateColumn(other.unwrap_or("").to_string())),
    }

    let mut names = Vec::new();
    let mut seen = BTreeSet::new();
    for field in fields {
        let name = ColumnName::raw(field)?;
        if !seen.insert(name.clone()) {
            return Err(LoadError::DuplicateColumn(field.to_string()));
        }
        names.push(name);
    }

    let mut dates = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = i + 2;

        let raw_date = record.get(0).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| LoadError::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;
        dates.push(date);

        for (c, name) in names.iter().enumerate() {
            let cell = record.get(c + 1).unwrap_or("");
            columns[c].push(parse_cell(cell).ok_or_else(|| LoadError::InvalidNumber {
                row,
                column: name.to_string(),
                value: cell.to_string(),
            })?);
        }
    }

    let mut frame = Frame::new(dates);
    for (name, values) in names.into_iter().zip(columns) {
        frame.insert(name, values)?;
    }

    let dataset_hash = compute_dataset_hash(&frame);
    debug!(rows = frame.len(), columns = frame.width(), hash = %dataset_hash, "loaded table");
    Ok(LoadedTable {
        frame,
        dataset_hash,
    })
}

/// Load one or more tables and outer-join their series on date.
///
/// A single path is loaded as-is. With several, each series keeps only its
/// present cells, dates missing from a source become missing cells, and a
/// date repeated within one series keeps its last value. A series name may
/// appear in only one source.
pub fn load_many(paths: &[PathBuf]) -> Result<LoadedTable, LoadError> {
    match paths {
        [] => Err(LoadError::NoInput),
        [single] => load_csv(single),
        _ => {
            let tables = paths
                .iter()
                .map(|p| load_csv(p))
                .collect::<Result<Vec<_>, _>>()?;
            join_tables(&tables)
        }
    }
}

/// Outer-join the series of several tables on date.
pub fn join_tables(tables: &[LoadedTable]) -> Result<LoadedTable, LoadError> {
    if tables.is_empty() {
        return Err(LoadError::NoInput);
    }

    let mut seen = BTreeSet::new();
    let mut series = Vec::new();
    for table in tables {
        for name in table.frame.column_names() {
            if !seen.insert(name.clone()) {
                return Err(LoadError::DuplicateColumn(name.to_string()));
            }
            let observations = table
                .frame
                .observations(name)
                .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))?;
            series.push((name.clone(), observations));
        }
    }

    let frame = Frame::align(series);
    let dataset_hash = compute_dataset_hash(&frame);
    debug!(
        sources = tables.len(),
        rows = frame.len(),
        columns = frame.width(),
        "joined tables"
    );
    Ok(LoadedTable {
        frame,
        dataset_hash,
    })
}

/// `None` for text that is neither a number nor a missing marker.
fn parse_cell(cell: &str) -> Option<f64> {
    if MISSING_MARKERS.iter().any(|m| cell.eq_ignore_ascii_case(m)) {
        return Some(f64::NAN);
    }
    cell.parse().ok()
}

/// Deterministic BLAKE3 hash over dates and every column, in column order.
pub fn compute_dataset_hash(frame: &Frame) -> String {
    let mut hasher = blake3::Hasher::new();
    for date in frame.dates() {
        hasher.update(date.to_string().as_bytes());
    }
    for (name, values) in frame.columns() {
        hasher.update(name.to_string().as_bytes());
        for v in values {
            hasher.update(&v.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
