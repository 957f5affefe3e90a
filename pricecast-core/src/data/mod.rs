//! Data cleaning

pub mod cleaner;

pub use cleaner::{clean, iqr_bounds, CleaningReport, IqrBounds};
