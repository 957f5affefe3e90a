//! Pricecast Runner: prediction pipeline orchestration.
//!
//! This crate builds on `pricecast-core` to provide:
//! - TOML pipeline configuration with validation and fingerprinting
//! - CSV table loading, multi-source date joins and dataset hashing
//! - The prediction pipeline (clean, features, fit, forecast, confidence)
//! - Serializable prediction reports

pub mod config;
pub mod loader;
pub mod pipeline;
pub mod report;

pub use config::{ConfigError, ForestSettings, PipelineConfig};
pub use loader::{
    compute_dataset_hash, join_tables, load_csv, load_many, read_csv, LoadError, LoadedTable,
};
pub use pipeline::{FeatureSet, PipelineError, PredictionPipeline};
pub use report::{PredictionReport, SCHEMA_VERSION};
