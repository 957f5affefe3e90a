//! Pricecast Core: feature engine for daily commodity price series.
//!
//! - Typed frame and column schema
//! - Cleaner: dedupe, IQR outlier marking, forward/backward fill
//! - Technical indicators, seasonal encoder, lag builder
//! - Feature assembler producing a complete matrix and target vector
//! - Training profiles and the random forest regressor they configure
//! - Confidence scoring over model fit, data freshness and feature stability
//! - Parquet/CSV export of the assembled matrix

pub mod confidence;
pub mod data;
pub mod domain;
pub mod export;
pub mod features;
pub mod indicators;
pub mod model;
pub mod profile;

pub use confidence::{ConfidenceBreakdown, ConfidenceConfig, ConfidenceScorer, ModelMetrics};
pub use domain::{ColumnName, FeatureMatrix, FeatureRow, Frame, Observation, SchemaError};
pub use profile::{select, ProfileError, TrainingProfile};
