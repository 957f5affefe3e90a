//! Domain types for pricecast

pub mod column;
pub mod feature;
pub mod frame;

pub use column::{ColumnName, SchemaError};
pub use feature::{FeatureMatrix, FeatureRow};
pub use frame::{Frame, Observation};
