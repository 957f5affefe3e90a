//! Feature builders and the assembler that joins them.
//!
//! The indicator engine, seasonal encoder and lag builder each return a
//! frame of new columns on the cleaned frame's date axis. They share no
//! state and can run concurrently.

pub mod assembler;
pub mod indicators;
pub mod lags;
pub mod seasonal;

pub use assembler::{assemble, AssembledFeatures, MAX_MISSING_FRACTION};
pub use indicators::{compute_indicators, IndicatorEngine};
pub use lags::{add_lags, lag_columns, pct_change, LagConfig};
pub use seasonal::{calendar_columns, encode};
