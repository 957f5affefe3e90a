//! Typed column schema.
//!
//! Every column in a [`Frame`](super::Frame) is keyed by a `ColumnName`. Derived
//! features have dedicated variants; input series enter through
//! [`ColumnName::Raw`], which is validated so a raw column can never shadow
//! a derived feature.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Schema violations at frame and assembler boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("column '{column}' has {actual} rows, frame has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("input column '{0}' collides with a derived feature name")]
    ReservedName(String),

    #[error("invalid column name: '{0}'")]
    InvalidName(String),

    #[error("cannot merge frames with different date axes")]
    DateMismatch,
}

/// Name of a numeric column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ColumnName {
    /// An input series (price, iron_ore_price, usd_mxn_rate, ...).
    Raw(String),

    Sma(usize),
    Ema(usize),
    BollingerMiddle,
    BollingerUpper,
    BollingerLower,
    BollingerWidth,
    BollingerPosition,
    Rsi(usize),
    Macd,
    MacdSignal,
    MacdHistogram,
    StochasticK,
    StochasticD,

    Year,
    Month,
    Day,
    DayOfWeek,
    DayOfYear,
    WeekOfYear,
    Quarter,
    MonthSin,
    MonthCos,
    DayOfWeekSin,
    DayOfWeekCos,

    Lag(usize),
    PctChange(usize),
    Volatility(usize),

    /// Price `h` periods ahead; the regression target.
    Target(usize),
}

const FIXED_NAMES: &[(&str, ColumnName)] = &[
    ("bb_middle", ColumnName::BollingerMiddle),
    ("bb_upper", ColumnName::BollingerUpper),
    ("bb_lower", ColumnName::BollingerLower),
    ("bb_width", ColumnName::BollingerWidth),
    ("bb_position", ColumnName::BollingerPosition),
    ("macd", ColumnName::Macd),
    ("macd_signal", ColumnName::MacdSignal),
    ("macd_histogram", ColumnName::MacdHistogram),
    ("stoch_k", ColumnName::StochasticK),
    ("stoch_d", ColumnName::StochasticD),
    ("year", ColumnName::Year),
    ("month", ColumnName::Month),
    ("day", ColumnName::Day),
    ("day_of_week", ColumnName::DayOfWeek),
    ("day_of_year", ColumnName::DayOfYear),
    ("week_of_year", ColumnName::WeekOfYear),
    ("quarter", ColumnName::Quarter),
    ("month_sin", ColumnName::MonthSin),
    ("month_cos", ColumnName::MonthCos),
    ("day_of_week_sin", ColumnName::DayOfWeekSin),
    ("day_of_week_cos", ColumnName::DayOfWeekCos),
];

impl ColumnName {
    /// Validate an input series name and wrap it as `Raw`.
    pub fn raw(name: impl AsRef<str>) -> Result<Self, SchemaError> {
        let name = name.as_ref().trim();
        if name.is_empty() || name.eq_ignore_ascii_case("date") {
            return Err(SchemaError::InvalidName(name.to_string()));
        }
        match Self::derived(name) {
            Some(_) => Err(SchemaError::ReservedName(name.to_string())),
            None => Ok(Self::Raw(name.to_string())),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Parse a derived feature name (`sma_20`, `bb_upper`, `target_1d`, ...).
    fn derived(s: &str) -> Option<Self> {
        if let Some((_, col)) = FIXED_NAMES.iter().find(|(name, _)| *name == s) {
            return Some(col.clone());
        }

        let suffixed: [(&str, fn(usize) -> ColumnName); 6] = [
            ("sma_", ColumnName::Sma),
            ("ema_", ColumnName::Ema),
            ("rsi_", ColumnName::Rsi),
            ("price_lag_", ColumnName::Lag),
            ("price_change_", ColumnName::PctChange),
            ("volatility_", ColumnName::Volatility),
        ];
        for (prefix, ctor) in suffixed {
            if let Some(n) = s.strip_prefix(prefix).and_then(|rest| rest.parse().ok()) {
                return Some(ctor(n));
            }
        }

        s.strip_prefix("target_")
            .and_then(|rest| rest.strip_suffix('d'))
            .and_then(|h| h.parse().ok())
            .map(ColumnName::Target)
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(name) => f.write_str(name),
            Self::Sma(w) => write!(f, "sma_{w}"),
            Self::Ema(s) => write!(f, "ema_{s}"),
            Self::Rsi(p) => write!(f, "rsi_{p}"),
            Self::Lag(l) => write!(f, "price_lag_{l}"),
            Self::PctChange(h) => write!(f, "price_change_{h}"),
            Self::Volatility(w) => write!(f, "volatility_{w}"),
            Self::Target(h) => write!(f, "target_{h}d"),
            fixed => {
                let name = FIXED_NAMES
                    .iter()
                    .find(|(_, col)| col == fixed)
                    .map(|(name, _)| *name)
                    .unwrap_or("?");
                f.write_str(name)
            }
        }
    }
}

impl FromStr for ColumnName {
    type Err = SchemaError;

    /// Derived names parse to their variant; anything else goes through
    /// [`ColumnName::raw`] validation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::derived(s) {
            Some(col) => Ok(col),
            None => Self::raw(s),
        }
    }
}

impl From<ColumnName> for String {
    fn from(col: ColumnName) -> Self {
        col.to_string()
    }
}

impl TryFrom<String> for ColumnName {
    type Error = SchemaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
