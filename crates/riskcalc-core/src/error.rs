use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

use crate::data_source::SourceError;
use crate::Symbol;

/// Validation and contract errors exposed by `riskcalc-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid source '{value}', expected one of yahoo, memory, synthetic")]
    InvalidSource { value: String },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("date range start {start} is after end {end}")]
    InvalidDateRange { start: Date, end: Date },
    #[error("lookback must cover at least one day")]
    EmptyLookback,
    #[error("lookback reaches outside the supported calendar")]
    LookbackOutOfRange,

    #[error("price series for {symbol} is not strictly increasing by date at index {index}")]
    UnorderedSeries { symbol: Symbol, index: usize },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    NonPositiveValue { field: &'static str },
}

/// Which side of the aligned pair had no dispersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    Instrument,
    Benchmark,
}

impl SeriesRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instrument => "instrument",
            Self::Benchmark => "benchmark",
        }
    }
}

impl Display for SeriesRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failures of a single risk computation.
///
/// Every variant aborts the whole calculation; no partial result is ever
/// produced alongside one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskError {
    #[error("no price data for {symbol}")]
    NoData { symbol: Symbol },

    #[error("invalid close {close} for {symbol} on {date}")]
    InvalidPrice {
        symbol: Symbol,
        date: Date,
        close: f64,
    },

    #[error("insufficient overlapping data: {overlap} shared return date(s), need at least 2")]
    InsufficientOverlap { overlap: usize },

    #[error("{series} returns have zero dispersion over the window")]
    DegenerateVariance { series: SeriesRole },
}

impl RiskError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoData { .. } => "risk.no_data",
            Self::InvalidPrice { .. } => "risk.invalid_price",
            Self::InsufficientOverlap { .. } => "risk.insufficient_overlap",
            Self::DegenerateVariance { .. } => "risk.degenerate_variance",
        }
    }
}

/// Failure of an end-to-end analysis (fetch, then compute).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to fetch closes for {symbol}: {source}")]
    Source {
        symbol: Symbol,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Risk(#[from] RiskError),
}

impl AnalysisError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation.invalid_input",
            Self::Source { source, .. } => source.code(),
            Self::Risk(error) => error.code(),
        }
    }
}
