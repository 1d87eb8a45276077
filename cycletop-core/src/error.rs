//! Structured error type for the engine boundary.
//!
//! Only structural problems surface as errors. Insufficient history and zero
//! denominators are encoded as `f64::NAN` in the output series instead.

use chrono::NaiveDate;
use thiserror::Error;

/// The single error kind returned by `compute_indicators` and `evaluate_signals`.
///
/// Each variant maps to one failure cause so callers can render a stable message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("close is missing at index {index} ({date})")]
    MissingClose { index: usize, date: NaiveDate },

    #[error("close at index {index} ({date}) is not a finite non-negative number: {value}")]
    InvalidClose {
        index: usize,
        date: NaiveDate,
        value: f64,
    },

    #[error("dates must be strictly increasing: {previous} then {current} at index {index}")]
    NonIncreasingDate {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("indicator set is empty")]
    EmptyIndicatorSet,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(String),
}

pub type Result<T> = std::result::Result<T, InvalidInputError>;
