use thiserror::Error;

use time::Date;

/// Configuration and request-validation errors.
///
/// Every variant is raised synchronously, before any network activity, and is
/// never retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("field '{field}' is not in the field registry")]
    UnknownField { field: String },

    #[error("batch size must be greater than zero")]
    InvalidBatchSize,

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("start date {start} must be before end date {end}")]
    InvalidDateRange { start: Date, end: Date },

    #[error("ticker list cannot be empty")]
    EmptyTickerList,

    #[error("invalid source '{value}', expected one of lseg, yahoo")]
    InvalidSource { value: String },

    #[error("scale for field '{field}' must be a positive number")]
    InvalidScale { field: String },

    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },
}
