use thiserror::Error;

use crate::data::resolve::SearchMode;
use crate::data::series::YearRange;

/// Request-local lookup failures. None of these are fatal to the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("query is empty")]
    InvalidQuery,

    #[error("no company matches {mode} '{query}'")]
    EntityNotFound { query: String, mode: SearchMode },

    #[error("{name} ({code}) has no data in {range}")]
    NoDataInRange {
        code: String,
        name: String,
        range: YearRange,
    },

    #[error("dataset unavailable: {0}")]
    DatasetUnavailable(String),
}

/// Startup configuration rejected before any lookup runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid year range: {min} is after {max}")]
    InvalidYearRange { min: i32, max: i32 },
}
