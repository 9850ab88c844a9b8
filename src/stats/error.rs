//! Error taxonomy for the stats pipeline.
//!
//! Parameter violations carry the offending parameter and value so the HTTP
//! layer can build a machine-readable error envelope. Everything unexpected
//! funnels through `Internal` and surfaces as a generic server error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Invalid time period: {provided}")]
    InvalidTimePeriod { provided: String },

    #[error("Invalid date format for {parameter}: {provided}")]
    InvalidDateFormat { parameter: String, provided: String },

    #[error("from_date must not be after to_date")]
    InvalidDateRange { from: String, to: String },

    #[error("Invalid {parameter}: {provided} (allowed {min}..={max})")]
    InvalidLimit {
        parameter: String,
        provided: String,
        min: u32,
        max: u32,
    },

    #[error("Invalid granularity: {provided}")]
    InvalidGranularity { provided: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl StatsError {
    /// Machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            StatsError::InvalidTimePeriod { .. } => "INVALID_TIME_PERIOD",
            StatsError::InvalidDateFormat { .. } => "INVALID_DATE_FORMAT",
            StatsError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            StatsError::InvalidLimit { .. } => "INVALID_LIMIT",
            StatsError::InvalidGranularity { .. } => "INVALID_GRANULARITY",
            StatsError::NotFound { .. } => "NOT_FOUND",
            StatsError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_client_error(&self) -> bool {
        !matches!(self, StatsError::Internal(_))
    }
}
