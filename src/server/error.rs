//! The JSON error envelope.
//!
//! Every failed request answers `{error: {code, message, details}}` with the
//! HTTP status matching the failure kind. Internal errors log their source
//! chain server-side and leak nothing to the client.

use crate::stats::StatsError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

/// Build the envelope body shared by all error responses.
pub fn error_envelope(code: &str, message: &str, details: Value) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "details": details,
        }
    })
}

/// A stats-layer error crossing the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub StatsError);

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self.0 {
            StatsError::InvalidTimePeriod { provided } => (
                StatusCode::BAD_REQUEST,
                self.0.to_string(),
                json!({
                    "provided": provided,
                    "allowed": ["7d", "30d", "90d", "180d", "365d", "all"],
                }),
            ),
            StatsError::InvalidDateFormat {
                parameter,
                provided,
            } => (
                StatusCode::BAD_REQUEST,
                self.0.to_string(),
                json!({
                    "parameter": parameter,
                    "provided": provided,
                    "expected_format": "YYYY-MM-DD",
                }),
            ),
            StatsError::InvalidDateRange { from, to } => (
                StatusCode::BAD_REQUEST,
                self.0.to_string(),
                json!({ "from_date": from, "to_date": to }),
            ),
            StatsError::InvalidLimit {
                parameter,
                provided,
                min,
                max,
            } => (
                StatusCode::BAD_REQUEST,
                self.0.to_string(),
                json!({
                    "parameter": parameter,
                    "provided": provided,
                    "min": min,
                    "max": max,
                }),
            ),
            StatsError::InvalidGranularity { provided } => (
                StatusCode::BAD_REQUEST,
                self.0.to_string(),
                json!({
                    "provided": provided,
                    "allowed": ["daily", "monthly", "yearly"],
                }),
            ),
            StatsError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                self.0.to_string(),
                json!({ "resource": resource }),
            ),
            StatsError::Internal(source) => {
                error!("Request failed: {:#}", source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Value::Null,
                )
            }
        };

        (
            status,
            Json(error_envelope(self.0.code(), &message, details)),
        )
            .into_response()
    }
}
