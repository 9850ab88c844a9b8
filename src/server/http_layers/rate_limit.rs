//! Rate limiting middleware using tower-governor
//!
//! IP-based limiting across the whole API surface. Limits come from the
//! `[rate_limit]` configuration section.

use axum::{
    extract::{ConnectInfo, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use tower_governor::{key_extractor::KeyExtractor, GovernorError};
use tracing::warn;

use crate::server::error::error_envelope;
use crate::server::metrics::record_rate_limited;

/// Extracts IP address from ConnectInfo for IP-based rate limiting
#[derive(Clone)]
pub struct IpKeyExtractor;

impl KeyExtractor for IpKeyExtractor {
    type Key = SocketAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr)
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Logs the violation and returns the standard error envelope with a
/// `retry_after` hint.
pub fn rate_limit_error_handler(err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { wait_time, .. } => {
            warn!("Rate limit exceeded, retry after {}s", wait_time);
            record_rate_limited();

            let body = error_envelope(
                "RATE_LIMIT_EXCEEDED",
                "Too many requests, slow down",
                serde_json::json!({ "retry_after": wait_time }),
            );
            (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
        }
        _ => {
            warn!("Rate limiting error: {:?}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// Note: the governor configuration builder is inlined in server.rs due to
// its type signature.
