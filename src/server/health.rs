//! Health probes.
//!
//! `/health` runs the full check set, `/health/readiness` answers whether
//! the store is queryable, `/health/liveness` only proves the process is
//! serving requests.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{Duration, Utc};
use serde_json::json;
use std::time::Instant;
use tracing::warn;

use crate::scrobble_store::Scope;
use crate::server::state::ServerState;
use crate::stats::TimeWindow;

fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    let started = Instant::now();

    let database = match state.store.ping() {
        Ok(()) => json!({"status": "healthy"}),
        Err(e) => {
            warn!("Health check database probe failed: {:#}", e);
            json!({"status": "unhealthy", "message": e.to_string()})
        }
    };

    let data = match state.store.entity_counts() {
        Ok(counts) => json!({
            "status": "healthy",
            "artists": counts.artists,
            "albums": counts.albums,
            "tracks": counts.tracks,
            "scrobbles": counts.scrobbles,
        }),
        Err(e) => {
            warn!("Health check data probe failed: {:#}", e);
            json!({"status": "unhealthy", "message": e.to_string()})
        }
    };

    // No scrobbles in a day means the sync source may be stalled, but the
    // service itself is fine.
    let last_day = TimeWindow::Since(Utc::now() - Duration::hours(24));
    let activity = match state.store.scrobble_count(&last_day, Scope::All) {
        Ok(0) => json!({"status": "warning", "scrobbles_24h": 0}),
        Ok(count) => json!({"status": "healthy", "scrobbles_24h": count}),
        Err(e) => {
            warn!("Health check activity probe failed: {:#}", e);
            json!({"status": "unhealthy", "message": e.to_string()})
        }
    };

    let unhealthy = [&database, &data, &activity]
        .iter()
        .any(|check| check["status"] == "unhealthy");

    let body = json!({
        "status": if unhealthy { "unhealthy" } else { "healthy" },
        "timestamp": now_iso(),
        "checks": {
            "database": database,
            "data": data,
            "activity": activity,
        },
        "response_time_ms": started.elapsed().as_millis() as u64,
    });

    let status = if unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(body))
}

async fn readiness(State(state): State<ServerState>) -> impl IntoResponse {
    match state.store.ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "ready", "timestamp": now_iso()})),
        ),
        Err(e) => {
            warn!("Readiness probe failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "not_ready", "message": e.to_string()})),
            )
        }
    }
}

async fn liveness() -> impl IntoResponse {
    Json(json!({"status": "alive", "timestamp": now_iso()}))
}

pub fn health_routes() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/readiness", get(readiness))
        .route("/health/liveness", get(liveness))
}
