//! Stats HTTP routes.
//!
//! Every handler follows the same path: validate the raw query values,
//! resolve the time window, then run the computation through the stats
//! cache so repeated requests for unchanged data are served from memory.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::scrobble_store::AlbumTrackOrdering;
use crate::server::error::ApiError;
use crate::server::responses::{
    AlbumDetailsResponse, ArtistDetailsResponse, ChartResponse, DashboardResponse,
    RecentTracksResponse, SummaryResponse, SyncStatusDto, TopAlbumDto, TopArtistDto,
    TopListResponse, TopTrackDto, TrackDetailsResponse,
};
use crate::server::state::ServerState;
use crate::stats::{resolve_window, validation, StatsError};

#[derive(Deserialize, Default)]
pub struct StatsQuery {
    pub period: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub granularity: Option<String>,
    pub ordering: Option<String>,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, StatsError> {
    serde_json::to_value(value).map_err(|e| StatsError::Internal(anyhow::Error::new(e)))
}

async fn recent_tracks(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = validation::validate_recent_limit(query.limit.as_deref())?;
    let page = validation::validate_page(query.page.as_deref())?;

    let params = [
        ("limit", query.limit.as_deref()),
        ("page", query.page.as_deref()),
    ];
    let ttl = state.config.cache.recent_tracks_ttl_sec;
    let engine = state.engine.clone();
    let value = state
        .cache
        .get_or_compute("recent-tracks", &params, ttl, move || {
            let result = engine.recent_tracks(limit, page)?;
            to_json(&RecentTracksResponse::from(&result))
        })
        .await?;
    Ok(Json(value))
}

async fn top_artists(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = validation::validate_top_limit(query.limit.as_deref())?;
    let window = resolve_window(
        query.period.as_deref(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        Utc::now(),
    )?;

    let params = window_params(&query, [("limit", query.limit.as_deref())]);
    let ttl = state.config.cache.top_ttl_sec;
    let engine = state.engine.clone();
    let value = state
        .cache
        .get_or_compute("top-artists", &params, ttl, move || {
            let result = engine.top_artists(&window, limit)?;
            to_json(&TopListResponse::new(
                window.display.clone(),
                result.rows.iter().map(TopArtistDto::from).collect(),
                result.total_scrobbles,
            ))
        })
        .await?;
    Ok(Json(value))
}

async fn top_albums(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = validation::validate_top_limit(query.limit.as_deref())?;
    let window = resolve_window(
        query.period.as_deref(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        Utc::now(),
    )?;

    let params = window_params(&query, [("limit", query.limit.as_deref())]);
    let ttl = state.config.cache.top_ttl_sec;
    let engine = state.engine.clone();
    let value = state
        .cache
        .get_or_compute("top-albums", &params, ttl, move || {
            let result = engine.top_albums(&window, limit)?;
            to_json(&TopListResponse::new(
                window.display.clone(),
                result.rows.iter().map(TopAlbumDto::from).collect(),
                result.total_scrobbles,
            ))
        })
        .await?;
    Ok(Json(value))
}

async fn top_tracks(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = validation::validate_top_limit(query.limit.as_deref())?;
    let window = resolve_window(
        query.period.as_deref(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        Utc::now(),
    )?;

    let params = window_params(&query, [("limit", query.limit.as_deref())]);
    let ttl = state.config.cache.top_ttl_sec;
    let engine = state.engine.clone();
    let value = state
        .cache
        .get_or_compute("top-tracks", &params, ttl, move || {
            let result = engine.top_tracks(&window, limit)?;
            to_json(&TopListResponse::new(
                window.display.clone(),
                result.rows.iter().map(TopTrackDto::from).collect(),
                result.total_scrobbles,
            ))
        })
        .await?;
    Ok(Json(value))
}

async fn scrobbles_chart(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let granularity = validation::validate_granularity(query.granularity.as_deref())?;
    let window = resolve_window(
        query.period.as_deref(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        Utc::now(),
    )?;

    let params = window_params(&query, [("granularity", query.granularity.as_deref())]);
    let ttl = state.config.cache.chart_ttl_sec;
    let engine = state.engine.clone();
    let value = state
        .cache
        .get_or_compute("chart", &params, ttl, move || {
            let series = engine.chart(&window, granularity)?;
            to_json(&ChartResponse::new(window.display.clone(), &series))
        })
        .await?;
    Ok(Json(value))
}

async fn stats_summary(State(state): State<ServerState>) -> Result<Json<Value>, ApiError> {
    let ttl = state.config.cache.summary_ttl_sec;
    let engine = state.engine.clone();
    let value = state
        .cache
        .get_or_compute("summary", &[], ttl, move || {
            let summary = engine.summary()?;
            to_json(&SummaryResponse::from(&summary))
        })
        .await?;
    Ok(Json(value))
}

async fn artist_details(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let window = resolve_window(
        query.period.as_deref(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        Utc::now(),
    )?;

    let params = window_params(&query, [("key", Some(key.as_str()))]);
    let ttl = state.config.cache.details_ttl_sec;
    let engine = state.engine.clone();
    let lookup_key = key.clone();
    let value = state
        .cache
        .get_or_compute("artist-details", &params, ttl, move || {
            let details = engine.artist_details(&lookup_key, &window)?;
            to_json(&ArtistDetailsResponse::from(&details))
        })
        .await?;
    Ok(Json(value))
}

async fn album_details(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let window = resolve_window(
        query.period.as_deref(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        Utc::now(),
    )?;
    let ordering = AlbumTrackOrdering::parse(query.ordering.as_deref());

    let params = window_params(
        &query,
        [
            ("key", Some(key.as_str())),
            ("ordering", query.ordering.as_deref()),
        ],
    );
    let ttl = state.config.cache.details_ttl_sec;
    let engine = state.engine.clone();
    let lookup_key = key.clone();
    let value = state
        .cache
        .get_or_compute("album-details", &params, ttl, move || {
            let details = engine.album_details(&lookup_key, &window, ordering)?;
            to_json(&AlbumDetailsResponse::from(&details))
        })
        .await?;
    Ok(Json(value))
}

async fn track_details(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let window = resolve_window(
        query.period.as_deref(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
        Utc::now(),
    )?;

    let params = window_params(&query, [("key", Some(key.as_str()))]);
    let ttl = state.config.cache.details_ttl_sec;
    let engine = state.engine.clone();
    let lookup_key = key.clone();
    let value = state
        .cache
        .get_or_compute("track-details", &params, ttl, move || {
            let details = engine.track_details(&lookup_key, &window)?;
            to_json(&TrackDetailsResponse::from(&details))
        })
        .await?;
    Ok(Json(value))
}

async fn sync_status(State(state): State<ServerState>) -> Result<Json<Value>, ApiError> {
    // Sync status reflects an external writer, bypass the cache
    let status = state.engine.sync_status()?;
    Ok(Json(to_json(&SyncStatusDto::from(&status))?))
}

async fn dashboard(State(state): State<ServerState>) -> Result<Json<Value>, ApiError> {
    let ttl = state.config.cache.dashboard_ttl_sec;
    let engine = state.engine.clone();
    let value = state
        .cache
        .get_or_compute("dashboard", &[], ttl, move || {
            let dashboard = engine.dashboard(Utc::now())?;
            to_json(&DashboardResponse::from(&dashboard))
        })
        .await?;
    Ok(Json(value))
}

/// Window params plus any endpoint-specific extras, in one slice for the
/// cache key.
fn window_params<'a, const N: usize>(
    query: &'a StatsQuery,
    extras: [(&'a str, Option<&'a str>); N],
) -> Vec<(&'a str, Option<&'a str>)> {
    let mut params = vec![
        ("period", query.period.as_deref()),
        ("from_date", query.from_date.as_deref()),
        ("to_date", query.to_date.as_deref()),
    ];
    params.extend(extras);
    params
}

pub fn stats_routes() -> Router<ServerState> {
    Router::new()
        .route("/recent-tracks", get(recent_tracks))
        .route("/top-artists", get(top_artists))
        .route("/top-albums", get(top_albums))
        .route("/top-tracks", get(top_tracks))
        .route("/scrobbles/chart", get(scrobbles_chart))
        .route("/stats/summary", get(stats_summary))
        .route("/artists/{key}", get(artist_details))
        .route("/albums/{key}", get(album_details))
        .route("/tracks/{key}", get(track_details))
        .route("/sync/status", get(sync_status))
        .route("/dashboard", get(dashboard))
}
