//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all stats-server endpoints.
//!
//! When API routes or query formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET an arbitrary path with query string, e.g. `/v1/top-artists?period=7d`
    pub async fn get(&self, path_and_query: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path_and_query))
            .send()
            .await
            .expect("Request failed")
    }

    async fn get_with_params(&self, path: &str, params: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Stats Endpoints
    // ========================================================================

    /// GET /v1/recent-tracks
    pub async fn recent_tracks(&self, params: &[(&str, &str)]) -> Response {
        self.get_with_params("/v1/recent-tracks", params).await
    }

    /// GET /v1/top-artists
    pub async fn top_artists(&self, params: &[(&str, &str)]) -> Response {
        self.get_with_params("/v1/top-artists", params).await
    }

    /// GET /v1/top-albums
    pub async fn top_albums(&self, params: &[(&str, &str)]) -> Response {
        self.get_with_params("/v1/top-albums", params).await
    }

    /// GET /v1/top-tracks
    pub async fn top_tracks(&self, params: &[(&str, &str)]) -> Response {
        self.get_with_params("/v1/top-tracks", params).await
    }

    /// GET /v1/scrobbles/chart
    pub async fn chart(&self, params: &[(&str, &str)]) -> Response {
        self.get_with_params("/v1/scrobbles/chart", params).await
    }

    /// GET /v1/stats/summary
    pub async fn summary(&self) -> Response {
        self.get("/v1/stats/summary").await
    }

    /// GET /v1/artists/{key}
    pub async fn artist_details(&self, key: &str, params: &[(&str, &str)]) -> Response {
        self.get_with_params(&format!("/v1/artists/{}", key), params)
            .await
    }

    /// GET /v1/albums/{key}
    pub async fn album_details(&self, key: &str, params: &[(&str, &str)]) -> Response {
        self.get_with_params(&format!("/v1/albums/{}", key), params)
            .await
    }

    /// GET /v1/tracks/{key}
    pub async fn track_details(&self, key: &str, params: &[(&str, &str)]) -> Response {
        self.get_with_params(&format!("/v1/tracks/{}", key), params)
            .await
    }

    /// GET /v1/sync/status
    pub async fn sync_status(&self) -> Response {
        self.get("/v1/sync/status").await
    }

    /// GET /v1/dashboard
    pub async fn dashboard(&self) -> Response {
        self.get("/v1/dashboard").await
    }

    // ========================================================================
    // Operational Endpoints
    // ========================================================================

    /// GET /health
    pub async fn health(&self) -> Response {
        self.get("/health").await
    }

    /// GET /metrics
    pub async fn metrics(&self) -> Response {
        self.get("/metrics").await
    }
}
