//! ScrobbleStore trait definition.
//!
//! This trait abstracts the listening-history store so handlers and the
//! aggregation engine can run against either the SQLite implementation or a
//! mock in tests.

use super::models::*;
use crate::stats::{Granularity, TimeWindow};
use anyhow::Result;
use chrono::NaiveDate;

/// Narrows an aggregation to one entity's scrobbles.
///
/// Scoping always resolves through the owning track, so an artist scope
/// covers every track of that artist, with or without an album.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Artist(i64),
    Album(i64),
    Track(i64),
}

/// Ordering for an album's track listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumTrackOrdering {
    /// Most scrobbled first, track id ascending on ties.
    ScrobbleCount,
    /// Track id ascending, which follows insertion order.
    AlbumOrder,
}

impl AlbumTrackOrdering {
    /// Unrecognized values fall back to scrobble count rather than erroring.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("album_order") => AlbumTrackOrdering::AlbumOrder,
            _ => AlbumTrackOrdering::ScrobbleCount,
        }
    }
}

/// Trait for listening-history storage backends.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ScrobbleStore: Send + Sync {
    // =========================================================================
    // Ranked Aggregations
    // =========================================================================

    /// Top artists by scrobble count within the window, id ascending on ties.
    /// Rows carry track/album/last-scrobble figures computed in the same window.
    fn top_artists(&self, window: &TimeWindow, limit: u32) -> Result<Vec<TopArtistRow>>;

    /// Top albums by scrobble count within the window and scope.
    /// Tracks without an album never contribute.
    fn top_albums(&self, window: &TimeWindow, limit: u32, scope: Scope)
        -> Result<Vec<TopAlbumRow>>;

    /// Top tracks by scrobble count within the window and scope.
    fn top_tracks(&self, window: &TimeWindow, limit: u32, scope: Scope)
        -> Result<Vec<TopTrackRow>>;

    // =========================================================================
    // Feeds and Time Series
    // =========================================================================

    /// Most recent scrobbles, timestamp descending, id descending on ties.
    fn recent_tracks(&self, limit: u32, offset: u64) -> Result<Vec<RecentTrackRow>>;

    /// Scrobble counts bucketed by the granularity's key, ascending by key.
    /// Only buckets with at least one scrobble appear.
    fn chart_buckets(
        &self,
        window: &TimeWindow,
        granularity: Granularity,
        scope: Scope,
    ) -> Result<Vec<ChartBucketRow>>;

    // =========================================================================
    // Counts and Bounds
    // =========================================================================

    /// Number of scrobbles within the window and scope.
    fn scrobble_count(&self, window: &TimeWindow, scope: Scope) -> Result<u64>;

    /// First and last scrobble timestamps within the window and scope.
    fn scrobble_bounds(&self, window: &TimeWindow, scope: Scope)
        -> Result<Option<ScrobbleBounds>>;

    /// Total row counts per entity table.
    fn entity_counts(&self) -> Result<EntityCounts>;

    /// Entities with at least one scrobble, all time.
    fn scrobbled_entity_counts(&self) -> Result<ScrobbledEntityCounts>;

    /// Average duration over tracks that have one.
    fn track_duration_stats(&self) -> Result<TrackDurationStats>;

    /// Distinct calendar dates (UTC) with at least one scrobble, newest first.
    fn distinct_scrobble_dates_desc(&self) -> Result<Vec<NaiveDate>>;

    /// Timestamp of the most recent scrobble, if any. Drives cache versioning.
    fn latest_scrobble_timestamp(&self) -> Result<Option<i64>>;

    // =========================================================================
    // Entity Retrieval
    // =========================================================================

    fn get_artist(&self, id: i64) -> Result<Option<Artist>>;

    fn get_artist_by_mbid(&self, mbid: &str) -> Result<Option<Artist>>;

    fn get_album(&self, id: i64) -> Result<Option<Album>>;

    fn get_album_by_mbid(&self, mbid: &str) -> Result<Option<Album>>;

    fn get_track(&self, id: i64) -> Result<Option<Track>>;

    fn get_track_by_mbid(&self, mbid: &str) -> Result<Option<Track>>;

    /// All tracks of an album with their windowed scrobble counts.
    /// Tracks with zero in-window scrobbles still appear.
    fn album_tracks(
        &self,
        album_id: i64,
        window: &TimeWindow,
        ordering: AlbumTrackOrdering,
    ) -> Result<Vec<AlbumTrackRow>>;

    /// A track's most recent scrobble timestamps within the window.
    fn track_scrobble_timestamps(
        &self,
        track_id: i64,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<i64>>;

    // =========================================================================
    // Write Seam
    // =========================================================================

    /// Find an artist by mbid (preferred) or name, creating it if missing.
    fn get_or_create_artist(
        &self,
        name: &str,
        mbid: Option<&str>,
        url: Option<&str>,
    ) -> Result<Artist>;

    /// Find an album by mbid or (name, artist), creating it if missing.
    fn get_or_create_album(
        &self,
        name: &str,
        artist_id: i64,
        mbid: Option<&str>,
        url: Option<&str>,
    ) -> Result<Album>;

    /// Find a track by mbid or (name, artist, album), creating it if missing.
    fn get_or_create_track(
        &self,
        name: &str,
        artist_id: i64,
        album_id: Option<i64>,
        mbid: Option<&str>,
        url: Option<&str>,
        duration: Option<u32>,
    ) -> Result<Track>;

    /// Append a scrobble. Returns false when the (track, timestamp) pair
    /// already exists, leaving the existing row untouched.
    fn record_scrobble(
        &self,
        track_id: i64,
        timestamp: i64,
        source_ref: Option<&str>,
    ) -> Result<bool>;

    /// Current sync status, defaulting to idle when never written.
    fn get_sync_status(&self) -> Result<SyncStatus>;

    fn update_sync_status(&self, status: &SyncStatus) -> Result<()>;

    // =========================================================================
    // Health
    // =========================================================================

    /// Connectivity probe for readiness checks.
    fn ping(&self) -> Result<()>;
}
