//! Scrobble store data models

use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    /// MusicBrainz UUID, unique when present
    pub mbid: Option<String>,
    pub url: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Album {
    pub id: i64,
    pub name: String,
    pub artist_id: i64,
    pub mbid: Option<String>,
    pub url: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub artist_id: i64,
    /// None for singles
    pub album_id: Option<i64>,
    pub mbid: Option<String>,
    pub url: Option<String>,
    /// Track length in seconds
    pub duration: Option<u32>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Scrobble {
    pub id: i64,
    pub track_id: i64,
    /// Unix seconds UTC, the instant the play occurred
    pub timestamp: i64,
    /// Identifier assigned by the external scrobble source
    pub source_ref: Option<String>,
}

// ============================================================================
// Sync State
// ============================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Syncing,
    Success,
    Error,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::Syncing => "syncing",
            SyncState::Success => "success",
            SyncState::Error => "error",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "syncing" => SyncState::Syncing,
            "success" => SyncState::Success,
            "error" => SyncState::Error,
            _ => SyncState::Idle,
        }
    }
}

/// Singleton record describing the external ingestion process
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SyncStatus {
    pub status: SyncState,
    /// Unix seconds of the last completed sync
    pub last_sync_timestamp: Option<i64>,
    /// Monotonic count of completed syncs
    pub sync_count: u64,
    pub error_message: Option<String>,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            status: SyncState::Idle,
            last_sync_timestamp: None,
            sync_count: 0,
            error_message: None,
        }
    }
}

// ============================================================================
// Aggregation Rows
// ============================================================================

/// Ranked artist row with counts computed inside the requested window
#[derive(Debug, Clone, PartialEq)]
pub struct TopArtistRow {
    pub id: i64,
    pub name: String,
    pub mbid: Option<String>,
    pub url: Option<String>,
    /// Distinct tracks of this artist scrobbled in the window
    pub track_count: u64,
    /// Distinct albums of this artist scrobbled in the window
    pub album_count: u64,
    pub scrobble_count: u64,
    /// Latest scrobble of this artist in the window, unix seconds
    pub last_scrobbled: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopAlbumRow {
    pub id: i64,
    pub album: String,
    pub artist: String,
    pub scrobble_count: u64,
    pub mbid: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopTrackRow {
    pub id: i64,
    pub track: String,
    pub artist: String,
    /// None for singles
    pub album: Option<String>,
    pub scrobble_count: u64,
    pub mbid: Option<String>,
}

/// Track row within a single album listing
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumTrackRow {
    pub id: i64,
    pub track: String,
    pub scrobble_count: u64,
    pub mbid: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentTrackRow {
    pub track: String,
    pub artist: String,
    pub album: Option<String>,
    pub timestamp: i64,
}

/// One time-series bucket; the key format depends on the bucketing
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBucketRow {
    pub bucket: String,
    pub scrobble_count: u64,
}

/// First and last scrobble timestamps within a window, unix seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrobbleBounds {
    pub first: i64,
    pub last: i64,
}

/// Total row counts per entity table
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntityCounts {
    pub artists: u64,
    pub albums: u64,
    pub tracks: u64,
    pub scrobbles: u64,
}

/// Entities with at least one scrobble
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrobbledEntityCounts {
    pub artists: u64,
    pub albums: u64,
    pub tracks: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackDurationStats {
    /// Mean duration over tracks that have one, seconds
    pub average_seconds: Option<f64>,
    pub tracks_with_duration: u64,
}
