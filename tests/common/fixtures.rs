//! Seeded scrobble library for end-to-end tests
//!
//! Everything goes through the store's write seam so the fixtures exercise
//! the same code paths as a real sync. The per-track scrobble counts are
//! documented in constants.rs; assertions across the suite depend on them.

use super::constants::*;
use anyhow::Result;
use chrono::Utc;
use scrobblarr_stats_server::scrobble_store::{
    ScrobbleStore, SqliteScrobbleStore, SyncState, SyncStatus,
};
use std::path::Path;

/// Creates a scrobble database with 3 artists, 2 albums, 6 tracks and 17
/// scrobbles. 14 scrobbles sit at fixed historical timestamps starting at
/// `FIRST_SCROBBLE_TS`; the last 3 are placed relative to now so the recent
/// feed and the activity health check have predictable answers.
pub fn create_seeded_store(db_path: &Path) -> Result<SqliteScrobbleStore> {
    let store = SqliteScrobbleStore::new(db_path)?;
    let now = Utc::now().timestamp();

    let band = store.get_or_create_artist(ARTIST_1_NAME, Some(ARTIST_1_MBID), None)?;
    let jazz = store.get_or_create_artist(ARTIST_2_NAME, Some(ARTIST_2_MBID), None)?;
    let solo = store.get_or_create_artist(ARTIST_3_NAME, None, None)?;

    let first_album = store.get_or_create_album(ALBUM_1_TITLE, band.id, Some(ALBUM_1_MBID), None)?;
    let jazz_album = store.get_or_create_album(ALBUM_2_TITLE, jazz.id, None, None)?;

    let opening = store.get_or_create_track(
        TRACK_OPENING,
        band.id,
        Some(first_album.id),
        Some(TRACK_OPENING_MBID),
        None,
        Some(245),
    )?;
    let middle = store.get_or_create_track(
        TRACK_MIDDLE,
        band.id,
        Some(first_album.id),
        None,
        None,
        Some(198),
    )?;
    let closing = store.get_or_create_track(
        TRACK_CLOSING,
        band.id,
        Some(first_album.id),
        None,
        None,
        None,
    )?;
    let smooth = store.get_or_create_track(
        TRACK_SMOOTH,
        jazz.id,
        Some(jazz_album.id),
        None,
        None,
        Some(309),
    )?;
    let upbeat = store.get_or_create_track(
        TRACK_UPBEAT,
        jazz.id,
        Some(jazz_album.id),
        None,
        None,
        Some(187),
    )?;
    let single = store.get_or_create_track(TRACK_SINGLE, solo.id, None, None, None, Some(240))?;

    // 14 historical scrobbles, one hour apart
    let historical = [
        opening.id,
        opening.id,
        opening.id,
        opening.id,
        middle.id,
        middle.id,
        closing.id,
        smooth.id,
        smooth.id,
        smooth.id,
        upbeat.id,
        upbeat.id,
        single.id,
        single.id,
    ];
    for (i, track_id) in historical.iter().enumerate() {
        store.record_scrobble(*track_id, FIRST_SCROBBLE_TS + i as i64 * 3600, None)?;
    }

    // 3 recent scrobbles, newest first: Opening, Smooth, Middle
    store.record_scrobble(opening.id, now - 30 * 60, None)?;
    store.record_scrobble(smooth.id, now - 2 * 3600, None)?;
    store.record_scrobble(middle.id, now - 26 * 3600, None)?;

    store.update_sync_status(&SyncStatus {
        status: SyncState::Success,
        last_sync_timestamp: Some(now - 15 * 60),
        sync_count: SYNC_COUNT,
        error_message: None,
    })?;

    Ok(store)
}
