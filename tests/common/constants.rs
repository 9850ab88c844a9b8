//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When the seeded library changes, update only this file and fixtures.rs.

// ============================================================================
// Seeded Artists
// ============================================================================

/// "The Test Band", 9 scrobbles total
pub const ARTIST_1_NAME: &str = "The Test Band";
pub const ARTIST_1_MBID: &str = "5a8e07d5-d932-4484-a7f7-e700793a9c94";

/// "Jazz Ensemble", 6 scrobbles total
pub const ARTIST_2_NAME: &str = "Jazz Ensemble";
pub const ARTIST_2_MBID: &str = "f54ba20c-0dfb-4c67-a00e-08e1c7296ef6";

/// "Solo Act", 2 scrobbles, only releases singles
pub const ARTIST_3_NAME: &str = "Solo Act";

// ============================================================================
// Seeded Albums
// ============================================================================

/// "First Album" by The Test Band, 9 scrobbles
pub const ALBUM_1_TITLE: &str = "First Album";
pub const ALBUM_1_MBID: &str = "0c7a6c95-1f1b-4bbe-97e2-5094c1ad076f";

/// "Jazz Collection" by Jazz Ensemble, 6 scrobbles
pub const ALBUM_2_TITLE: &str = "Jazz Collection";

// ============================================================================
// Seeded Tracks (scrobble counts in parentheses)
// ============================================================================

/// On First Album (5)
pub const TRACK_OPENING: &str = "Opening Track";
pub const TRACK_OPENING_MBID: &str = "9b7312b5-6a04-4f9c-86c6-71e894fe0b12";

/// On First Album (3)
pub const TRACK_MIDDLE: &str = "Middle Track";

/// On First Album (1)
pub const TRACK_CLOSING: &str = "Closing Track";

/// On Jazz Collection (4), 309 seconds long
pub const TRACK_SMOOTH: &str = "Smooth Jazz";

/// On Jazz Collection (2)
pub const TRACK_UPBEAT: &str = "Upbeat Jazz";

/// Single by Solo Act, no album (2)
pub const TRACK_SINGLE: &str = "Lone Single";

// ============================================================================
// Aggregates over the seeded library
// ============================================================================

pub const TOTAL_SCROBBLES: u64 = 17;
pub const TOTAL_ARTISTS: u64 = 3;
pub const TOTAL_ALBUMS: u64 = 2;
pub const TOTAL_TRACKS: u64 = 6;

/// First seeded historical scrobble, 2024-03-10T08:00:00Z
pub const FIRST_SCROBBLE_TS: i64 = 1710057600;

/// Completed syncs recorded in the seeded sync status row
pub const SYNC_COUNT: u64 = 3;

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
