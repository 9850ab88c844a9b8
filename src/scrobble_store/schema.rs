//! SQLite schema definitions for the scrobble database.
//!
//! The model is a normalized listening history: artists own albums and
//! tracks, tracks own scrobbles. Primary keys are integer rowids; MusicBrainz
//! identifiers are optional and unique when present. All time filtering runs
//! against the indexed scrobble timestamp (unix seconds, UTC).

use crate::schema_column;
use crate::sqlite_persistence::{Column, ForeignKey, OnDelete, SqlType, Table, VersionedSchema};

// =============================================================================
// Entity Tables
// =============================================================================

const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "id",
    on_delete: OnDelete::Cascade,
};

const ALBUM_FK: ForeignKey = ForeignKey {
    foreign_table: "albums",
    foreign_column: "id",
    on_delete: OnDelete::Cascade,
};

const TRACK_FK: ForeignKey = ForeignKey {
    foreign_table: "tracks",
    foreign_column: "id",
    on_delete: OnDelete::Cascade,
};

/// Artists table - top of the ownership chain
const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        schema_column!("id", &SqlType::Integer, is_primary_key = true),
        schema_column!("name", &SqlType::Text, non_null = true),
        schema_column!("mbid", &SqlType::Text, is_unique = true), // MusicBrainz UUID
        schema_column!("url", &SqlType::Text),
    ],
    indices: &[("idx_artists_name", "name")],
    unique_constraints: &[],
};

/// Albums table - each album belongs to exactly one artist
const ALBUMS_TABLE: Table = Table {
    name: "albums",
    columns: &[
        schema_column!("id", &SqlType::Integer, is_primary_key = true),
        schema_column!("name", &SqlType::Text, non_null = true),
        schema_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ARTIST_FK)
        ),
        schema_column!("mbid", &SqlType::Text, is_unique = true),
        schema_column!("url", &SqlType::Text),
    ],
    indices: &[("idx_albums_artist", "artist_id")],
    unique_constraints: &[&["name", "artist_id"]],
};

/// Tracks table - album is nullable, singles have none
const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        schema_column!("id", &SqlType::Integer, is_primary_key = true),
        schema_column!("name", &SqlType::Text, non_null = true),
        schema_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ARTIST_FK)
        ),
        schema_column!("album_id", &SqlType::Integer, foreign_key = Some(&ALBUM_FK)),
        schema_column!("mbid", &SqlType::Text, is_unique = true),
        schema_column!("url", &SqlType::Text),
        schema_column!("duration", &SqlType::Integer), // seconds
    ],
    indices: &[
        ("idx_tracks_artist", "artist_id"),
        ("idx_tracks_album", "album_id"),
    ],
    unique_constraints: &[],
};

/// Scrobbles table - append-only play events
const SCROBBLES_TABLE: Table = Table {
    name: "scrobbles",
    columns: &[
        schema_column!("id", &SqlType::Integer, is_primary_key = true),
        schema_column!(
            "track_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&TRACK_FK)
        ),
        schema_column!("timestamp", &SqlType::Integer, non_null = true), // unix seconds UTC
        schema_column!("source_ref", &SqlType::Text), // external source identifier
    ],
    indices: &[
        ("idx_scrobbles_timestamp", "timestamp"),
        ("idx_scrobbles_track", "track_id"),
    ],
    unique_constraints: &[&["track_id", "timestamp"]],
};

// =============================================================================
// Sync State
// =============================================================================

/// Singleton row tracking the external ingestion process
const SYNC_STATUS_TABLE: Table = Table {
    name: "sync_status",
    columns: &[
        schema_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            check = Some("id = 1")
        ),
        schema_column!(
            "status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'idle'")
        ), // 'idle', 'syncing', 'success', 'error'
        schema_column!("last_sync_timestamp", &SqlType::Integer),
        schema_column!(
            "sync_count",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        schema_column!("error_message", &SqlType::Text),
    ],
    indices: &[],
    unique_constraints: &[],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const SCROBBLE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        ARTISTS_TABLE,
        ALBUMS_TABLE,
        TRACKS_TABLE,
        SCROBBLES_TABLE,
        SYNC_STATUS_TABLE,
    ],
    migration: None,
}];
