//! SQLite-backed scrobble store implementation.
//!
//! One mutex-guarded writer connection plus a small round-robin pool of
//! read-only connections, all in WAL mode. Aggregations run as single
//! statements that join display fields in place, filtered by the predicate
//! fragments from `query.rs`.

use super::models::*;
use super::query::Predicates;
use super::schema::SCROBBLE_VERSIONED_SCHEMAS;
use super::trait_def::{AlbumTrackOrdering, Scope, ScrobbleStore};
use crate::sqlite_persistence::BASE_DB_VERSION;
use crate::stats::{Granularity, TimeWindow};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

const DEFAULT_READ_POOL_SIZE: usize = 4;

/// SQLite-backed store for the listening history.
#[derive(Clone)]
pub struct SqliteScrobbleStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = SCROBBLE_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &SCROBBLE_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        info!("Creating scrobble db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + latest_version)?;
        return Ok(());
    }

    let mut current_version = if db_version < BASE_DB_VERSION as i64 {
        0
    } else {
        (db_version - BASE_DB_VERSION as i64) as usize
    };

    if current_version >= latest_version {
        latest_schema.validate(conn)?;
        return Ok(());
    }

    let tx = conn.transaction()?;
    for schema in SCROBBLE_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
        if let Some(migration_fn) = schema.migration {
            info!(
                "Migrating scrobble db from version {} to {}",
                current_version, schema.version
            );
            migration_fn(&tx)?;
            current_version = schema.version;
        }
    }
    tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
    tx.commit()?;

    latest_schema.validate(conn)?;
    Ok(())
}

impl SqliteScrobbleStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::with_read_pool_size(db_path, DEFAULT_READ_POOL_SIZE)
    }

    pub fn with_read_pool_size<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open scrobble database")?;

        write_conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate_if_needed(&mut write_conn)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let scrobble_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM scrobbles", [], |r| r.get(0))
            .unwrap_or(0);
        let artist_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))
            .unwrap_or(0);

        info!(
            "Opened scrobble db: {} scrobbles across {} artists",
            scrobble_count, artist_count
        );

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteScrobbleStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn parse_artist_row(row: &rusqlite::Row) -> rusqlite::Result<Artist> {
        Ok(Artist {
            id: row.get(0)?,
            name: row.get(1)?,
            mbid: row.get(2)?,
            url: row.get(3)?,
        })
    }

    fn parse_album_row(row: &rusqlite::Row) -> rusqlite::Result<Album> {
        Ok(Album {
            id: row.get(0)?,
            name: row.get(1)?,
            artist_id: row.get(2)?,
            mbid: row.get(3)?,
            url: row.get(4)?,
        })
    }

    fn parse_track_row(row: &rusqlite::Row) -> rusqlite::Result<Track> {
        Ok(Track {
            id: row.get(0)?,
            name: row.get(1)?,
            artist_id: row.get(2)?,
            album_id: row.get(3)?,
            mbid: row.get(4)?,
            url: row.get(5)?,
            duration: row.get::<_, Option<i64>>(6)?.map(|d| d as u32),
        })
    }
}

impl ScrobbleStore for SqliteScrobbleStore {
    fn top_artists(&self, window: &TimeWindow, limit: u32) -> Result<Vec<TopArtistRow>> {
        let predicates = Predicates::new().window(window);
        let sql = format!(
            "SELECT a.id, a.name, a.mbid, a.url, \
                    COUNT(DISTINCT s.track_id), COUNT(DISTINCT t.album_id), \
                    COUNT(s.id), MAX(s.timestamp) \
             FROM scrobbles s \
             JOIN tracks t ON t.id = s.track_id \
             JOIN artists a ON a.id = t.artist_id \
             {} \
             GROUP BY a.id \
             ORDER BY COUNT(s.id) DESC, a.id ASC \
             LIMIT ?",
            predicates.where_sql()
        );

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(
                params_from_iter(predicates.into_params(&[limit as i64])),
                |row| {
                    Ok(TopArtistRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        mbid: row.get(2)?,
                        url: row.get(3)?,
                        track_count: row.get::<_, i64>(4)? as u64,
                        album_count: row.get::<_, i64>(5)? as u64,
                        scrobble_count: row.get::<_, i64>(6)? as u64,
                        last_scrobbled: row.get(7)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn top_albums(
        &self,
        window: &TimeWindow,
        limit: u32,
        scope: Scope,
    ) -> Result<Vec<TopAlbumRow>> {
        let predicates = Predicates::new().window(window).scope(scope);
        let sql = format!(
            "SELECT al.id, al.name, ar.name, COUNT(s.id), al.mbid \
             FROM scrobbles s \
             JOIN tracks t ON t.id = s.track_id \
             JOIN albums al ON al.id = t.album_id \
             JOIN artists ar ON ar.id = al.artist_id \
             {} \
             GROUP BY al.id \
             ORDER BY COUNT(s.id) DESC, al.id ASC \
             LIMIT ?",
            predicates.where_sql()
        );

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(
                params_from_iter(predicates.into_params(&[limit as i64])),
                |row| {
                    Ok(TopAlbumRow {
                        id: row.get(0)?,
                        album: row.get(1)?,
                        artist: row.get(2)?,
                        scrobble_count: row.get::<_, i64>(3)? as u64,
                        mbid: row.get(4)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn top_tracks(
        &self,
        window: &TimeWindow,
        limit: u32,
        scope: Scope,
    ) -> Result<Vec<TopTrackRow>> {
        let predicates = Predicates::new().window(window).scope(scope);
        let sql = format!(
            "SELECT t.id, t.name, ar.name, al.name, COUNT(s.id), t.mbid \
             FROM scrobbles s \
             JOIN tracks t ON t.id = s.track_id \
             JOIN artists ar ON ar.id = t.artist_id \
             LEFT JOIN albums al ON al.id = t.album_id \
             {} \
             GROUP BY t.id \
             ORDER BY COUNT(s.id) DESC, t.id ASC \
             LIMIT ?",
            predicates.where_sql()
        );

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(
                params_from_iter(predicates.into_params(&[limit as i64])),
                |row| {
                    Ok(TopTrackRow {
                        id: row.get(0)?,
                        track: row.get(1)?,
                        artist: row.get(2)?,
                        album: row.get(3)?,
                        scrobble_count: row.get::<_, i64>(4)? as u64,
                        mbid: row.get(5)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn recent_tracks(&self, limit: u32, offset: u64) -> Result<Vec<RecentTrackRow>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT t.name, ar.name, al.name, s.timestamp \
             FROM scrobbles s \
             JOIN tracks t ON t.id = s.track_id \
             JOIN artists ar ON ar.id = t.artist_id \
             LEFT JOIN albums al ON al.id = t.album_id \
             ORDER BY s.timestamp DESC, s.id DESC \
             LIMIT ? OFFSET ?",
        )?;
        let rows = stmt
            .query_map(params![limit as i64, offset as i64], |row| {
                Ok(RecentTrackRow {
                    track: row.get(0)?,
                    artist: row.get(1)?,
                    album: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn chart_buckets(
        &self,
        window: &TimeWindow,
        granularity: Granularity,
        scope: Scope,
    ) -> Result<Vec<ChartBucketRow>> {
        let predicates = Predicates::new().window(window).scope(scope);
        let sql = format!(
            "SELECT strftime('{}', s.timestamp, 'unixepoch') AS bucket, COUNT(s.id) \
             FROM scrobbles s \
             JOIN tracks t ON t.id = s.track_id \
             {} \
             GROUP BY bucket \
             ORDER BY bucket ASC",
            granularity.strftime_format(),
            predicates.where_sql()
        );

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(predicates.into_params(&[])), |row| {
                Ok(ChartBucketRow {
                    bucket: row.get(0)?,
                    scrobble_count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn scrobble_count(&self, window: &TimeWindow, scope: Scope) -> Result<u64> {
        let predicates = Predicates::new().window(window).scope(scope);
        let sql = format!(
            "SELECT COUNT(s.id) \
             FROM scrobbles s \
             JOIN tracks t ON t.id = s.track_id \
             {}",
            predicates.where_sql()
        );

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &sql,
            params_from_iter(predicates.into_params(&[])),
            |r| r.get(0),
        )?;
        Ok(count as u64)
    }

    fn scrobble_bounds(
        &self,
        window: &TimeWindow,
        scope: Scope,
    ) -> Result<Option<ScrobbleBounds>> {
        let predicates = Predicates::new().window(window).scope(scope);
        let sql = format!(
            "SELECT MIN(s.timestamp), MAX(s.timestamp) \
             FROM scrobbles s \
             JOIN tracks t ON t.id = s.track_id \
             {}",
            predicates.where_sql()
        );

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let bounds: (Option<i64>, Option<i64>) = conn.query_row(
            &sql,
            params_from_iter(predicates.into_params(&[])),
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(match bounds {
            (Some(first), Some(last)) => Some(ScrobbleBounds { first, last }),
            _ => None,
        })
    }

    fn entity_counts(&self) -> Result<EntityCounts> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let count = |table: &str| -> Result<u64> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok(n as u64)
        };
        Ok(EntityCounts {
            artists: count("artists")?,
            albums: count("albums")?,
            tracks: count("tracks")?,
            scrobbles: count("scrobbles")?,
        })
    }

    fn scrobbled_entity_counts(&self) -> Result<ScrobbledEntityCounts> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let (artists, albums, tracks): (i64, i64, i64) = conn.query_row(
            "SELECT COUNT(DISTINCT t.artist_id), COUNT(DISTINCT t.album_id), \
                    COUNT(DISTINCT s.track_id) \
             FROM scrobbles s \
             JOIN tracks t ON t.id = s.track_id",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )?;
        Ok(ScrobbledEntityCounts {
            artists: artists as u64,
            albums: albums as u64,
            tracks: tracks as u64,
        })
    }

    fn track_duration_stats(&self) -> Result<TrackDurationStats> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let (average, with_duration): (Option<f64>, i64) = conn.query_row(
            "SELECT AVG(duration), COUNT(*) FROM tracks WHERE duration IS NOT NULL",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(TrackDurationStats {
            average_seconds: average,
            tracks_with_duration: with_duration as u64,
        })
    }

    fn distinct_scrobble_dates_desc(&self) -> Result<Vec<NaiveDate>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT DISTINCT date(timestamp, 'unixepoch') AS day \
             FROM scrobbles ORDER BY day DESC",
        )?;
        let days = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        days.iter()
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date from store: {}", d))
            })
            .collect()
    }

    fn latest_scrobble_timestamp(&self) -> Result<Option<i64>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let latest: Option<i64> =
            conn.query_row("SELECT MAX(timestamp) FROM scrobbles", [], |r| r.get(0))?;
        Ok(latest)
    }

    fn get_artist(&self, id: i64) -> Result<Option<Artist>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, name, mbid, url FROM artists WHERE id = ?1",
                params![id],
                Self::parse_artist_row,
            )
            .optional()?)
    }

    fn get_artist_by_mbid(&self, mbid: &str) -> Result<Option<Artist>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, name, mbid, url FROM artists WHERE mbid = ?1",
                params![mbid],
                Self::parse_artist_row,
            )
            .optional()?)
    }

    fn get_album(&self, id: i64) -> Result<Option<Album>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, name, artist_id, mbid, url FROM albums WHERE id = ?1",
                params![id],
                Self::parse_album_row,
            )
            .optional()?)
    }

    fn get_album_by_mbid(&self, mbid: &str) -> Result<Option<Album>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, name, artist_id, mbid, url FROM albums WHERE mbid = ?1",
                params![mbid],
                Self::parse_album_row,
            )
            .optional()?)
    }

    fn get_track(&self, id: i64) -> Result<Option<Track>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, name, artist_id, album_id, mbid, url, duration \
                 FROM tracks WHERE id = ?1",
                params![id],
                Self::parse_track_row,
            )
            .optional()?)
    }

    fn get_track_by_mbid(&self, mbid: &str) -> Result<Option<Track>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, name, artist_id, album_id, mbid, url, duration \
                 FROM tracks WHERE mbid = ?1",
                params![mbid],
                Self::parse_track_row,
            )
            .optional()?)
    }

    fn album_tracks(
        &self,
        album_id: i64,
        window: &TimeWindow,
        ordering: AlbumTrackOrdering,
    ) -> Result<Vec<AlbumTrackRow>> {
        // The window predicate lives in the join's ON clause so tracks with
        // no in-window scrobbles still appear with a zero count.
        let predicates = Predicates::new().window(window);
        let order = match ordering {
            AlbumTrackOrdering::ScrobbleCount => "COUNT(s.id) DESC, t.id ASC",
            AlbumTrackOrdering::AlbumOrder => "t.id ASC",
        };
        let sql = format!(
            "SELECT t.id, t.name, COUNT(s.id), t.mbid \
             FROM tracks t \
             LEFT JOIN scrobbles s ON s.track_id = t.id {} \
             WHERE t.album_id = ? \
             GROUP BY t.id \
             ORDER BY {}",
            predicates.and_sql(),
            order
        );

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(predicates.into_params(&[album_id])), |row| {
                Ok(AlbumTrackRow {
                    id: row.get(0)?,
                    track: row.get(1)?,
                    scrobble_count: row.get::<_, i64>(2)? as u64,
                    mbid: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn track_scrobble_timestamps(
        &self,
        track_id: i64,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<i64>> {
        let predicates = Predicates::new().window(window).raw("s.track_id = ?", track_id);
        let sql = format!(
            "SELECT s.timestamp FROM scrobbles s {} \
             ORDER BY s.timestamp DESC LIMIT ?",
            predicates.where_sql()
        );

        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&sql)?;
        let timestamps = stmt
            .query_map(params_from_iter(predicates.into_params(&[limit as i64])), |row| {
                row.get(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(timestamps)
    }

    fn get_or_create_artist(
        &self,
        name: &str,
        mbid: Option<&str>,
        url: Option<&str>,
    ) -> Result<Artist> {
        let conn = self.write_conn.lock().unwrap();

        if let Some(mbid) = mbid {
            let existing = conn
                .query_row(
                    "SELECT id, name, mbid, url FROM artists WHERE mbid = ?1",
                    params![mbid],
                    Self::parse_artist_row,
                )
                .optional()?;
            if let Some(artist) = existing {
                return Ok(artist);
            }
        }

        let existing = conn
            .query_row(
                "SELECT id, name, mbid, url FROM artists WHERE name = ?1",
                params![name],
                Self::parse_artist_row,
            )
            .optional()?;
        if let Some(artist) = existing {
            return Ok(artist);
        }

        conn.execute(
            "INSERT INTO artists (name, mbid, url) VALUES (?1, ?2, ?3)",
            params![name, mbid, url],
        )?;
        Ok(Artist {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            mbid: mbid.map(String::from),
            url: url.map(String::from),
        })
    }

    fn get_or_create_album(
        &self,
        name: &str,
        artist_id: i64,
        mbid: Option<&str>,
        url: Option<&str>,
    ) -> Result<Album> {
        let conn = self.write_conn.lock().unwrap();

        if let Some(mbid) = mbid {
            let existing = conn
                .query_row(
                    "SELECT id, name, artist_id, mbid, url FROM albums WHERE mbid = ?1",
                    params![mbid],
                    Self::parse_album_row,
                )
                .optional()?;
            if let Some(album) = existing {
                return Ok(album);
            }
        }

        let existing = conn
            .query_row(
                "SELECT id, name, artist_id, mbid, url FROM albums \
                 WHERE name = ?1 AND artist_id = ?2",
                params![name, artist_id],
                Self::parse_album_row,
            )
            .optional()?;
        if let Some(album) = existing {
            return Ok(album);
        }

        conn.execute(
            "INSERT INTO albums (name, artist_id, mbid, url) VALUES (?1, ?2, ?3, ?4)",
            params![name, artist_id, mbid, url],
        )?;
        Ok(Album {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            artist_id,
            mbid: mbid.map(String::from),
            url: url.map(String::from),
        })
    }

    fn get_or_create_track(
        &self,
        name: &str,
        artist_id: i64,
        album_id: Option<i64>,
        mbid: Option<&str>,
        url: Option<&str>,
        duration: Option<u32>,
    ) -> Result<Track> {
        let conn = self.write_conn.lock().unwrap();

        if let Some(mbid) = mbid {
            let existing = conn
                .query_row(
                    "SELECT id, name, artist_id, album_id, mbid, url, duration \
                     FROM tracks WHERE mbid = ?1",
                    params![mbid],
                    Self::parse_track_row,
                )
                .optional()?;
            if let Some(track) = existing {
                return Ok(track);
            }
        }

        // IS matches a bound NULL, unlike =
        let existing = conn
            .query_row(
                "SELECT id, name, artist_id, album_id, mbid, url, duration \
                 FROM tracks WHERE name = ?1 AND artist_id = ?2 AND album_id IS ?3",
                params![name, artist_id, album_id],
                Self::parse_track_row,
            )
            .optional()?;
        if let Some(track) = existing {
            return Ok(track);
        }

        conn.execute(
            "INSERT INTO tracks (name, artist_id, album_id, mbid, url, duration) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![name, artist_id, album_id, mbid, url, duration],
        )?;
        Ok(Track {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            artist_id,
            album_id,
            mbid: mbid.map(String::from),
            url: url.map(String::from),
            duration,
        })
    }

    fn record_scrobble(
        &self,
        track_id: i64,
        timestamp: i64,
        source_ref: Option<&str>,
    ) -> Result<bool> {
        let conn = self.write_conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO scrobbles (track_id, timestamp, source_ref) \
             VALUES (?1, ?2, ?3)",
            params![track_id, timestamp, source_ref],
        )?;
        Ok(inserted > 0)
    }

    fn get_sync_status(&self) -> Result<SyncStatus> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        let status = conn
            .query_row(
                "SELECT status, last_sync_timestamp, sync_count, error_message \
                 FROM sync_status WHERE id = 1",
                [],
                |row| {
                    Ok(SyncStatus {
                        status: SyncState::from_str(&row.get::<_, String>(0)?),
                        last_sync_timestamp: row.get(1)?,
                        sync_count: row.get::<_, i64>(2)? as u64,
                        error_message: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(status.unwrap_or_default())
    }

    fn update_sync_status(&self, status: &SyncStatus) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sync_status (id, status, last_sync_timestamp, sync_count, error_message) \
             VALUES (1, ?1, ?2, ?3, ?4) \
             ON CONFLICT(id) DO UPDATE SET \
                 status = excluded.status, \
                 last_sync_timestamp = excluded.last_sync_timestamp, \
                 sync_count = excluded.sync_count, \
                 error_message = excluded.error_message",
            params![
                status.status.as_str(),
                status.last_sync_timestamp,
                status.sync_count as i64,
                status.error_message
            ],
        )?;
        Ok(())
    }

    fn ping(&self) -> Result<()> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}
