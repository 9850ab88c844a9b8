//! Aggregation engine for the stats endpoints.
//!
//! Each operation takes a resolved time window, runs the store aggregations
//! it needs, and returns a typed result for the response assembler. Entity
//! lookups accept a numeric id or an mbid: a key that parses as a UUID is
//! treated as an mbid, a key that parses as an integer as an id, anything
//! else misses.

use super::error::StatsError;
use super::granularity::{Granularity, MAX_CHART_POINTS};
use super::time_window::{ResolvedWindow, TimeWindow};
use crate::scrobble_store::{
    Album, AlbumTrackOrdering, AlbumTrackRow, Artist, RecentTrackRow, Scope, ScrobbleBounds,
    ScrobbleStore, SyncStatus, TopAlbumRow, TopArtistRow, TopTrackRow, Track,
};
use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Fallback average track duration when no track carries one, in seconds.
const DEFAULT_TRACK_DURATION_SEC: f64 = 210.0;

const DETAIL_TOP_LIMIT: u32 = 10;
const DETAIL_RECENT_SCROBBLES: u32 = 10;

const AVG_DAYS_PER_MONTH: f64 = 30.44;
const AVG_DAYS_PER_YEAR: f64 = 365.25;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn timestamp_date(timestamp: i64) -> Result<NaiveDate, StatsError> {
    Ok(DateTime::<Utc>::from_timestamp(timestamp, 0)
        .with_context(|| format!("Timestamp out of range: {}", timestamp))?
        .date_naive())
}

/// A ranked list plus the window's total scrobble count for context.
#[derive(Debug, Clone)]
pub struct TopList<T> {
    pub rows: Vec<T>,
    pub total_scrobbles: u64,
}

#[derive(Debug, Clone)]
pub struct RecentPage {
    pub rows: Vec<RecentTrackRow>,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone)]
pub struct ChartPoint {
    pub period: String,
    pub scrobble_count: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub granularity: Granularity,
    pub points: Vec<ChartPoint>,
    pub total_scrobbles: u64,
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub total_scrobbles: u64,
    pub artists: u64,
    pub albums: u64,
    pub tracks: u64,
    pub bounds: Option<ScrobbleBounds>,
    pub total_days: u64,
    pub top_artist: Option<TopArtistRow>,
    pub top_album: Option<TopAlbumRow>,
    pub top_track: Option<TopTrackRow>,
    pub per_day: f64,
    pub per_month: f64,
    pub per_year: f64,
}

#[derive(Debug, Clone)]
pub struct ArtistDetails {
    pub artist: Artist,
    pub total_scrobbles: u64,
    pub bounds: Option<ScrobbleBounds>,
    pub top_albums: Vec<TopAlbumRow>,
    pub top_tracks: Vec<TopTrackRow>,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone)]
pub struct AlbumDetails {
    pub album: Album,
    pub artist_name: String,
    pub total_scrobbles: u64,
    pub bounds: Option<ScrobbleBounds>,
    pub tracks: Vec<AlbumTrackRow>,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone)]
pub struct TrackDetails {
    pub track: Track,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub total_scrobbles: u64,
    pub bounds: Option<ScrobbleBounds>,
    pub recent_scrobbles: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreakInfo {
    pub current_streak: u64,
    pub longest_streak: u64,
    pub last_scrobble_date: Option<NaiveDate>,
    pub streak_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ListeningTime {
    pub estimated_total_seconds: u64,
    pub estimated_total_hours: f64,
    pub estimated_total_days: f64,
    pub average_track_duration: f64,
    pub tracks_with_duration: u64,
}

#[derive(Debug, Clone)]
pub struct RecentActivity {
    pub scrobbles_7_days: u64,
    pub scrobbles_30_days: u64,
    pub daily_average_7_days: f64,
    pub daily_average_30_days: f64,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub total_scrobbles: u64,
    pub unique_artists: u64,
    pub unique_albums: u64,
    pub unique_tracks: u64,
    pub streak: StreakInfo,
    pub listening_time: ListeningTime,
    pub recent_activity: RecentActivity,
    pub top_artist: Option<TopArtistRow>,
    pub top_album: Option<TopAlbumRow>,
    pub top_track: Option<TopTrackRow>,
    pub sync_status: SyncStatus,
}

/// Runs the aggregation operations against a store.
#[derive(Clone)]
pub struct StatsEngine {
    store: Arc<dyn ScrobbleStore>,
}

impl StatsEngine {
    pub fn new(store: Arc<dyn ScrobbleStore>) -> Self {
        Self { store }
    }

    pub fn top_artists(
        &self,
        window: &ResolvedWindow,
        limit: u32,
    ) -> Result<TopList<TopArtistRow>, StatsError> {
        Ok(TopList {
            rows: self.store.top_artists(&window.window, limit)?,
            total_scrobbles: self.store.scrobble_count(&window.window, Scope::All)?,
        })
    }

    pub fn top_albums(
        &self,
        window: &ResolvedWindow,
        limit: u32,
    ) -> Result<TopList<TopAlbumRow>, StatsError> {
        Ok(TopList {
            rows: self.store.top_albums(&window.window, limit, Scope::All)?,
            total_scrobbles: self.store.scrobble_count(&window.window, Scope::All)?,
        })
    }

    pub fn top_tracks(
        &self,
        window: &ResolvedWindow,
        limit: u32,
    ) -> Result<TopList<TopTrackRow>, StatsError> {
        Ok(TopList {
            rows: self.store.top_tracks(&window.window, limit, Scope::All)?,
            total_scrobbles: self.store.scrobble_count(&window.window, Scope::All)?,
        })
    }

    /// One page of the recent-tracks feed. Fetches one extra row to learn
    /// whether a next page exists without counting the whole table.
    pub fn recent_tracks(&self, limit: u32, page: u32) -> Result<RecentPage, StatsError> {
        let offset = (page as u64 - 1) * limit as u64;
        let mut rows = self.store.recent_tracks(limit + 1, offset)?;
        let has_next = rows.len() > limit as usize;
        rows.truncate(limit as usize);
        Ok(RecentPage {
            rows,
            has_next,
            has_previous: page > 1,
        })
    }

    pub fn chart(
        &self,
        window: &ResolvedWindow,
        explicit_granularity: Option<Granularity>,
    ) -> Result<ChartSeries, StatsError> {
        self.scoped_chart(window, explicit_granularity, Scope::All)
    }

    fn scoped_chart(
        &self,
        window: &ResolvedWindow,
        explicit_granularity: Option<Granularity>,
        scope: Scope,
    ) -> Result<ChartSeries, StatsError> {
        let granularity = Granularity::effective(explicit_granularity, window.span_days);
        let buckets = self.store.chart_buckets(&window.window, granularity, scope)?;

        let mut points = Vec::with_capacity(buckets.len().min(MAX_CHART_POINTS));
        for bucket in &buckets {
            let (start_date, end_date) = granularity
                .bucket_bounds(&bucket.bucket)
                .with_context(|| format!("Unexpected bucket key: {}", bucket.bucket))?;
            points.push(ChartPoint {
                period: bucket.bucket.clone(),
                scrobble_count: bucket.scrobble_count,
                start_date,
                end_date,
            });
        }
        // Keep the most recent points when over the cap
        if points.len() > MAX_CHART_POINTS {
            points.drain(..points.len() - MAX_CHART_POINTS);
        }

        Ok(ChartSeries {
            granularity,
            points,
            total_scrobbles: self.store.scrobble_count(&window.window, scope)?,
        })
    }

    /// Global all-time snapshot. Everything is zero or absent on an empty
    /// store, never an error.
    pub fn summary(&self) -> Result<Summary, StatsError> {
        let total_scrobbles = self.store.scrobble_count(&TimeWindow::Unbounded, Scope::All)?;
        let scrobbled = self.store.scrobbled_entity_counts()?;
        let bounds = self.store.scrobble_bounds(&TimeWindow::Unbounded, Scope::All)?;

        let total_days = match bounds {
            Some(bounds) => {
                let first = timestamp_date(bounds.first)?;
                let last = timestamp_date(bounds.last)?;
                ((last - first).num_days() + 1) as u64
            }
            None => 0,
        };

        let (per_day, per_month, per_year) = if total_days > 0 {
            let days = total_days as f64;
            let total = total_scrobbles as f64;
            (
                round2(total / days),
                round2(total / (days / AVG_DAYS_PER_MONTH)),
                round2(total / (days / AVG_DAYS_PER_YEAR)),
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        Ok(Summary {
            total_scrobbles,
            artists: scrobbled.artists,
            albums: scrobbled.albums,
            tracks: scrobbled.tracks,
            bounds,
            total_days,
            top_artist: self.all_time_top_artist()?,
            top_album: self.all_time_top_album()?,
            top_track: self.all_time_top_track()?,
            per_day,
            per_month,
            per_year,
        })
    }

    pub fn artist_details(
        &self,
        key: &str,
        window: &ResolvedWindow,
    ) -> Result<ArtistDetails, StatsError> {
        let artist = self
            .lookup_artist(key)?
            .ok_or_else(|| StatsError::NotFound {
                resource: "Artist".to_string(),
            })?;
        let scope = Scope::Artist(artist.id);

        Ok(ArtistDetails {
            total_scrobbles: self.store.scrobble_count(&window.window, scope)?,
            bounds: self.store.scrobble_bounds(&window.window, scope)?,
            top_albums: self.store.top_albums(&window.window, DETAIL_TOP_LIMIT, scope)?,
            top_tracks: self.store.top_tracks(&window.window, DETAIL_TOP_LIMIT, scope)?,
            chart: self.scoped_chart(window, None, scope)?,
            artist,
        })
    }

    pub fn album_details(
        &self,
        key: &str,
        window: &ResolvedWindow,
        ordering: AlbumTrackOrdering,
    ) -> Result<AlbumDetails, StatsError> {
        let album = self.lookup_album(key)?.ok_or_else(|| StatsError::NotFound {
            resource: "Album".to_string(),
        })?;
        let artist = self
            .store
            .get_artist(album.artist_id)?
            .with_context(|| format!("Album {} has no artist row", album.id))?;
        let scope = Scope::Album(album.id);

        Ok(AlbumDetails {
            artist_name: artist.name,
            total_scrobbles: self.store.scrobble_count(&window.window, scope)?,
            bounds: self.store.scrobble_bounds(&window.window, scope)?,
            tracks: self.store.album_tracks(album.id, &window.window, ordering)?,
            chart: self.scoped_chart(window, None, scope)?,
            album,
        })
    }

    pub fn track_details(
        &self,
        key: &str,
        window: &ResolvedWindow,
    ) -> Result<TrackDetails, StatsError> {
        let track = self.lookup_track(key)?.ok_or_else(|| StatsError::NotFound {
            resource: "Track".to_string(),
        })?;
        let artist = self
            .store
            .get_artist(track.artist_id)?
            .with_context(|| format!("Track {} has no artist row", track.id))?;
        let album_name = match track.album_id {
            Some(album_id) => self.store.get_album(album_id)?.map(|album| album.name),
            None => None,
        };
        let scope = Scope::Track(track.id);

        Ok(TrackDetails {
            artist_name: artist.name,
            album_name,
            total_scrobbles: self.store.scrobble_count(&window.window, scope)?,
            bounds: self.store.scrobble_bounds(&window.window, scope)?,
            recent_scrobbles: self.store.track_scrobble_timestamps(
                track.id,
                &window.window,
                DETAIL_RECENT_SCROBBLES,
            )?,
            track,
        })
    }

    pub fn dashboard(&self, now: DateTime<Utc>) -> Result<Dashboard, StatsError> {
        let total_scrobbles = self.store.scrobble_count(&TimeWindow::Unbounded, Scope::All)?;
        let scrobbled = self.store.scrobbled_entity_counts()?;

        let dates = self.store.distinct_scrobble_dates_desc()?;
        let streak = compute_streaks(&dates, now.date_naive());

        let duration_stats = self.store.track_duration_stats()?;
        let average_track_duration = duration_stats
            .average_seconds
            .unwrap_or(DEFAULT_TRACK_DURATION_SEC);
        let estimated_total_seconds = (average_track_duration * total_scrobbles as f64) as u64;
        let listening_time = ListeningTime {
            estimated_total_seconds,
            estimated_total_hours: round2(estimated_total_seconds as f64 / 3600.0),
            estimated_total_days: round2(estimated_total_seconds as f64 / 86400.0),
            average_track_duration: round2(average_track_duration),
            tracks_with_duration: duration_stats.tracks_with_duration,
        };

        let last_7 = self
            .store
            .scrobble_count(&TimeWindow::Since(now - Duration::days(7)), Scope::All)?;
        let last_30 = self
            .store
            .scrobble_count(&TimeWindow::Since(now - Duration::days(30)), Scope::All)?;
        let recent_activity = RecentActivity {
            scrobbles_7_days: last_7,
            scrobbles_30_days: last_30,
            daily_average_7_days: round2(last_7 as f64 / 7.0),
            daily_average_30_days: round2(last_30 as f64 / 30.0),
        };

        Ok(Dashboard {
            total_scrobbles,
            unique_artists: scrobbled.artists,
            unique_albums: scrobbled.albums,
            unique_tracks: scrobbled.tracks,
            streak,
            listening_time,
            recent_activity,
            top_artist: self.all_time_top_artist()?,
            top_album: self.all_time_top_album()?,
            top_track: self.all_time_top_track()?,
            sync_status: self.store.get_sync_status()?,
        })
    }

    pub fn sync_status(&self) -> Result<SyncStatus, StatsError> {
        Ok(self.store.get_sync_status()?)
    }

    fn all_time_top_artist(&self) -> Result<Option<TopArtistRow>, StatsError> {
        Ok(self
            .store
            .top_artists(&TimeWindow::Unbounded, 1)?
            .into_iter()
            .next())
    }

    fn all_time_top_album(&self) -> Result<Option<TopAlbumRow>, StatsError> {
        Ok(self
            .store
            .top_albums(&TimeWindow::Unbounded, 1, Scope::All)?
            .into_iter()
            .next())
    }

    fn all_time_top_track(&self) -> Result<Option<TopTrackRow>, StatsError> {
        Ok(self
            .store
            .top_tracks(&TimeWindow::Unbounded, 1, Scope::All)?
            .into_iter()
            .next())
    }

    fn lookup_artist(&self, key: &str) -> Result<Option<Artist>, StatsError> {
        Ok(match parse_entity_key(key) {
            EntityKey::Mbid(mbid) => self.store.get_artist_by_mbid(&mbid)?,
            EntityKey::Id(id) => self.store.get_artist(id)?,
            EntityKey::Invalid => None,
        })
    }

    fn lookup_album(&self, key: &str) -> Result<Option<Album>, StatsError> {
        Ok(match parse_entity_key(key) {
            EntityKey::Mbid(mbid) => self.store.get_album_by_mbid(&mbid)?,
            EntityKey::Id(id) => self.store.get_album(id)?,
            EntityKey::Invalid => None,
        })
    }

    fn lookup_track(&self, key: &str) -> Result<Option<Track>, StatsError> {
        Ok(match parse_entity_key(key) {
            EntityKey::Mbid(mbid) => self.store.get_track_by_mbid(&mbid)?,
            EntityKey::Id(id) => self.store.get_track(id)?,
            EntityKey::Invalid => None,
        })
    }
}

enum EntityKey {
    Mbid(String),
    Id(i64),
    Invalid,
}

fn parse_entity_key(key: &str) -> EntityKey {
    if let Ok(uuid) = Uuid::parse_str(key) {
        // Stored mbids are lowercase hyphenated
        EntityKey::Mbid(uuid.hyphenated().to_string())
    } else if let Ok(id) = key.parse::<i64>() {
        EntityKey::Id(id)
    } else {
        EntityKey::Invalid
    }
}

/// Day-streak figures over the distinct scrobble dates, newest first.
///
/// The current streak only counts when the most recent scrobble date is
/// today or yesterday, so an unbroken run that ended last week reports a
/// current streak of zero.
fn compute_streaks(dates_desc: &[NaiveDate], today: NaiveDate) -> StreakInfo {
    let last_scrobble_date = match dates_desc.first() {
        Some(date) => *date,
        None => return StreakInfo::default(),
    };

    let mut longest = 1u64;
    let mut run = 1u64;
    for pair in dates_desc.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    let days_since_last = (today - last_scrobble_date).num_days();
    let (current, streak_start) = if (0..=1).contains(&days_since_last) {
        let mut current = 1u64;
        let mut start = last_scrobble_date;
        for pair in dates_desc.windows(2) {
            if (pair[0] - pair[1]).num_days() == 1 {
                current += 1;
                start = pair[1];
            } else {
                break;
            }
        }
        (current, Some(start))
    } else {
        (0, None)
    };

    StreakInfo {
        current_streak: current,
        longest_streak: longest,
        last_scrobble_date: Some(last_scrobble_date),
        streak_start_date: streak_start,
    }
}
