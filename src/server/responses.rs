//! Response DTOs for the stats endpoints.
//!
//! Each endpoint's field set is a contract: names, nesting and nullability
//! match the documented shapes exactly. Timestamps serialize as ISO-8601
//! with a `Z` suffix and no fractional seconds, dates as `YYYY-MM-DD`.

use crate::scrobble_store::{
    AlbumTrackRow, RecentTrackRow, SyncStatus, TopAlbumRow, TopArtistRow, TopTrackRow,
};
use crate::stats::{
    AlbumDetails, ArtistDetails, ChartSeries, Dashboard, RecentPage, Summary, TrackDetails,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(datetime) => datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => String::new(),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `M:SS`, e.g. 309 seconds formats as `5:09`.
fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

// =============================================================================
// Recent Tracks
// =============================================================================

#[derive(Serialize)]
pub struct RecentTrackDto {
    pub track: String,
    pub artist: String,
    pub album: Option<String>,
    pub timestamp: String,
}

impl From<&RecentTrackRow> for RecentTrackDto {
    fn from(row: &RecentTrackRow) -> Self {
        Self {
            track: row.track.clone(),
            artist: row.artist.clone(),
            album: row.album.clone(),
            timestamp: format_timestamp(row.timestamp),
        }
    }
}

#[derive(Serialize)]
pub struct RecentTracksResponse {
    pub results: Vec<RecentTrackDto>,
    pub count: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<&RecentPage> for RecentTracksResponse {
    fn from(page: &RecentPage) -> Self {
        let results: Vec<RecentTrackDto> = page.rows.iter().map(Into::into).collect();
        Self {
            count: results.len(),
            results,
            has_next: page.has_next,
            has_previous: page.has_previous,
        }
    }
}

// =============================================================================
// Top Lists
// =============================================================================

#[derive(Serialize)]
pub struct TopArtistDto {
    pub id: i64,
    pub name: String,
    pub mbid: Option<String>,
    pub url: Option<String>,
    pub track_count: u64,
    pub album_count: u64,
    pub scrobble_count: u64,
    pub last_scrobbled: Option<String>,
}

impl From<&TopArtistRow> for TopArtistDto {
    fn from(row: &TopArtistRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            mbid: row.mbid.clone(),
            url: row.url.clone(),
            track_count: row.track_count,
            album_count: row.album_count,
            scrobble_count: row.scrobble_count,
            last_scrobbled: row.last_scrobbled.map(format_timestamp),
        }
    }
}

#[derive(Serialize)]
pub struct TopAlbumDto {
    pub album: String,
    pub artist: String,
    pub scrobble_count: u64,
    pub mbid: Option<String>,
}

impl From<&TopAlbumRow> for TopAlbumDto {
    fn from(row: &TopAlbumRow) -> Self {
        Self {
            album: row.album.clone(),
            artist: row.artist.clone(),
            scrobble_count: row.scrobble_count,
            mbid: row.mbid.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct TopTrackDto {
    pub track: String,
    pub artist: String,
    pub album: Option<String>,
    pub scrobble_count: u64,
    pub mbid: Option<String>,
}

impl From<&TopTrackRow> for TopTrackDto {
    fn from(row: &TopTrackRow) -> Self {
        Self {
            track: row.track.clone(),
            artist: row.artist.clone(),
            album: row.album.clone(),
            scrobble_count: row.scrobble_count,
            mbid: row.mbid.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct TopListResponse<T: Serialize> {
    pub period: String,
    pub results: Vec<T>,
    pub count: usize,
    pub total_scrobbles: u64,
}

impl<T: Serialize> TopListResponse<T> {
    pub fn new(period: String, results: Vec<T>, total_scrobbles: u64) -> Self {
        Self {
            period,
            count: results.len(),
            results,
            total_scrobbles,
        }
    }
}

// =============================================================================
// Chart
// =============================================================================

#[derive(Serialize)]
pub struct ChartPointDto {
    pub period: String,
    pub scrobble_count: u64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize)]
pub struct ChartResponse {
    pub period: String,
    pub granularity: String,
    pub data: Vec<ChartPointDto>,
    pub total_scrobbles: u64,
}

impl ChartResponse {
    pub fn new(period: String, series: &ChartSeries) -> Self {
        Self {
            period,
            granularity: series.granularity.as_str().to_string(),
            data: chart_data(series),
            total_scrobbles: series.total_scrobbles,
        }
    }
}

fn chart_data(series: &ChartSeries) -> Vec<ChartPointDto> {
    series
        .points
        .iter()
        .map(|point| ChartPointDto {
            period: point.period.clone(),
            scrobble_count: point.scrobble_count,
            start_date: format_date(point.start_date),
            end_date: format_date(point.end_date),
        })
        .collect()
}

/// The `chart_data` object embedded in entity detail responses.
#[derive(Serialize)]
pub struct EmbeddedChartDto {
    pub granularity: String,
    pub data: Vec<ChartPointDto>,
}

impl From<&ChartSeries> for EmbeddedChartDto {
    fn from(series: &ChartSeries) -> Self {
        Self {
            granularity: series.granularity.as_str().to_string(),
            data: chart_data(series),
        }
    }
}

// =============================================================================
// Summary
// =============================================================================

#[derive(Serialize)]
pub struct SummaryTotalsDto {
    pub scrobbles: u64,
    pub artists: u64,
    pub albums: u64,
    pub tracks: u64,
}

#[derive(Serialize)]
pub struct DateRangeDto {
    pub first_scrobble: Option<String>,
    pub last_scrobble: Option<String>,
    pub total_days: u64,
}

#[derive(Serialize)]
pub struct TopAllTimeArtistDto {
    pub name: String,
    pub scrobble_count: u64,
}

#[derive(Serialize)]
pub struct TopAllTimeAlbumDto {
    pub name: String,
    pub artist: String,
    pub scrobble_count: u64,
}

#[derive(Serialize)]
pub struct TopAllTimeTrackDto {
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub scrobble_count: u64,
}

#[derive(Serialize)]
pub struct TopAllTimeDto {
    pub artist: Option<TopAllTimeArtistDto>,
    pub album: Option<TopAllTimeAlbumDto>,
    pub track: Option<TopAllTimeTrackDto>,
}

pub fn top_all_time_dto(
    artist: &Option<TopArtistRow>,
    album: &Option<TopAlbumRow>,
    track: &Option<TopTrackRow>,
) -> TopAllTimeDto {
    TopAllTimeDto {
        artist: artist.as_ref().map(|row| TopAllTimeArtistDto {
            name: row.name.clone(),
            scrobble_count: row.scrobble_count,
        }),
        album: album.as_ref().map(|row| TopAllTimeAlbumDto {
            name: row.album.clone(),
            artist: row.artist.clone(),
            scrobble_count: row.scrobble_count,
        }),
        track: track.as_ref().map(|row| TopAllTimeTrackDto {
            name: row.track.clone(),
            artist: row.artist.clone(),
            album: row.album.clone(),
            scrobble_count: row.scrobble_count,
        }),
    }
}

#[derive(Serialize)]
pub struct AveragesDto {
    pub per_day: f64,
    pub per_month: f64,
    pub per_year: f64,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub totals: SummaryTotalsDto,
    pub date_range: DateRangeDto,
    pub top_all_time: TopAllTimeDto,
    pub averages: AveragesDto,
}

impl From<&Summary> for SummaryResponse {
    fn from(summary: &Summary) -> Self {
        Self {
            totals: SummaryTotalsDto {
                scrobbles: summary.total_scrobbles,
                artists: summary.artists,
                albums: summary.albums,
                tracks: summary.tracks,
            },
            date_range: DateRangeDto {
                first_scrobble: summary.bounds.map(|b| format_timestamp(b.first)),
                last_scrobble: summary.bounds.map(|b| format_timestamp(b.last)),
                total_days: summary.total_days,
            },
            top_all_time: top_all_time_dto(
                &summary.top_artist,
                &summary.top_album,
                &summary.top_track,
            ),
            averages: AveragesDto {
                per_day: summary.per_day,
                per_month: summary.per_month,
                per_year: summary.per_year,
            },
        }
    }
}

// =============================================================================
// Entity Details
// =============================================================================

#[derive(Serialize)]
pub struct AlbumTrackDto {
    pub track: String,
    pub scrobble_count: u64,
    pub mbid: Option<String>,
}

impl From<&AlbumTrackRow> for AlbumTrackDto {
    fn from(row: &AlbumTrackRow) -> Self {
        Self {
            track: row.track.clone(),
            scrobble_count: row.scrobble_count,
            mbid: row.mbid.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ArtistSummaryDto {
    pub name: String,
    pub mbid: Option<String>,
    pub total_scrobbles: u64,
    pub first_scrobble: Option<String>,
    pub last_scrobble: Option<String>,
}

#[derive(Serialize)]
pub struct ArtistDetailsResponse {
    pub artist: ArtistSummaryDto,
    pub top_albums: Vec<TopAlbumDto>,
    pub top_tracks: Vec<TopTrackDto>,
    pub chart_data: EmbeddedChartDto,
}

impl From<&ArtistDetails> for ArtistDetailsResponse {
    fn from(details: &ArtistDetails) -> Self {
        Self {
            artist: ArtistSummaryDto {
                name: details.artist.name.clone(),
                mbid: details.artist.mbid.clone(),
                total_scrobbles: details.total_scrobbles,
                first_scrobble: details.bounds.map(|b| format_timestamp(b.first)),
                last_scrobble: details.bounds.map(|b| format_timestamp(b.last)),
            },
            top_albums: details.top_albums.iter().map(Into::into).collect(),
            top_tracks: details.top_tracks.iter().map(Into::into).collect(),
            chart_data: (&details.chart).into(),
        }
    }
}

#[derive(Serialize)]
pub struct AlbumSummaryDto {
    pub name: String,
    pub artist: String,
    pub mbid: Option<String>,
    pub total_scrobbles: u64,
    pub first_scrobble: Option<String>,
    pub last_scrobble: Option<String>,
}

#[derive(Serialize)]
pub struct AlbumDetailsResponse {
    pub album: AlbumSummaryDto,
    pub tracks: Vec<AlbumTrackDto>,
    pub chart_data: EmbeddedChartDto,
}

impl From<&AlbumDetails> for AlbumDetailsResponse {
    fn from(details: &AlbumDetails) -> Self {
        Self {
            album: AlbumSummaryDto {
                name: details.album.name.clone(),
                artist: details.artist_name.clone(),
                mbid: details.album.mbid.clone(),
                total_scrobbles: details.total_scrobbles,
                first_scrobble: details.bounds.map(|b| format_timestamp(b.first)),
                last_scrobble: details.bounds.map(|b| format_timestamp(b.last)),
            },
            tracks: details.tracks.iter().map(Into::into).collect(),
            chart_data: (&details.chart).into(),
        }
    }
}

#[derive(Serialize)]
pub struct TrackSummaryDto {
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub mbid: Option<String>,
    pub url: Option<String>,
    pub duration: Option<u32>,
    pub duration_formatted: Option<String>,
    pub total_scrobbles: u64,
    pub first_scrobble: Option<String>,
    pub last_scrobble: Option<String>,
}

#[derive(Serialize)]
pub struct ScrobbleTimestampDto {
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct TrackDetailsResponse {
    pub track: TrackSummaryDto,
    pub recent_scrobbles: Vec<ScrobbleTimestampDto>,
}

impl From<&TrackDetails> for TrackDetailsResponse {
    fn from(details: &TrackDetails) -> Self {
        Self {
            track: TrackSummaryDto {
                name: details.track.name.clone(),
                artist: details.artist_name.clone(),
                album: details.album_name.clone(),
                mbid: details.track.mbid.clone(),
                url: details.track.url.clone(),
                duration: details.track.duration,
                duration_formatted: details.track.duration.map(format_duration),
                total_scrobbles: details.total_scrobbles,
                first_scrobble: details.bounds.map(|b| format_timestamp(b.first)),
                last_scrobble: details.bounds.map(|b| format_timestamp(b.last)),
            },
            recent_scrobbles: details
                .recent_scrobbles
                .iter()
                .map(|ts| ScrobbleTimestampDto {
                    timestamp: format_timestamp(*ts),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Sync Status
// =============================================================================

#[derive(Serialize)]
pub struct SyncStatusDto {
    pub status: String,
    pub last_sync: Option<String>,
    pub sync_count: u64,
    pub error_message: Option<String>,
}

impl From<&SyncStatus> for SyncStatusDto {
    fn from(status: &SyncStatus) -> Self {
        Self {
            status: status.status.as_str().to_string(),
            last_sync: status.last_sync_timestamp.map(format_timestamp),
            sync_count: status.sync_count,
            error_message: status.error_message.clone(),
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Serialize)]
pub struct DashboardCountsDto {
    pub total_scrobbles: u64,
    pub unique_artists: u64,
    pub unique_albums: u64,
    pub unique_tracks: u64,
}

#[derive(Serialize)]
pub struct ListeningStreakDto {
    pub current_streak: u64,
    pub longest_streak: u64,
    pub last_scrobble_date: Option<String>,
    pub streak_start_date: Option<String>,
}

#[derive(Serialize)]
pub struct ListeningTimeDto {
    pub estimated_total_seconds: u64,
    pub estimated_total_hours: f64,
    pub estimated_total_days: f64,
    pub average_track_duration: f64,
    pub tracks_with_duration: u64,
}

#[derive(Serialize)]
pub struct RecentActivityDto {
    pub scrobbles_7_days: u64,
    pub scrobbles_30_days: u64,
    pub daily_average_7_days: f64,
    pub daily_average_30_days: f64,
}

#[derive(Serialize)]
pub struct DashboardTopItemsDto {
    pub top_artist: Option<TopAllTimeArtistDto>,
    pub top_album: Option<TopAllTimeAlbumDto>,
    pub top_track: Option<TopAllTimeTrackDto>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub counts: DashboardCountsDto,
    pub listening_streak: ListeningStreakDto,
    pub listening_time: ListeningTimeDto,
    pub recent_activity: RecentActivityDto,
    pub top_items: DashboardTopItemsDto,
    pub sync_status: SyncStatusDto,
}

impl From<&Dashboard> for DashboardResponse {
    fn from(dashboard: &Dashboard) -> Self {
        let top_all_time = top_all_time_dto(
            &dashboard.top_artist,
            &dashboard.top_album,
            &dashboard.top_track,
        );
        Self {
            counts: DashboardCountsDto {
                total_scrobbles: dashboard.total_scrobbles,
                unique_artists: dashboard.unique_artists,
                unique_albums: dashboard.unique_albums,
                unique_tracks: dashboard.unique_tracks,
            },
            listening_streak: ListeningStreakDto {
                current_streak: dashboard.streak.current_streak,
                longest_streak: dashboard.streak.longest_streak,
                last_scrobble_date: dashboard.streak.last_scrobble_date.map(format_date),
                streak_start_date: dashboard.streak.streak_start_date.map(format_date),
            },
            listening_time: ListeningTimeDto {
                estimated_total_seconds: dashboard.listening_time.estimated_total_seconds,
                estimated_total_hours: dashboard.listening_time.estimated_total_hours,
                estimated_total_days: dashboard.listening_time.estimated_total_days,
                average_track_duration: dashboard.listening_time.average_track_duration,
                tracks_with_duration: dashboard.listening_time.tracks_with_duration,
            },
            recent_activity: RecentActivityDto {
                scrobbles_7_days: dashboard.recent_activity.scrobbles_7_days,
                scrobbles_30_days: dashboard.recent_activity.scrobbles_30_days,
                daily_average_7_days: dashboard.recent_activity.daily_average_7_days,
                daily_average_30_days: dashboard.recent_activity.daily_average_30_days,
            },
            top_items: DashboardTopItemsDto {
                top_artist: top_all_time.artist,
                top_album: top_all_time.album,
                top_track: top_all_time.track,
            },
            sync_status: (&dashboard.sync_status).into(),
        }
    }
}
