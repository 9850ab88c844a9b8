//! The aggregation pipeline: window resolution, bucketing, the engine and
//! the versioned response cache.

mod cache;
mod engine;
mod error;
mod granularity;
mod time_window;
pub mod validation;

pub use cache::{cache_key, canonicalize_params, StatsCache};
pub use engine::{
    AlbumDetails, ArtistDetails, ChartPoint, ChartSeries, Dashboard, ListeningTime, RecentActivity,
    RecentPage, StatsEngine, StreakInfo, Summary, TopList, TrackDetails,
};
pub use error::StatsError;
pub use granularity::{Granularity, MAX_CHART_POINTS};
pub use time_window::{resolve_window, ResolvedWindow, TimeWindow};
