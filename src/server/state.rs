use axum::extract::FromRef;

use crate::scrobble_store::ScrobbleStore;
use crate::stats::{StatsCache, StatsEngine};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedScrobbleStore = Arc<dyn ScrobbleStore>;
pub type GuardedStatsCache = Arc<StatsCache>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedScrobbleStore,
    pub engine: StatsEngine,
    pub cache: GuardedStatsCache,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedScrobbleStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedStatsCache {
    fn from_ref(input: &ServerState) -> Self {
        input.cache.clone()
    }
}

impl FromRef<ServerState> for StatsEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.engine.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
