use anyhow::{anyhow, Result};
use std::{net::SocketAddr, sync::Arc, time::{Duration, Instant}};

use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::health::health_routes;
use super::http_layers::{log_requests, rate_limit_error_handler, IpKeyExtractor};
use super::metrics::metrics_handler;
use super::routes::stats_routes;
use super::state::{GuardedScrobbleStore, GuardedStatsCache, ServerState};
use super::ServerConfig;
use crate::stats::StatsEngine;

#[derive(Serialize)]
struct ServiceBanner {
    pub service: &'static str,
    pub version: &'static str,
    pub git_hash: String,
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServiceBanner {
        service: "scrobblarr-stats-server",
        version: env!("CARGO_PKG_VERSION"),
        git_hash: state.hash.clone(),
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

impl ServerState {
    fn new(
        config: ServerConfig,
        store: GuardedScrobbleStore,
        cache: GuardedStatsCache,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            engine: StatsEngine::new(store.clone()),
            store,
            cache,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    store: GuardedScrobbleStore,
    cache: GuardedStatsCache,
) -> Result<Router> {
    // Idempotent, covers embedded uses that skip main()
    super::metrics::init_metrics();

    let state = ServerState::new(config.clone(), store, cache);

    let api_routes: Router = stats_routes().with_state(state.clone());

    let home_router: Router = match &config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .nest("/v1", api_routes)
        .merge(health_routes().with_state(state.clone()))
        .route("/metrics", get(metrics_handler));

    if config.rate_limit.enabled {
        let interval_ms = 60_000 / u64::from(config.rate_limit.requests_per_minute.max(1));
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_millisecond(interval_ms.max(1))
                .burst_size(config.rate_limit.burst_size)
                .key_extractor(IpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow!("Invalid rate limit configuration"))?,
        );
        app = app.layer(GovernorLayer::new(governor_conf).error_handler(rate_limit_error_handler));
    }

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    store: GuardedScrobbleStore,
    cache: GuardedStatsCache,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, store, cache)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?)
}
