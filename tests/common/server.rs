//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own scrobble database.

use super::constants::*;
use super::fixtures::create_seeded_store;
use scrobblarr_stats_server::config::{CacheSettings, RateLimitSettings};
use scrobblarr_stats_server::scrobble_store::ScrobbleStore;
use scrobblarr_stats_server::server::state::GuardedScrobbleStore;
use scrobblarr_stats_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use scrobblarr_stats_server::stats::StatsCache;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated seeded database
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store handle for direct database access in tests
    pub store: GuardedScrobbleStore,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a test server with the seeded library, caching on and rate
    /// limiting off.
    pub async fn spawn() -> Self {
        Self::spawn_with(default_cache_settings(), disabled_rate_limit()).await
    }

    /// Spawns a test server with explicit cache and rate limit settings.
    pub async fn spawn_with(cache: CacheSettings, rate_limit: RateLimitSettings) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_db_dir.path().join("scrobbles.db");

        let store: GuardedScrobbleStore = Arc::new(
            create_seeded_store(&db_path).expect("Failed to create seeded scrobble store"),
        );
        let store_for_test = store.clone();

        let stats_cache = Arc::new(StatsCache::new(store.clone(), cache.clone()));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
            cache,
            rate_limit,
        };

        let app = make_app(config, store, stats_cache).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store: store_for_test,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Direct store access for appending scrobbles mid-test
    pub fn store(&self) -> &dyn ScrobbleStore {
        self.store.as_ref()
    }

    /// Waits for the server to become ready by polling the liveness probe
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);
        let url = format!("{}/health/liveness", self.base_url);

        loop {
            if let Ok(response) = client.get(&url).send().await {
                if response.status().is_success() {
                    return;
                }
            }
            if start.elapsed() > timeout {
                panic!("Server did not become ready within {:?}", timeout);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            tx.send(()).ok();
        }
    }
}

/// Cache settings suited to tests: caching on, but the data version is
/// looked up on every request so writes invalidate immediately.
pub fn default_cache_settings() -> CacheSettings {
    CacheSettings {
        data_version_ttl_sec: 0,
        ..CacheSettings::default()
    }
}

pub fn disabled_rate_limit() -> RateLimitSettings {
    RateLimitSettings {
        enabled: false,
        ..RateLimitSettings::default()
    }
}
