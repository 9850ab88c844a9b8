use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scrobblarr_stats_server::config::{AppConfig, CliConfig, FileConfig};
use scrobblarr_stats_server::scrobble_store::{ScrobbleStore, SqliteScrobbleStore};
use scrobblarr_stats_server::server::{self, run_server, RequestsLoggingLevel, ServerConfig};
use scrobblarr_stats_server::stats::StatsCache;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the scrobble database (scrobbles.db is created inside it).
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Explicit path to the SQLite scrobble database file. Overrides --db-dir.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Path to a TOML configuration file. File values override CLI values.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    info!(
        "Starting scrobblarr stats server v{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir,
        db_path: cli_args.db_path,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        frontend_dir_path: cli_args.frontend_dir_path,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;
    info!(
        "Resolved config: port={}, cache_enabled={}, rate_limit_enabled={} ({} rpm, burst {})",
        app_config.port,
        app_config.cache.enabled,
        app_config.rate_limit.enabled,
        app_config.rate_limit.requests_per_minute,
        app_config.rate_limit.burst_size
    );

    let db_path = app_config.scrobble_db_path();
    info!("Opening SQLite scrobble database at {:?}...", db_path);
    let store: Arc<dyn ScrobbleStore> = Arc::new(SqliteScrobbleStore::new(&db_path)?);

    info!("Initializing metrics...");
    server::metrics::init_metrics();
    match store.entity_counts() {
        Ok(counts) => server::metrics::update_library_gauges(&counts),
        Err(e) => error!("Failed to read initial library counts: {}", e),
    }

    // Periodic refresh keeps the library gauges in sync with ingestion that
    // happens through the write seam.
    let store_for_metrics = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(15 * 60));
        // The first tick fires immediately and the gauges are already set.
        interval.tick().await;
        loop {
            interval.tick().await;
            match store_for_metrics.entity_counts() {
                Ok(counts) => server::metrics::update_library_gauges(&counts),
                Err(e) => error!("Failed to refresh library gauges: {}", e),
            }
        }
    });

    let stats_cache = Arc::new(StatsCache::new(store.clone(), app_config.cache.clone()));

    let server_config = ServerConfig {
        port: app_config.port,
        requests_logging_level: app_config.logging_level.clone(),
        frontend_dir_path: app_config.frontend_dir_path.clone(),
        cache: app_config.cache.clone(),
        rate_limit: app_config.rate_limit.clone(),
    };

    info!("Ready to serve at port {}!", app_config.port);
    tokio::select! {
        result = run_server(server_config, store, stats_cache) => {
            info!("HTTP server stopped: {:?}", result);
            result
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            Ok(())
        }
    }
}
