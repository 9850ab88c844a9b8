mod file_config;

pub use file_config::{CacheConfig, DatabaseConfig, FileConfig, RateLimitConfig, ServerSection};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    // Feature configs (with defaults)
    pub cache: CacheSettings,
    pub rate_limit: RateLimitSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let server_section = file.server.unwrap_or_default();
        let database = file.database.unwrap_or_default();

        let db_path = database
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone());
        let db_dir = database
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone());

        if db_path.is_none() && db_dir.is_none() {
            bail!("Database location must be specified via --db-dir, --db-path or in config file");
        }
        if let Some(dir) = &db_dir {
            if !dir.exists() {
                bail!("Database directory does not exist: {:?}", dir);
            }
            if !dir.is_dir() {
                bail!("db_dir is not a directory: {:?}", dir);
            }
        }

        let port = server_section.port.unwrap_or(cli.port);
        if port == 0 {
            bail!("Port must be non-zero");
        }

        let logging_level = server_section
            .requests_logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = server_section
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        // Cache settings - merge file config with defaults
        let cache_file = file.cache.unwrap_or_default();
        let cache_defaults = CacheSettings::default();
        let cache = CacheSettings {
            enabled: cache_file.enabled.unwrap_or(cache_defaults.enabled),
            data_version_ttl_sec: cache_file
                .data_version_ttl_sec
                .unwrap_or(cache_defaults.data_version_ttl_sec),
            recent_tracks_ttl_sec: cache_file
                .recent_tracks_ttl_sec
                .unwrap_or(cache_defaults.recent_tracks_ttl_sec),
            top_ttl_sec: cache_file.top_ttl_sec.unwrap_or(cache_defaults.top_ttl_sec),
            chart_ttl_sec: cache_file
                .chart_ttl_sec
                .unwrap_or(cache_defaults.chart_ttl_sec),
            summary_ttl_sec: cache_file
                .summary_ttl_sec
                .unwrap_or(cache_defaults.summary_ttl_sec),
            details_ttl_sec: cache_file
                .details_ttl_sec
                .unwrap_or(cache_defaults.details_ttl_sec),
            dashboard_ttl_sec: cache_file
                .dashboard_ttl_sec
                .unwrap_or(cache_defaults.dashboard_ttl_sec),
        };

        let rate_limit_file = file.rate_limit.unwrap_or_default();
        let rate_limit_defaults = RateLimitSettings::default();
        let rate_limit = RateLimitSettings {
            enabled: rate_limit_file
                .enabled
                .unwrap_or(rate_limit_defaults.enabled),
            requests_per_minute: rate_limit_file
                .requests_per_minute
                .unwrap_or(rate_limit_defaults.requests_per_minute),
            burst_size: rate_limit_file
                .burst_size
                .unwrap_or(rate_limit_defaults.burst_size),
        };
        if rate_limit.enabled && (rate_limit.requests_per_minute == 0 || rate_limit.burst_size == 0)
        {
            bail!("Rate limiting requires non-zero requests_per_minute and burst_size");
        }

        Ok(Self {
            db_dir,
            db_path,
            port,
            logging_level,
            frontend_dir_path,
            cache,
            rate_limit,
        })
    }

    pub fn scrobble_db_path(&self) -> PathBuf {
        match &self.db_path {
            Some(path) => path.clone(),
            // resolve() guarantees one of the two is set
            None => self
                .db_dir
                .as_ref()
                .expect("neither db_path nor db_dir set")
                .join("scrobbles.db"),
        }
    }
}

/// TTLs for the versioned response cache, per endpoint family.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    /// How long the latest-scrobble data version is memoized before being
    /// re-read from the store. Zero means every request re-reads it.
    pub data_version_ttl_sec: u64,
    pub recent_tracks_ttl_sec: u64,
    pub top_ttl_sec: u64,
    pub chart_ttl_sec: u64,
    pub summary_ttl_sec: u64,
    pub details_ttl_sec: u64,
    pub dashboard_ttl_sec: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            data_version_ttl_sec: 60,
            recent_tracks_ttl_sec: 5 * 60,
            top_ttl_sec: 30 * 60,
            chart_ttl_sec: 60 * 60,
            summary_ttl_sec: 15 * 60,
            details_ttl_sec: 30 * 60,
            dashboard_ttl_sec: 15 * 60,
        }
    }
}

/// IP-based request rate limiting for the stats routes.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub requests_per_minute: u32,
    pub burst_size: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 300,
            burst_size: 50,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_temp_db_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("path"),
            Some(RequestsLoggingLevel::Path)
        ));
        assert!(matches!(
            parse_logging_level("headers"),
            Some(RequestsLoggingLevel::Headers)
        ));
        assert!(matches!(
            parse_logging_level("body"),
            Some(RequestsLoggingLevel::Body)
        ));
        // Case insensitive
        assert!(matches!(
            parse_logging_level("PATH"),
            Some(RequestsLoggingLevel::Path)
        ));
        // Invalid
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            db_path: None,
            port: 3001,
            logging_level: RequestsLoggingLevel::Headers,
            frontend_dir_path: Some("/frontend".to_string()),
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_dir, Some(temp_dir.path().to_path_buf()));
        assert_eq!(config.port, 3001);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.frontend_dir_path, Some("/frontend".to_string()));
        assert!(config.cache.enabled);
        assert_eq!(config.cache.data_version_ttl_sec, 60);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests_per_minute, 300);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/should/be/overridden")),
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
            ..Default::default()
        };

        let file_config = FileConfig {
            server: Some(ServerSection {
                port: Some(4000),
                requests_logging_level: Some("body".to_string()),
                frontend_dir_path: None,
            }),
            database: Some(DatabaseConfig {
                db_dir: Some(temp_dir.path().to_string_lossy().to_string()),
                db_path: None,
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_dir, Some(temp_dir.path().to_path_buf()));
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
    }

    #[test]
    fn test_resolve_missing_db_location_error() {
        let cli = CliConfig::default();
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Database location must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_db_dir_error() {
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/nonexistent/path/that/should/not/exist")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_db_dir_not_directory_error() {
        // A temporary file, not a directory
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_resolve_explicit_db_path_skips_dir_check() {
        let cli = CliConfig {
            db_path: Some(PathBuf::from("/tmp/some-future-scrobbles.db")),
            port: 3001,
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(
            config.scrobble_db_path(),
            PathBuf::from("/tmp/some-future-scrobbles.db")
        );
    }

    #[test]
    fn test_scrobble_db_path_from_dir() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            port: 3001,
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(
            config.scrobble_db_path(),
            temp_dir.path().join("scrobbles.db")
        );
    }

    #[test]
    fn test_resolve_zero_port_rejected() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            port: 0,
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("non-zero"));
    }

    #[test]
    fn test_resolve_rate_limit_zero_values_rejected_when_enabled() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            port: 3001,
            ..Default::default()
        };
        let file_config = FileConfig {
            rate_limit: Some(RateLimitConfig {
                enabled: Some(true),
                requests_per_minute: Some(0),
                burst_size: Some(10),
            }),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, Some(file_config));
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_cache_section_overrides() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            port: 3001,
            ..Default::default()
        };
        let file_config = FileConfig {
            cache: Some(CacheConfig {
                enabled: Some(false),
                data_version_ttl_sec: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.data_version_ttl_sec, 0);
        // Untouched fields keep their defaults
        assert_eq!(config.cache.chart_ttl_sec, 3600);
    }
}
