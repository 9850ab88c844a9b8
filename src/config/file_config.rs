use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub server: Option<ServerSection>,
    pub database: Option<DatabaseConfig>,
    pub cache: Option<CacheConfig>,
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub requests_logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub db_dir: Option<String>,
    pub db_path: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: Option<bool>,
    pub data_version_ttl_sec: Option<u64>,
    pub recent_tracks_ttl_sec: Option<u64>,
    pub top_ttl_sec: Option<u64>,
    pub chart_ttl_sec: Option<u64>,
    pub summary_ttl_sec: Option<u64>,
    pub details_ttl_sec: Option<u64>,
    pub dashboard_ttl_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: Option<bool>,
    pub requests_per_minute: Option<u32>,
    pub burst_size: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }
}
