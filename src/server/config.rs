use super::RequestsLoggingLevel;
use crate::config::{CacheSettings, RateLimitSettings};

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    pub cache: CacheSettings,
    pub rate_limit: RateLimitSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            frontend_dir_path: None,
            cache: CacheSettings::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}
