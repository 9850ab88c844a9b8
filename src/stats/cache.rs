//! Versioned response caching for the stats endpoints.
//!
//! Cache keys embed `(endpoint, canonicalized params, data_version)` where
//! `data_version` is the timestamp of the most recent scrobble. New data
//! advances the version and every derived key changes with it, so
//! invalidation needs no enumeration or pattern deletes. The version itself
//! is memoized briefly to avoid a MAX(timestamp) query per request.
//!
//! The cache is best-effort: a store failure while reading the version, or
//! disabled configuration, degrades to computing the response directly.

use super::error::StatsError;
use crate::config::CacheSettings;
use crate::scrobble_store::ScrobbleStore;
use crate::server::metrics;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Version string used when no scrobbles exist yet.
const EMPTY_VERSION: &str = "empty";

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
struct VersionMemo {
    version: String,
    fetched_at: Instant,
}

/// In-process TTL cache keyed by endpoint, params and data version.
pub struct StatsCache {
    store: Arc<dyn ScrobbleStore>,
    settings: CacheSettings,
    entries: Mutex<HashMap<String, CacheEntry>>,
    version_memo: Mutex<Option<VersionMemo>>,
}

impl StatsCache {
    pub fn new(store: Arc<dyn ScrobbleStore>, settings: CacheSettings) -> Self {
        Self {
            store,
            settings,
            entries: Mutex::new(HashMap::new()),
            version_memo: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Run `compute` through the cache.
    ///
    /// `params` are the raw query values that shape the response; absent
    /// ones are omitted from the key.
    pub async fn get_or_compute<F>(
        &self,
        endpoint: &str,
        params: &[(&str, Option<&str>)],
        ttl_sec: u64,
        compute: F,
    ) -> Result<serde_json::Value, StatsError>
    where
        F: FnOnce() -> Result<serde_json::Value, StatsError>,
    {
        if !self.settings.enabled {
            return compute();
        }

        let version = match self.data_version().await {
            Some(version) => version,
            // Version lookup failed, skip caching for this request
            None => return compute(),
        };
        let key = cache_key(endpoint, params, &version);

        {
            let mut entries = self.entries.lock().await;
            match entries.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    metrics::record_cache_hit(endpoint);
                    return Ok(entry.value.clone());
                }
                Some(_) => {
                    entries.remove(&key);
                }
                None => {}
            }
        }
        metrics::record_cache_miss(endpoint);

        let value = compute()?;

        let mut entries = self.entries.lock().await;
        // Opportunistic cleanup keeps superseded versions from piling up
        if entries.len() >= 4096 {
            let now = Instant::now();
            entries.retain(|_, entry| entry.expires_at > now);
        }
        entries.insert(
            key,
            CacheEntry {
                value: value.clone(),
                expires_at: Instant::now() + Duration::from_secs(ttl_sec),
            },
        );
        Ok(value)
    }

    /// Current data version, memoized for `data_version_ttl_sec`.
    /// `None` when the store lookup fails.
    async fn data_version(&self) -> Option<String> {
        let mut memo = self.version_memo.lock().await;
        if let Some(existing) = memo.as_ref() {
            if existing.fetched_at.elapsed() < Duration::from_secs(self.settings.data_version_ttl_sec)
            {
                return Some(existing.version.clone());
            }
        }

        let version = match self.store.latest_scrobble_timestamp() {
            Ok(Some(timestamp)) => timestamp.to_string(),
            Ok(None) => EMPTY_VERSION.to_string(),
            Err(e) => {
                warn!("Data version lookup failed, bypassing cache: {:#}", e);
                *memo = None;
                return None;
            }
        };
        metrics::record_data_version_refresh();
        *memo = Some(VersionMemo {
            version: version.clone(),
            fetched_at: Instant::now(),
        });
        Some(version)
    }
}

/// `k=v` pairs sorted by key and joined with `&`, absent values omitted.
pub fn canonicalize_params(params: &[(&str, Option<&str>)]) -> String {
    let mut present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(k, v)| v.map(|v| (*k, v)))
        .collect();
    present.sort_by_key(|(k, _)| *k);
    present
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn cache_key(endpoint: &str, params: &[(&str, Option<&str>)], data_version: &str) -> String {
    format!(
        "{}:{}:{}",
        endpoint,
        canonicalize_params(params),
        data_version
    )
}
