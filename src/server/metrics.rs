use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all Scrobblarr metrics
const PREFIX: &str = "scrobblarr";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Stats Cache Metrics
    pub static ref STATS_CACHE_HITS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_stats_cache_hits_total"), "Stats cache hits"),
        &["endpoint"]
    ).expect("Failed to create stats_cache_hits_total metric");

    pub static ref STATS_CACHE_MISSES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_stats_cache_misses_total"), "Stats cache misses"),
        &["endpoint"]
    ).expect("Failed to create stats_cache_misses_total metric");

    pub static ref DATA_VERSION_REFRESHES_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_data_version_refreshes_total"),
        "Times the cache data version was re-read from the store"
    ).expect("Failed to create data_version_refreshes_total metric");

    // Rate Limiting Metrics
    pub static ref RATE_LIMITED_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_rate_limited_total"),
        "Requests rejected by rate limiting"
    ).expect("Failed to create rate_limited_total metric");

    // Library Metrics
    pub static ref LIBRARY_ITEMS: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_library_items"), "Items in the listening library"),
        &["entity"]
    ).expect("Failed to create library_items metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(STATS_CACHE_HITS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(STATS_CACHE_MISSES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(DATA_VERSION_REFRESHES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RATE_LIMITED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(LIBRARY_ITEMS.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Update the library item gauges from current entity counts
pub fn update_library_gauges(counts: &crate::scrobble_store::EntityCounts) {
    LIBRARY_ITEMS
        .with_label_values(&["artist"])
        .set(counts.artists as f64);
    LIBRARY_ITEMS
        .with_label_values(&["album"])
        .set(counts.albums as f64);
    LIBRARY_ITEMS
        .with_label_values(&["track"])
        .set(counts.tracks as f64);
    LIBRARY_ITEMS
        .with_label_values(&["scrobble"])
        .set(counts.scrobbles as f64);
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_cache_hit(endpoint: &str) {
    STATS_CACHE_HITS_TOTAL.with_label_values(&[endpoint]).inc();
}

pub fn record_cache_miss(endpoint: &str) {
    STATS_CACHE_MISSES_TOTAL
        .with_label_values(&[endpoint])
        .inc();
}

pub fn record_data_version_refresh() {
    DATA_VERSION_REFRESHES_TOTAL.inc();
}

pub fn record_rate_limited() {
    RATE_LIMITED_TOTAL.inc();
}

/// Prometheus text exposition endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics".to_string(),
        );
    }

    match String::from_utf8(buffer) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            tracing::error!("Metrics buffer was not valid UTF-8: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_and_record() {
        init_metrics();

        record_http_request("GET", "/v1/stats/summary", 200, Duration::from_millis(5));
        record_cache_hit("summary");
        record_cache_miss("summary");
        record_rate_limited();
        record_data_version_refresh();
        update_library_gauges(&crate::scrobble_store::EntityCounts {
            artists: 3,
            albums: 2,
            tracks: 4,
            scrobbles: 17,
        });

        let families = REGISTRY.gather();
        let names: Vec<&str> = families.iter().map(|f| f.get_name()).collect();
        assert!(names.contains(&"scrobblarr_http_requests_total"));
        assert!(names.contains(&"scrobblarr_library_items"));
    }
}
