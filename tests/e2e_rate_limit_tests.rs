//! End-to-end tests for IP based rate limiting

mod common;

use common::{default_cache_settings, TestClient, TestServer};
use reqwest::StatusCode;
use scrobblarr_stats_server::config::RateLimitSettings;

#[tokio::test]
async fn test_burst_above_limit_is_rejected() {
    let server = TestServer::spawn_with(
        default_cache_settings(),
        RateLimitSettings {
            enabled: true,
            requests_per_minute: 60,
            burst_size: 3,
        },
    )
    .await;
    let client = TestClient::new(server.base_url.clone());

    let mut limited = None;
    for _ in 0..10 {
        let response = client.summary().await;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited = Some(response);
            break;
        }
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = limited.expect("no request was rate limited");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
    assert!(body["error"]["details"]["retry_after"].is_u64());
}

#[tokio::test]
async fn test_disabled_rate_limit_never_rejects() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for _ in 0..20 {
        let response = client.get("/health/liveness").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
