//! End-to-end tests for the all-time summary endpoint

mod common;

use common::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_summary_totals_and_tops() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.summary().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["totals"]["scrobbles"], TOTAL_SCROBBLES);
    assert_eq!(body["totals"]["artists"], TOTAL_ARTISTS);
    assert_eq!(body["totals"]["albums"], TOTAL_ALBUMS);
    assert_eq!(body["totals"]["tracks"], TOTAL_TRACKS);

    assert_eq!(
        body["date_range"]["first_scrobble"],
        "2024-03-10T08:00:00Z"
    );
    assert!(body["date_range"]["last_scrobble"].is_string());
    // Inclusive day span from 2024-03-10 up to the newest scrobble
    assert!(body["date_range"]["total_days"].as_u64().unwrap() > 365);

    assert_eq!(body["top_all_time"]["artist"]["name"], ARTIST_1_NAME);
    assert_eq!(body["top_all_time"]["artist"]["scrobble_count"], 9);
    assert_eq!(body["top_all_time"]["album"]["name"], ALBUM_1_TITLE);
    assert_eq!(body["top_all_time"]["album"]["artist"], ARTIST_1_NAME);
    assert_eq!(body["top_all_time"]["track"]["name"], TRACK_OPENING);
    assert_eq!(body["top_all_time"]["track"]["album"], ALBUM_1_TITLE);

    assert!(body["averages"]["per_day"].as_f64().unwrap() > 0.0);
    assert!(
        body["averages"]["per_month"].as_f64().unwrap()
            > body["averages"]["per_day"].as_f64().unwrap()
    );
    assert!(
        body["averages"]["per_year"].as_f64().unwrap()
            > body["averages"]["per_month"].as_f64().unwrap()
    );
}
