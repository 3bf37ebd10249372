mod common;

use common::*;
use serde_json::Value;

#[tokio::test]
async fn test_link_details() {
    let engine = create_engine(&test_config());
    let record = engine
        .shortener
        .create("https://example.com/a", ttl_secs(3600))
        .unwrap();
    let server = create_test_server(create_test_state(&engine));

    let response = server
        .get(&format!("/api/v1/links/{}", record.code))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["code"], record.code.as_str());
    assert_eq!(body["short_url"], format!("{BASE_URL}/{}", record.code));
    assert_eq!(body["long_url"], "https://example.com/a");
    assert_eq!(body["status"], "active");
    assert_eq!(body["hits"], 0);
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn test_link_details_do_not_count_hits() {
    let engine = create_engine(&test_config());
    let record = engine
        .shortener
        .create("https://example.com/a", None)
        .unwrap();
    let server = create_test_server(create_test_state(&engine));

    for _ in 0..2 {
        server
            .get(&format!("/api/v1/links/{}", record.code))
            .await
            .assert_status_ok();
    }

    assert_eq!(
        engine.shortener.inspect(record.code.as_str()).unwrap().hits,
        0
    );
}

#[tokio::test]
async fn test_link_details_not_found() {
    let engine = create_engine(&test_config());
    let server = create_test_server(create_test_state(&engine));

    let response = server.get("/api/v1/links/missing").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["details"]["code"], "missing");
}
