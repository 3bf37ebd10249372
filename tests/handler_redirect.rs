mod common;

use axum::http::StatusCode;
use chrono::TimeDelta;
use common::*;

#[tokio::test]
async fn test_redirect_to_long_url() {
    let engine = create_engine(&test_config());
    let record = engine
        .shortener
        .create("https://example.com/target", None)
        .unwrap();
    let server = create_test_server(create_test_state(&engine));

    let response = server.get(&format!("/{}", record.code)).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let engine = create_engine(&test_config());
    let server = create_test_server(create_test_state(&engine));

    let response = server.get("/zzzzzz").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_expired_code() {
    let (engine, clock) = create_engine_with_clock(&test_config());
    let record = engine
        .shortener
        .create("https://example.com/brief", ttl_secs(10))
        .unwrap();
    let server = create_test_server(create_test_state(&engine));

    server
        .get(&format!("/{}", record.code))
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    clock.advance(TimeDelta::seconds(10));

    server
        .get(&format!("/{}", record.code))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_counts_hits() {
    let engine = create_engine(&test_config());
    let record = engine
        .shortener
        .create("https://example.com/target", None)
        .unwrap();
    let server = create_test_server(create_test_state(&engine));

    for _ in 0..3 {
        server.get(&format!("/{}", record.code)).await;
    }

    let hits = engine.shortener.inspect(record.code.as_str()).unwrap().hits;
    assert_eq!(hits, 3);
}
