mod common;

use common::*;
use serde_json::Value;

#[tokio::test]
async fn test_health_check() {
    let engine = create_engine(&test_config());
    let server = create_test_server(create_test_state(&engine));

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["checks"]["store"]["status"], "ok");
    assert_eq!(body["checks"]["store"]["message"], "memory reachable");
}
