mod common;

use axum::http::StatusCode;
use dashboard_edge::infrastructure::assets::MemoryAssetStore;
use dashboard_edge::routes::app_router;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn assert_cors(response: &axum_test::TestResponse) {
    assert_eq!(response.header("access-control-allow-origin"), "*");
    assert_eq!(
        response.header("access-control-allow-methods"),
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        response.header("access-control-allow-headers"),
        "Content-Type, Authorization"
    );
}

#[tokio::test]
async fn test_get_is_relayed_with_cors() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "projects": 12 })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::create_test_server(&upstream.uri(), Arc::new(MemoryAssetStore::new()));

    let response = server.get("/api/stats").await;

    response.assert_status_ok();
    assert_cors(&response);
    assert_eq!(response.json::<Value>(), json!({ "projects": 12 }));
}

#[tokio::test]
async fn test_post_body_and_outbound_headers_are_forwarded() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/colby/execute"))
        .and(header("content-type", "application/json"))
        .and(header("user-agent", "gh-bot-frontend/1.0.0"))
        .and(body_json(json!({ "command": "/colby help", "repository": "octo/hello" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "queued", "command_id": "c-1" })),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::create_test_server(&upstream.uri(), Arc::new(MemoryAssetStore::new()));

    let response = server
        .post("/api/colby/execute")
        .json(&json!({ "command": "/colby help", "repository": "octo/hello" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["command_id"], "c-1");
}

#[tokio::test]
async fn test_query_string_is_preserved() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/colby/commands"))
        .and(query_param("repo", "octo/hello"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commands": [] })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::create_test_server(&upstream.uri(), Arc::new(MemoryAssetStore::new()));

    let response = server
        .get("/api/colby/commands")
        .add_query_param("repo", "octo/hello")
        .add_query_param("limit", 5)
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_upstream_error_status_is_passed_through() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/operations/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "message": "Operation not found" }))
                .insert_header("x-request-id", "req-7"),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::create_test_server(&upstream.uri(), Arc::new(MemoryAssetStore::new()));

    let response = server.get("/api/operations/missing").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_cors(&response);
    assert_eq!(response.header("x-request-id"), "req-7");
    assert_eq!(response.json::<Value>()["message"], "Operation not found");
}

#[tokio::test]
async fn test_patch_is_replicated() {
    let upstream = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/colby/best-practices/p-1/status"))
        .and(body_json(json!({ "status": "approved" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = common::create_test_server(&upstream.uri(), Arc::new(MemoryAssetStore::new()));

    let response = server
        .patch("/api/colby/best-practices/p-1/status")
        .json(&json!({ "status": "approved" }))
        .await;

    response.assert_status_ok();
    assert_cors(&response);
}

#[tokio::test]
async fn test_api_requests_never_touch_assets() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&upstream)
        .await;

    let store = Arc::new(common::CountingStore::new(common::spa_assets()));
    let server = common::create_test_server(&upstream.uri(), store.clone());

    server.get("/api/health").await.assert_status_ok();

    assert!(store.lookups().is_empty());
}

#[tokio::test]
async fn test_unreachable_upstream_returns_500() {
    let server = common::create_test_server(
        &common::refused_origin(),
        Arc::new(MemoryAssetStore::new()),
    );

    let response = server
        .post("/api/colby/execute")
        .json(&json!({ "command": "/colby help", "repository": "octo/hello" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to connect to API" })
    );
}

fn limited_server(upstream_origin: &str, max_body_bytes: usize) -> axum_test::TestServer {
    let state = common::create_test_state(upstream_origin, Arc::new(MemoryAssetStore::new()))
        .with_max_body_bytes(max_body_bytes);
    axum_test::TestServer::new(app_router(state)).unwrap()
}

#[tokio::test]
async fn test_oversized_body_is_refused_before_forwarding() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&upstream)
        .await;

    let server = limited_server(&upstream.uri(), 1024);

    let response = server
        .post("/api/colby/execute")
        .text("x".repeat(64 * 1024))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Request body too large" })
    );
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_body_at_the_limit_is_forwarded() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/colby/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "queued" })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = limited_server(&upstream.uri(), 1024);

    let response = server.post("/api/colby/execute").text("x".repeat(1024)).await;

    response.assert_status_ok();
    let received = upstream.received_requests().await.unwrap();
    assert_eq!(received[0].body.len(), 1024);
}
