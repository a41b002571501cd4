use dashboard_edge::client::types::{OperationKind, PracticeDecision, ResearchState, RunStatus};
use dashboard_edge::client::{ApiClient, CommandFilters, ResearchFilters};
use dashboard_edge::client::error::{DEFAULT_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE};
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api", server.uri())).unwrap()
}

fn query_pairs(request: &wiremock::Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

#[tokio::test]
async fn test_get_stats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": 12, "commands": 40, "practices": 7,
            "analyses": 9, "operations": 3, "repositories": 15
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stats = client_for(&server).get_stats().await.unwrap();

    assert_eq!(stats.projects, 12);
    assert_eq!(stats.repositories, 15);
}

#[tokio::test]
async fn test_research_filters_are_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/research/results"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "total_projects": 0, "results": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let filters = ResearchFilters {
        min_score: Some(0.0),
        max_score: Some(5.0),
        category: Some(String::new()),
        technology: Some("rust".to_string()),
        limit: Some(0),
        offset: Some(20),
        ..Default::default()
    };
    client_for(&server)
        .get_research_results(&filters)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let pairs = query_pairs(&requests[0]);
    assert_eq!(pairs.get("min_score").map(String::as_str), Some("0"));
    assert_eq!(pairs.get("max_score").map(String::as_str), Some("5"));
    assert_eq!(pairs.get("technology").map(String::as_str), Some("rust"));
    assert_eq!(pairs.get("offset").map(String::as_str), Some("20"));
    assert!(!pairs.contains_key("category"));
    assert!(!pairs.contains_key("limit"));
}

#[tokio::test]
async fn test_empty_command_filters_send_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/colby/commands"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commands": [{
                "id": "c-1", "repository": "octo/hello", "author": "octocat",
                "command": "/colby help", "status": "completed",
                "created_at": "2024-05-01T10:00:00Z", "execution_time": 1.5
            }],
            "total": 1, "page": 1, "limit": 20
        })))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .get_commands(&CommandFilters::default())
        .await
        .unwrap();

    assert_eq!(response.commands[0].status, RunStatus::Completed);
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query().is_none_or(str::is_empty));
}

#[tokio::test]
async fn test_execute_command_sends_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/colby/execute"))
        .and(body_json(json!({ "command": "/colby help", "repository": "octo/hello" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Command queued", "command_id": "c-9" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .execute_command("/colby help", "octo/hello")
        .await
        .unwrap();

    assert_eq!(response.command_id, "c-9");
}

#[tokio::test]
async fn test_update_best_practice_status_uses_patch() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/colby/best-practices/p-1/status"))
        .and(body_json(json!({ "status": "approved" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Updated" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .update_best_practice_status("p-1", PracticeDecision::Approved)
        .await
        .unwrap();

    assert_eq!(response.message, "Updated");
}

#[tokio::test]
async fn test_control_endpoints() {
    let server = MockServer::start().await;
    for endpoint in ["/api/research/start", "/api/research/stop", "/api/operations/op-1/cancel"] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    client.start_research().await.unwrap();
    client.stop_research().await.unwrap();
    client.cancel_operation("op-1").await.unwrap();
}

#[tokio::test]
async fn test_single_item_reads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/research/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "running", "progress": 40, "current_operation": "Scanning",
            "started_at": "2024-05-01T10:00:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "op-1", "type": "research", "status": "pending",
            "progress": 0, "started_at": "2024-05-01T10:00:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/repositories/r-1/analysis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis": "Well maintained", "details": { "tests": true }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let status = client.get_research_status().await.unwrap();
    assert_eq!(status.status, ResearchState::Running);

    let operation = client.get_operation("op-1").await.unwrap();
    assert_eq!(operation.kind, OperationKind::Research);

    let analysis = client.get_repository_analysis("r-1").await.unwrap();
    assert_eq!(analysis.details["tests"], true);
}

#[tokio::test]
async fn test_error_message_comes_from_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/colby/commands/c-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Command not found" })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_command("c-404")
        .await
        .unwrap_err();

    assert_eq!(err.status, 404);
    assert_eq!(err.message, "Command not found");
    assert_eq!(err.data, Some(json!({ "message": "Command not found" })));
}

#[tokio::test]
async fn test_error_without_message_uses_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_health().await.unwrap_err();

    assert_eq!(err.status, 503);
    assert_eq!(err.message, DEFAULT_ERROR_MESSAGE);
    assert!(err.data.is_none());
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_stats().await.unwrap_err();

    assert_eq!(err.status, 0);
    assert_ne!(err.message, NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}/api")).unwrap();
    let err = client.get_health().await.unwrap_err();

    assert_eq!(err.status, 0);
    assert_eq!(err.message, NETWORK_ERROR_MESSAGE);
}
