// Integration tests for POST /api/connect-whatsapp
// All upstream calls go to the in-memory channel API.

mod common;

use axum::http::{HeaderValue, Method};
use channel_providers::mock::{MockChannelApi, Operation};
use channel_providers::ApiError;
use common::{create_test_server, create_test_server_with_origins};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const CONNECT: &str = "/api/connect-whatsapp";

#[tokio::test]
async fn test_new_instance_returns_qrcode() {
    let api = Arc::new(MockChannelApi::new());
    api.queue_artifact("AAA");
    let server = create_test_server(api.clone());

    let response = server.post(CONNECT).json(&json!({ "instanceName": "demo1" })).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body, json!({ "connected": false, "qrcode": "AAA" }));
    assert!(api.exists("demo1"));
}

#[tokio::test]
async fn test_second_call_returns_same_qrcode() {
    let api = Arc::new(MockChannelApi::new());
    let server = create_test_server(api.clone());

    let first: Value = server.post(CONNECT).json(&json!({ "instanceName": "demo1" })).await.json();
    let second = server.post(CONNECT).json(&json!({ "instanceName": "demo1" })).await;

    assert_eq!(second.status_code(), 200);
    assert_eq!(second.json::<Value>(), first);
}

#[tokio::test]
async fn test_paired_instance_reports_connected() {
    let api = Arc::new(MockChannelApi::new());
    api.seed_instance("demo1");
    api.mark_paired("demo1");
    let server = create_test_server(api.clone());

    let response = server.post(CONNECT).json(&json!({ "instanceName": "demo1" })).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body, json!({ "connected": true }));
    assert_eq!(api.count(Operation::Delete), 0);
}

#[tokio::test]
async fn test_missing_instance_name_is_bad_request() {
    let api = Arc::new(MockChannelApi::new());
    let server = create_test_server(api.clone());

    for body in [
        json!({}),
        json!({ "instanceName": "" }),
        json!({ "instanceName": 42 }),
    ] {
        let response = server.post(CONNECT).json(&body).await;
        assert_eq!(response.status_code(), 400, "{body}");
        assert_eq!(response.json::<Value>(), json!({ "error": "instanceName is required" }));
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_bad_request() {
    let api = Arc::new(MockChannelApi::new());
    let server = create_test_server(api.clone());

    let response = server.post(CONNECT).text("instanceName=demo1").await;

    assert_eq!(response.status_code(), 400);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_upstream_timeout_is_generic_server_error() {
    let api = Arc::new(MockChannelApi::new());
    api.fail_next(Operation::Create, ApiError::Timeout(Duration::from_secs(20)));
    let server = create_test_server(api.clone());

    let response = server.post(CONNECT).json(&json!({ "instanceName": "demo1" })).await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    let message = body["error"].as_str().unwrap();
    assert!(!message.is_empty());
    assert!(!message.contains("timed out"));
    assert_eq!(api.count(Operation::Connect), 0);
}

#[tokio::test]
async fn test_failed_recovery_is_server_error() {
    let api = Arc::new(MockChannelApi::new());
    api.seed_instance("demo1");
    api.mark_broken("demo1");
    api.fail_next(Operation::Create, ApiError::Status { status: 403, body: String::new() });
    api.fail_next(Operation::Create, ApiError::Transport("connection refused".into()));
    let server = create_test_server(api.clone());

    let response = server.post(CONNECT).json(&json!({ "instanceName": "demo1" })).await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to recover existing instance" })
    );
    assert_eq!(api.count(Operation::Delete), 1);
    assert_eq!(api.count(Operation::Create), 2);
}

#[tokio::test]
async fn test_broken_instance_is_reset_and_returns_new_qrcode() {
    let api = Arc::new(MockChannelApi::new().with_exists_status(400));
    api.seed_instance("demo1");
    api.mark_broken("demo1");
    api.queue_artifact("BBB");
    let server = create_test_server(api.clone());

    let response = server.post(CONNECT).json(&json!({ "instanceName": "demo1" })).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({ "connected": false, "qrcode": "BBB" }));
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let server = create_test_server(Arc::new(MockChannelApi::new()));

    let response = server
        .post(CONNECT)
        .add_header("Origin", "http://localhost:3000")
        .json(&json!({ "instanceName": "demo1" }))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn test_cors_preflight() {
    let server = create_test_server(Arc::new(MockChannelApi::new()));

    let response = server
        .method(Method::OPTIONS, CONNECT)
        .add_header("Origin", "http://localhost:3000")
        .add_header("Access-Control-Request-Method", "POST")
        .add_header("Access-Control-Request-Headers", "content-type")
        .await;

    assert_eq!(response.status_code(), 200);
    let methods = response.header("access-control-allow-methods");
    assert!(methods.to_str().unwrap().contains("POST"));
}

#[tokio::test]
async fn test_cors_allow_list_rejects_other_origins() {
    let server = create_test_server_with_origins(
        Arc::new(MockChannelApi::new()),
        &["https://app.example.com"],
    );

    let allowed = server
        .post(CONNECT)
        .add_header("Origin", "https://app.example.com")
        .json(&json!({ "instanceName": "demo1" }))
        .await;
    assert_eq!(
        allowed.header("access-control-allow-origin"),
        HeaderValue::from_static("https://app.example.com")
    );

    let other = server
        .post(CONNECT)
        .add_header("Origin", "https://evil.example.com")
        .json(&json!({ "instanceName": "demo2" }))
        .await;
    assert!(other.headers().get("access-control-allow-origin").is_none());
}
