// Common test utilities and fixtures
#![allow(dead_code)]

use axum_test::TestServer;
use channel_api::{create_app, AppState};
use channel_providers::mock::MockChannelApi;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_INTEGRATION: &str = "WHATSAPP-BAILEYS";

/// App state backed by the in-memory channel API, with a short settle interval.
pub fn test_state(api: Arc<MockChannelApi>) -> Arc<AppState> {
    AppState::new(api, Duration::from_millis(10), TEST_INTEGRATION)
}

/// Test server with the same layers as main.rs (any origin allowed).
pub fn create_test_server(api: Arc<MockChannelApi>) -> TestServer {
    TestServer::new(create_app(test_state(api), None)).unwrap()
}

pub fn create_test_server_with_origins(api: Arc<MockChannelApi>, origins: &[&str]) -> TestServer {
    let origins: Vec<String> = origins.iter().map(|s| s.to_string()).collect();
    TestServer::new(create_app(test_state(api), Some(&origins))).unwrap()
}
