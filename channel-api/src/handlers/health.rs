use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;
use crate::version::{self, VersionInfo};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
}

pub async fn root() -> &'static str {
    "Channel provisioning API"
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.started_at);
    Json(HealthResponse {
        status: "ok".to_string(),
        started_at: state.started_at,
        uptime_seconds: uptime.num_seconds().max(0),
    })
}

#[utoipa::path(
    get,
    path = "/api/version",
    responses((status = 200, description = "Service version", body = VersionInfo))
)]
pub async fn get_version(State(state): State<Arc<AppState>>) -> Json<VersionInfo> {
    Json(version::get_version_info(&state.integration))
}
