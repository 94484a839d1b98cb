// Public routes (service metadata)
use crate::app::AppState;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::api_docs;
use crate::handlers::health;

pub fn create_public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/api/version", get(health::get_version))
        .route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(api_docs::ApiDoc::openapi())
}
