// Channel instance provisioning routes
use axum::routing::post;
use axum::Router;
use crate::app::AppState;
use std::sync::Arc;

use crate::handlers::connect::connect_whatsapp;

pub fn create_channel_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/connect-whatsapp", post(connect_whatsapp))
}
