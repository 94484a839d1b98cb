pub mod state;

pub use state::AppState;

use axum::http::{HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::create_router;

/// CORS layer. Without an allow-list every origin is accepted (development
/// posture); production deployments set `CORS_ALLOWED_ORIGINS`.
pub fn create_cors(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origins = match allowed_origins {
        Some(list) if !list.is_empty() => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
        _ => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Full application: routes, CORS, request tracing, state.
pub fn create_app(state: Arc<AppState>, allowed_origins: Option<&[String]>) -> Router {
    create_router()
        .layer(create_cors(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
