use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use channel_common::{ConnectRequest, ConnectResponse, ErrorResponse, ProvisionError};
use std::sync::Arc;

use crate::app::AppState;

/// Provisioning error as seen by HTTP callers: 400 for bad input, a generic
/// 500 for everything else. The detailed error is only logged.
pub struct ProvisionFailure(pub ProvisionError);

impl IntoResponse for ProvisionFailure {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorResponse::new(self.0.public_message()))).into_response()
    }
}

/// Create the instance or recover its QR if it already exists.
#[utoipa::path(
    post,
    path = "/api/connect-whatsapp",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Pairing QR (base64) or connected status", body = ConnectResponse),
        (status = 400, description = "instanceName missing or empty", body = ErrorResponse),
        (status = 500, description = "Channel service unavailable or misbehaving", body = ErrorResponse)
    )
)]
pub async fn connect_whatsapp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>, ProvisionFailure> {
    // Unparseable bodies are treated like a missing name.
    let instance_name = match payload {
        Ok(Json(req)) => req.instance_name.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected connect payload");
            String::new()
        }
    };

    tracing::info!(instance = %instance_name, "[connect-whatsapp] attempting to connect instance");
    let result = state
        .provisioner
        .provision(&instance_name, &state.shutdown)
        .await
        .map_err(ProvisionFailure)?;
    Ok(Json(result.into()))
}
