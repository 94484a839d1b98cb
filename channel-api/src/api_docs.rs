use crate::handlers::{connect, health};
use crate::version::VersionInfo;
use channel_common::{ConnectRequest, ConnectResponse, ErrorResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        connect::connect_whatsapp,
        health::health,
        health::get_version
    ),
    components(
        schemas(
            ConnectRequest,
            ConnectResponse,
            ErrorResponse,
            health::HealthResponse,
            VersionInfo
        )
    ),
    tags(
        (name = "channel", description = "Channel instance provisioning")
    )
)]
pub struct ApiDoc;
