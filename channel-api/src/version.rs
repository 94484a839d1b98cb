// Version information module

use std::fs;

/// Service version. A `VERSION` file next to the working directory wins over
/// the compiled-in crate version, so it can be bumped without recompiling.
pub fn get_service_version() -> String {
    for path in ["VERSION", "../VERSION"] {
        if let Ok(contents) = fs::read_to_string(path) {
            let version = contents.trim();
            if !version.is_empty() {
                return version.to_string();
            }
        }
    }
    env!("CARGO_PKG_VERSION").to_string()
}

#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct VersionInfo {
    pub service: String,
    pub version: String,
    /// Engine identifier sent to the channel-management API.
    pub integration: String,
}

pub fn get_version_info(integration: &str) -> VersionInfo {
    VersionInfo {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: get_service_version(),
        integration: integration.to_string(),
    }
}
