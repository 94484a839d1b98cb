use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;

pub use error::{ProvisionError, Step};

// --- Domain types ---

/// Name of a remote channel instance. Acts as the idempotency key for every
/// call made against the channel-management API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceName(String);

impl InstanceName {
    /// Only the empty string is rejected. The name is kept byte-for-byte,
    /// so `" demo1 "` and `"demo1"` are different remote instances.
    pub fn parse(raw: &str) -> Result<Self, ProvisionError> {
        if raw.is_empty() {
            return Err(ProvisionError::InvalidArgument(
                "instanceName is required".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstanceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub connected: bool,
    pub pairing_artifact: Option<String>,
}

impl ProvisionResult {
    pub fn pairing(artifact: impl Into<String>) -> Self {
        Self {
            connected: false,
            pairing_artifact: Some(artifact.into()),
        }
    }

    pub fn connected() -> Self {
        Self {
            connected: true,
            pairing_artifact: None,
        }
    }
}

// --- Wire DTOs (inbound HTTP boundary) ---

#[derive(Debug, Serialize, Deserialize, Clone, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    /// Caller-chosen instance name; must be non-empty.
    #[serde(default)]
    pub instance_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, utoipa::ToSchema)]
pub struct ConnectResponse {
    pub connected: bool,
    /// Base64-encoded QR image, present while the instance is unpaired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,
}

impl From<ProvisionResult> for ConnectResponse {
    fn from(result: ProvisionResult) -> Self {
        Self {
            connected: result.connected,
            qrcode: result.pairing_artifact,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
