use async_trait::async_trait;
use channel_common::InstanceName;

pub mod config;
pub mod error;

pub use config::EvolutionConfig;
pub use error::ApiError;
pub use reply::{ConnectState, CreatedInstance};

/// Remote channel-management API. One implementation talks HTTP to the real
/// service, the mock keeps everything in memory for tests.
///
/// Implementations never retry: recovery decisions belong to the caller.
#[async_trait]
pub trait ChannelApi: Send + Sync {
    /// Create a named instance and ask the remote side to generate a pairing QR.
    async fn create_instance(&self, name: &InstanceName) -> Result<CreatedInstance, ApiError>;

    /// Retrieve an existing instance: either a fresh QR or its session state.
    async fn connect_instance(&self, name: &InstanceName) -> Result<ConnectState, ApiError>;

    async fn delete_instance(&self, name: &InstanceName) -> Result<(), ApiError>;
}

pub mod reply {
    use serde_json::Value;

    /// Decoded body of a successful create call.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CreatedInstance {
        pub artifact: Option<String>,
    }

    impl CreatedInstance {
        /// Accepts both `{ qrcode: { base64 } }` and a flat `{ base64 }`.
        pub fn from_response(body: &Value) -> Self {
            let artifact = non_empty_str(&body["qrcode"]["base64"])
                .or_else(|| non_empty_str(&body["base64"]));
            Self { artifact }
        }
    }

    /// What a connect call tells us about an existing instance.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ConnectState {
        /// Exists but unpaired; the artifact is a fresh QR.
        Paired(String),
        /// Session is open.
        Connected,
        /// Neither signal present. `state` is whatever the remote reported.
        Ambiguous { state: Option<String> },
    }

    impl ConnectState {
        pub fn from_response(body: &Value) -> Self {
            if let Some(artifact) = non_empty_str(&body["base64"]) {
                return ConnectState::Paired(artifact);
            }
            let state = body["instance"]["state"].as_str().map(|s| s.to_string());
            match state.as_deref() {
                Some("open") => ConnectState::Connected,
                _ => ConnectState::Ambiguous { state },
            }
        }
    }

    /// Whitespace-only counts as absent; anything else is returned as received.
    fn non_empty_str(value: &Value) -> Option<String> {
        value
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde_json::json;

        #[test]
        fn create_reply_prefers_nested_qrcode() {
            let reply = CreatedInstance::from_response(&json!({
                "instance": { "instanceName": "demo1", "status": "created" },
                "qrcode": { "base64": "AAA", "code": "2@xyz" },
                "base64": "IGNORED"
            }));
            assert_eq!(reply.artifact.as_deref(), Some("AAA"));
        }

        #[test]
        fn create_reply_falls_back_to_flat_base64() {
            let reply = CreatedInstance::from_response(&json!({ "base64": "BBB" }));
            assert_eq!(reply.artifact.as_deref(), Some("BBB"));

            let reply = CreatedInstance::from_response(&json!({ "qrcode": { "base64": "" }, "base64": "CCC" }));
            assert_eq!(reply.artifact.as_deref(), Some("CCC"));
        }

        #[test]
        fn create_reply_without_artifact() {
            let reply = CreatedInstance::from_response(&json!({ "instance": { "instanceName": "demo1" } }));
            assert_eq!(reply.artifact, None);
            assert_eq!(CreatedInstance::from_response(&json!([])).artifact, None);
        }

        #[test]
        fn connect_reply_decodes_all_three_shapes() {
            assert_eq!(
                ConnectState::from_response(&json!({ "base64": "QR", "code": "2@abc" })),
                ConnectState::Paired("QR".into())
            );
            assert_eq!(
                ConnectState::from_response(&json!({ "instance": { "instanceName": "d", "state": "open" } })),
                ConnectState::Connected
            );
            assert_eq!(
                ConnectState::from_response(&json!({ "instance": { "state": "connecting" } })),
                ConnectState::Ambiguous { state: Some("connecting".into()) }
            );
            assert_eq!(
                ConnectState::from_response(&json!({ "count": 0 })),
                ConnectState::Ambiguous { state: None }
            );
        }

        #[test]
        fn artifacts_are_returned_as_received() {
            let reply = CreatedInstance::from_response(&json!({ "base64": "AAA\n" }));
            assert_eq!(reply.artifact.as_deref(), Some("AAA\n"));
            assert_eq!(
                ConnectState::from_response(&json!({ "base64": " QR " })),
                ConnectState::Paired(" QR ".into())
            );
            // Whitespace-only is no artifact at all.
            let reply = CreatedInstance::from_response(&json!({ "qrcode": { "base64": "  " } }));
            assert_eq!(reply.artifact, None);
        }

        #[test]
        fn artifact_wins_over_open_state() {
            let state = ConnectState::from_response(&json!({ "base64": "QR", "instance": { "state": "open" } }));
            assert_eq!(state, ConnectState::Paired("QR".into()));
        }
    }
}

#[cfg(feature = "evolution")]
pub mod evolution;

#[cfg(feature = "mock")]
pub mod mock;
