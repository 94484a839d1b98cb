use channel_orchestrator::{CancelToken, Provisioner};
use channel_providers::ChannelApi;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

pub struct AppState {
    pub provisioner: Provisioner,
    /// Cancelled on shutdown; every provisioning run listens to it.
    pub shutdown: CancelToken,
    pub started_at: DateTime<Utc>,
    /// Engine identifier reported by the version endpoint.
    pub integration: String,
}

impl AppState {
    pub fn new(
        api: Arc<dyn ChannelApi>,
        settle_interval: Duration,
        integration: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            provisioner: Provisioner::new(api).with_settle_interval(settle_interval),
            shutdown: CancelToken::new(),
            started_at: Utc::now(),
            integration: integration.into(),
        })
    }
}
