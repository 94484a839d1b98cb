use channel_common::{InstanceName, ProvisionError, ProvisionResult, Step};
use channel_providers::{ApiError, ChannelApi, ConnectState, CreatedInstance};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::state_machine::{ProvisionState, Transitions};

/// Pause between the destructive delete and the recreate, so the remote side
/// can finish tearing the old session down.
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_secs(1);

/// Drives a named instance to "connected" or hands back a pairing QR.
///
/// Steps run strictly in sequence:
/// 1. create (asking for a QR); "already exists" (400/403) moves on to adopt
/// 2. adopt via connect: a QR or an open session ends the run
/// 3. otherwise delete (best-effort), settle, and recreate exactly once
///
/// There is no local single-flight: two concurrent runs for the same name
/// both reach the remote API and race there. The remote service is the only
/// source of truth for instance state.
pub struct Provisioner {
    api: Arc<dyn ChannelApi>,
    settle_interval: Duration,
}

impl Provisioner {
    pub fn new(api: Arc<dyn ChannelApi>) -> Self {
        Self {
            api,
            settle_interval: DEFAULT_SETTLE_INTERVAL,
        }
    }

    pub fn with_settle_interval(mut self, settle_interval: Duration) -> Self {
        self.settle_interval = settle_interval;
        self
    }

    pub fn settle_interval(&self) -> Duration {
        self.settle_interval
    }

    pub async fn provision(
        &self,
        instance_name: &str,
        cancel: &CancelToken,
    ) -> Result<ProvisionResult, ProvisionError> {
        self.provision_traced(instance_name, cancel).await.0
    }

    /// Like `provision`, also returning the state path the run took.
    pub async fn provision_traced(
        &self,
        instance_name: &str,
        cancel: &CancelToken,
    ) -> (Result<ProvisionResult, ProvisionError>, Transitions) {
        let mut transitions = Transitions::new();
        let name = match InstanceName::parse(instance_name) {
            Ok(name) => name,
            Err(err) => return (Err(err), transitions),
        };

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("provision", instance = %name, run_id = %run_id);
        let start = Instant::now();
        let result = self
            .run(&name, cancel, &mut transitions)
            .instrument(span.clone())
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        span.in_scope(|| match &result {
            Ok(outcome) => tracing::info!(
                connected = outcome.connected,
                final_state = %transitions.current(),
                duration_ms,
                "✅ provisioning finished"
            ),
            Err(err) => tracing::error!(
                error = %err,
                final_state = %transitions.current(),
                duration_ms,
                "❌ provisioning failed"
            ),
        });
        (result, transitions)
    }

    async fn run(
        &self,
        name: &InstanceName,
        cancel: &CancelToken,
        t: &mut Transitions,
    ) -> Result<ProvisionResult, ProvisionError> {
        t.advance(ProvisionState::Creating, "create requested");
        match guarded(Step::Create, cancel, t, self.api.create_instance(name)).await? {
            Ok(created) => {
                let artifact = require_artifact(Step::Create, created, t)?;
                t.advance(ProvisionState::PairedNew, "instance created");
                return Ok(ProvisionResult::pairing(artifact));
            }
            Err(err) if err.is_already_exists() => {
                tracing::info!(
                    status = ?err.status(),
                    "instance already exists, fetching connection state"
                );
                t.advance(ProvisionState::AlreadyExists, "create rejected as duplicate");
            }
            Err(ApiError::Decode(message)) => {
                t.advance(ProvisionState::Failed, "create reply undecodable");
                return Err(ProvisionError::UpstreamProtocolError {
                    step: Step::Create,
                    message,
                });
            }
            Err(err) => {
                if let Some(status) = err.status() {
                    // Only 400/403 mean "exists"; anything else may be a newer upstream.
                    tracing::warn!(status, "⚠️ unexpected status from create, not retrying");
                }
                t.advance(ProvisionState::Failed, "create failed");
                return Err(ProvisionError::UpstreamUnavailable {
                    step: Step::Create,
                    message: err.to_string(),
                });
            }
        }

        t.advance(ProvisionState::Adopting, "adopting existing instance");
        match guarded(Step::Adopt, cancel, t, self.api.connect_instance(name)).await? {
            Ok(ConnectState::Paired(artifact)) => {
                t.advance(ProvisionState::PairedExisting, "existing instance is unpaired");
                return Ok(ProvisionResult::pairing(artifact));
            }
            Ok(ConnectState::Connected) => {
                t.advance(ProvisionState::Connected, "session open");
                return Ok(ProvisionResult::connected());
            }
            Ok(ConnectState::Ambiguous { state }) => {
                tracing::warn!(?state, "⚠️ adopt returned neither QR nor open session");
            }
            Err(err) => {
                tracing::warn!(error = %err, "⚠️ adopt failed");
            }
        }
        t.advance(ProvisionState::Ambiguous, "adopt inconclusive");

        t.advance(ProvisionState::Resetting, "deleting remote instance");
        if let Err(err) = guarded(Step::Delete, cancel, t, self.api.delete_instance(name)).await? {
            tracing::warn!(error = %err, "delete failed, recreating anyway");
        }
        guarded(
            Step::Settle,
            cancel,
            t,
            tokio::time::sleep(self.settle_interval),
        )
        .await?;

        t.advance(ProvisionState::Recreating, "recreating after reset");
        match guarded(Step::Recreate, cancel, t, self.api.create_instance(name)).await? {
            Ok(created) => {
                let artifact = require_artifact(Step::Recreate, created, t)?;
                t.advance(ProvisionState::PairedReset, "instance recreated");
                Ok(ProvisionResult::pairing(artifact))
            }
            Err(err) => {
                t.advance(ProvisionState::Failed, "recreate failed");
                Err(ProvisionError::ProvisioningFailed {
                    message: format!("recreate after reset failed: {}", err),
                })
            }
        }
    }
}

/// Race `fut` against cancellation.
async fn guarded<F>(
    step: Step,
    cancel: &CancelToken,
    t: &mut Transitions,
    fut: F,
) -> Result<F::Output, ProvisionError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            t.advance(ProvisionState::Cancelled, step.as_str());
            Err(ProvisionError::Cancelled { step })
        }
        out = fut => Ok(out),
    }
}

fn require_artifact(
    step: Step,
    created: CreatedInstance,
    t: &mut Transitions,
) -> Result<String, ProvisionError> {
    created.artifact.ok_or_else(|| {
        t.advance(ProvisionState::Failed, "create reply without artifact");
        ProvisionError::UpstreamProtocolError {
            step,
            message: "create succeeded without qrcode.base64 or base64".to_string(),
        }
    })
}
