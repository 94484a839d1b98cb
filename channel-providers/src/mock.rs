use crate::{ApiError, ChannelApi, ConnectState, CreatedInstance};
use async_trait::async_trait;
use channel_common::InstanceName;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// One call received by the mock, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Connect(String),
    Delete(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Connect,
    Delete,
}

/// How long a call of one operation takes before it is answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stall {
    For(Duration),
    /// Never answers, like an upstream that accepted the connection and went quiet.
    Forever,
}

#[derive(Clone, Debug)]
struct RemoteInstance {
    artifact: String,
    paired: bool,
    /// Connect answers with neither a QR nor an open state.
    broken: bool,
}

#[derive(Default)]
struct Inner {
    instances: HashMap<String, RemoteInstance>,
    faults: HashMap<Operation, VecDeque<ApiError>>,
    stalls: HashMap<Operation, Stall>,
    queued_artifacts: VecDeque<String>,
    calls: Vec<Call>,
    issued: u64,
    strip_artifacts: bool,
}

/// In-memory stand-in for the channel-management API.
///
/// Behaves like the real service for the happy paths (create rejects
/// duplicates, connect reports QR or open state, delete removes) and lets
/// tests inject one-shot failures per operation.
pub struct MockChannelApi {
    inner: Mutex<Inner>,
    exists_status: u16,
}

impl Default for MockChannelApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChannelApi {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            exists_status: 403,
        }
    }

    /// Status used to reject a create for a name that already exists.
    pub fn with_exists_status(mut self, status: u16) -> Self {
        self.exists_status = status;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking test thread must not hide the state from the others.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register an unpaired remote instance, as if created out-of-band.
    pub fn seed_instance(&self, name: &str) {
        let mut inner = self.lock();
        let artifact = inner.next_artifact(name);
        inner.instances.insert(
            name.to_string(),
            RemoteInstance {
                artifact,
                paired: false,
                broken: false,
            },
        );
    }

    /// Simulate the user scanning the QR.
    pub fn mark_paired(&self, name: &str) {
        if let Some(instance) = self.lock().instances.get_mut(name) {
            instance.paired = true;
        }
    }

    pub fn mark_broken(&self, name: &str) {
        if let Some(instance) = self.lock().instances.get_mut(name) {
            instance.broken = true;
        }
    }

    /// Fail the next call of `op` with `err`. Multiple faults queue up.
    pub fn fail_next(&self, op: Operation, err: ApiError) {
        self.lock().faults.entry(op).or_default().push_back(err);
    }

    /// Every later call of `op` is recorded, then held for `stall` before it
    /// is answered.
    pub fn stall(&self, op: Operation, stall: Stall) {
        self.lock().stalls.insert(op, stall);
    }

    /// Record the call and wait out any stall configured for `op`. The lock is
    /// not held while waiting.
    async fn arrive(&self, op: Operation, call: Call) {
        let stall = {
            let mut inner = self.lock();
            inner.calls.push(call);
            inner.stalls.get(&op).copied()
        };
        match stall {
            Some(Stall::For(duration)) => tokio::time::sleep(duration).await,
            Some(Stall::Forever) => std::future::pending::<()>().await,
            None => {}
        }
    }

    /// Artifact handed out by the next instance creation.
    pub fn queue_artifact(&self, artifact: impl Into<String>) {
        self.lock().queued_artifacts.push_back(artifact.into());
    }

    /// Create replies succeed without any QR payload.
    pub fn strip_artifacts(&self, strip: bool) {
        self.lock().strip_artifacts = strip;
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lock().instances.contains_key(name)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, op: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| {
                matches!(
                    (op, call),
                    (Operation::Create, Call::Create(_))
                        | (Operation::Connect, Call::Connect(_))
                        | (Operation::Delete, Call::Delete(_))
                )
            })
            .count()
    }
}

impl Inner {
    fn next_artifact(&mut self, name: &str) -> String {
        self.issued += 1;
        self.queued_artifacts
            .pop_front()
            .unwrap_or_else(|| format!("QR-{}-{}", name, self.issued))
    }

    fn take_fault(&mut self, op: Operation) -> Option<ApiError> {
        self.faults.get_mut(&op).and_then(|queue| queue.pop_front())
    }
}

fn not_found(name: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!(r#"{{"error":"instance {} not found"}}"#, name),
    }
}

#[async_trait]
impl ChannelApi for MockChannelApi {
    async fn create_instance(&self, name: &InstanceName) -> Result<CreatedInstance, ApiError> {
        self.arrive(Operation::Create, Call::Create(name.to_string())).await;
        let mut inner = self.lock();
        if let Some(err) = inner.take_fault(Operation::Create) {
            return Err(err);
        }
        if inner.instances.contains_key(name.as_str()) {
            return Err(ApiError::Status {
                status: self.exists_status,
                body: format!(r#"{{"error":"instance {} already in use"}}"#, name),
            });
        }
        let artifact = inner.next_artifact(name.as_str());
        inner.instances.insert(
            name.to_string(),
            RemoteInstance {
                artifact: artifact.clone(),
                paired: false,
                broken: false,
            },
        );
        let artifact = (!inner.strip_artifacts).then_some(artifact);
        Ok(CreatedInstance { artifact })
    }

    async fn connect_instance(&self, name: &InstanceName) -> Result<ConnectState, ApiError> {
        self.arrive(Operation::Connect, Call::Connect(name.to_string())).await;
        let mut inner = self.lock();
        if let Some(err) = inner.take_fault(Operation::Connect) {
            return Err(err);
        }
        let Some(instance) = inner.instances.get(name.as_str()) else {
            return Err(not_found(name.as_str()));
        };
        let state = if instance.broken {
            ConnectState::Ambiguous {
                state: Some("connecting".to_string()),
            }
        } else if instance.paired {
            ConnectState::Connected
        } else {
            ConnectState::Paired(instance.artifact.clone())
        };
        Ok(state)
    }

    async fn delete_instance(&self, name: &InstanceName) -> Result<(), ApiError> {
        self.arrive(Operation::Delete, Call::Delete(name.to_string())).await;
        let mut inner = self.lock();
        if let Some(err) = inner.take_fault(Operation::Delete) {
            return Err(err);
        }
        match inner.instances.remove(name.as_str()) {
            Some(_) => Ok(()),
            None => Err(not_found(name.as_str())),
        }
    }
}
