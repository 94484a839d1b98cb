use std::fmt;

/// States of one provisioning run. Every run starts at `Start`; nothing is
/// carried over between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionState {
    Start,
    Creating,
    PairedNew,
    AlreadyExists,
    Adopting,
    PairedExisting,
    Connected,
    Ambiguous,
    Resetting,
    Recreating,
    PairedReset,
    Failed,
    Cancelled,
}

impl ProvisionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionState::Start => "start",
            ProvisionState::Creating => "creating",
            ProvisionState::PairedNew => "paired_new",
            ProvisionState::AlreadyExists => "already_exists",
            ProvisionState::Adopting => "adopting",
            ProvisionState::PairedExisting => "paired_existing",
            ProvisionState::Connected => "connected",
            ProvisionState::Ambiguous => "ambiguous",
            ProvisionState::Resetting => "resetting",
            ProvisionState::Recreating => "recreating",
            ProvisionState::PairedReset => "paired_reset",
            ProvisionState::Failed => "failed",
            ProvisionState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProvisionState::PairedNew
                | ProvisionState::PairedExisting
                | ProvisionState::Connected
                | ProvisionState::PairedReset
                | ProvisionState::Failed
                | ProvisionState::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: ProvisionState) -> bool {
        use ProvisionState::*;
        if next == Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (*self, next),
            (Start, Creating)
                | (Creating, PairedNew)
                | (Creating, AlreadyExists)
                | (Creating, Failed)
                | (AlreadyExists, Adopting)
                | (Adopting, PairedExisting)
                | (Adopting, Connected)
                | (Adopting, Ambiguous)
                | (Ambiguous, Resetting)
                | (Resetting, Recreating)
                | (Recreating, PairedReset)
                | (Recreating, Failed)
        )
    }
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path taken by one run.
#[derive(Debug, Clone)]
pub struct Transitions {
    current: ProvisionState,
    path: Vec<ProvisionState>,
}

impl Default for Transitions {
    fn default() -> Self {
        Self::new()
    }
}

impl Transitions {
    pub fn new() -> Self {
        Self {
            current: ProvisionState::Start,
            path: vec![ProvisionState::Start],
        }
    }

    pub fn current(&self) -> ProvisionState {
        self.current
    }

    pub fn path(&self) -> &[ProvisionState] {
        &self.path
    }

    /// Move to `next` if the graph allows it. Returns false (and logs) otherwise.
    pub fn advance(&mut self, next: ProvisionState, reason: &str) -> bool {
        if !self.current.can_transition_to(next) {
            tracing::error!(
                from = %self.current,
                to = %next,
                reason,
                "❌ [state_machine] rejected transition"
            );
            return false;
        }
        tracing::debug!(from = %self.current, to = %next, reason, "🔄 [state_machine] transition");
        self.current = next;
        self.path.push(next);
        true
    }
}
