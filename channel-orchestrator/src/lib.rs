//! Provisioning and recovery of remote channel instances.

pub mod cancel;
pub mod provisioning;
pub mod state_machine;

pub use cancel::CancelToken;
pub use provisioning::{Provisioner, DEFAULT_SETTLE_INTERVAL};
pub use state_machine::{ProvisionState, Transitions};
