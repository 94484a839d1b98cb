use std::fmt;
use thiserror::Error;

/// Step of a provisioning run, carried by errors so logs say where it broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Create,
    Adopt,
    Delete,
    Settle,
    Recreate,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Create => "create",
            Step::Adopt => "adopt",
            Step::Delete => "delete",
            Step::Settle => "settle",
            Step::Recreate => "recreate",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("upstream unavailable during {step}: {message}")]
    UpstreamUnavailable { step: Step, message: String },

    #[error("upstream protocol error during {step}: {message}")]
    UpstreamProtocolError { step: Step, message: String },

    #[error("provisioning failed after reset: {message}")]
    ProvisioningFailed { message: String },

    #[error("cancelled during {step}")]
    Cancelled { step: Step },
}

impl ProvisionError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProvisionError::InvalidArgument(_))
    }

    pub fn step(&self) -> Option<Step> {
        match self {
            ProvisionError::InvalidArgument(_) | ProvisionError::ProvisioningFailed { .. } => None,
            ProvisionError::UpstreamUnavailable { step, .. }
            | ProvisionError::UpstreamProtocolError { step, .. }
            | ProvisionError::Cancelled { step } => Some(*step),
        }
    }

    /// Message safe to hand to callers. Upstream detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ProvisionError::InvalidArgument(msg) => msg.clone(),
            ProvisionError::UpstreamUnavailable { .. } => {
                "Channel service is unavailable, try again later".to_string()
            }
            ProvisionError::UpstreamProtocolError { .. } => {
                "Channel service returned an unexpected response".to_string()
            }
            ProvisionError::ProvisioningFailed { .. } => {
                "Failed to recover existing instance".to_string()
            }
            ProvisionError::Cancelled { .. } => "Request was cancelled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invalid_argument_is_a_client_error() {
        assert!(ProvisionError::InvalidArgument("x".into()).is_client_error());
        assert!(!ProvisionError::Cancelled { step: Step::Settle }.is_client_error());
        assert!(!ProvisionError::ProvisioningFailed { message: "x".into() }.is_client_error());
    }

    #[test]
    fn public_message_hides_upstream_detail() {
        let err = ProvisionError::UpstreamUnavailable {
            step: Step::Create,
            message: "connect ECONNREFUSED 10.0.0.7:8080".into(),
        };
        assert!(!err.public_message().contains("10.0.0.7"));
        assert!(err.to_string().contains("10.0.0.7"));
        assert_eq!(err.step(), Some(Step::Create));
    }
}
