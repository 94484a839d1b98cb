use std::time::Duration;
use thiserror::Error;

/// Failure of a single call against the channel-management API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("undecodable response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Create rejections meaning "name already taken". The upstream answers
    /// with 403 or 400 depending on its version.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ApiError::Status { status: 400 | 403, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout)
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_exists_is_400_or_403_only() {
        let status = |status| ApiError::Status { status, body: String::new() };
        assert!(status(400).is_already_exists());
        assert!(status(403).is_already_exists());
        assert!(!status(404).is_already_exists());
        assert!(!status(409).is_already_exists());
        assert!(!status(500).is_already_exists());
        assert!(!ApiError::Timeout(Duration::from_secs(1)).is_already_exists());
    }
}
