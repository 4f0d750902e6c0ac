//! Cloud provider error types

use thiserror::Error;

/// Cloud provider errors
///
/// Every adapter reports failures through this enum so the caller can map
/// each kind to a boundary response without knowing the backend.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Authentication failed: {message}")]
    Auth {
        status: Option<u16>,
        message: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Backend request failed: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn auth(status: Option<u16>, message: impl Into<String>) -> Self {
        CloudError::Auth {
            status,
            message: message.into(),
        }
    }

    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        CloudError::Transport {
            status,
            message: message.into(),
        }
    }

    /// Status code reported by the backend, when there was one
    pub fn backend_status(&self) -> Option<u16> {
        match self {
            CloudError::Auth { status, .. } | CloudError::Transport { status, .. } => *status,
            CloudError::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Whether the failure is a transport timeout (retryable by the operation poller)
    pub fn is_timeout(&self) -> bool {
        matches!(self, CloudError::Timeout(_))
    }

    /// Status the HTTP boundary should answer with for this error
    pub fn http_status(&self) -> u16 {
        match self {
            CloudError::NotFound(_) => 404,
            CloudError::Validation(_) => 400,
            CloudError::Auth {
                status: Some(403), ..
            } => 403,
            CloudError::Auth { .. } => 401,
            CloudError::Transport { .. } | CloudError::Timeout(_) | CloudError::Operation(_) => {
                502
            }
            CloudError::InvalidConfig(_) | CloudError::Io(_) | CloudError::Json(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(CloudError::NotFound("server abc".into()).http_status(), 404);
        assert_eq!(CloudError::Validation("bad tag".into()).http_status(), 400);
        assert_eq!(CloudError::auth(Some(401), "expired").http_status(), 401);
        assert_eq!(CloudError::auth(None, "unreachable").http_status(), 401);
        assert_eq!(CloudError::transport(Some(503), "down").http_status(), 502);
        assert_eq!(CloudError::InvalidConfig("zone".into()).http_status(), 500);
    }

    #[test]
    fn test_forbidden_auth_keeps_backend_status() {
        assert_eq!(CloudError::auth(Some(403), "denied").http_status(), 403);
        assert_eq!(CloudError::auth(Some(400), "invalid_grant").http_status(), 401);
    }

    #[test]
    fn test_backend_status() {
        assert_eq!(
            CloudError::transport(Some(409), "conflict").backend_status(),
            Some(409)
        );
        assert_eq!(CloudError::NotFound("x".into()).backend_status(), Some(404));
        assert_eq!(CloudError::Operation("x".into()).backend_status(), None);
    }

    #[test]
    fn test_is_timeout() {
        assert!(CloudError::Timeout("operation poll".into()).is_timeout());
        assert!(!CloudError::transport(None, "connection refused").is_timeout());
    }
}
