//! GCE provider error types

use skybridge_cloud::CloudError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GceError {
    #[error("Failed to read service account key {}: {source}", path.display())]
    KeyFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid service account key: {0}")]
    InvalidKey(String),

    #[error("Failed to sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Error authenticating to google: {message}")]
    Authentication {
        status: Option<u16>,
        message: String,
    },

    #[error("Compute API returned {status} for {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] skybridge_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, GceError>;

impl From<GceError> for CloudError {
    fn from(err: GceError) -> Self {
        match err {
            GceError::KeyFile { .. } | GceError::InvalidKey(_) => {
                CloudError::InvalidConfig(err.to_string())
            }
            GceError::InvalidConfig(message) => CloudError::InvalidConfig(message),
            GceError::Jwt(_) => CloudError::auth(None, err.to_string()),
            GceError::Authentication { status, .. } => CloudError::auth(status, err.to_string()),
            GceError::Api { status: 404, .. } => CloudError::NotFound(err.to_string()),
            GceError::Api {
                status: status @ (401 | 403),
                ..
            } => CloudError::auth(Some(status), err.to_string()),
            GceError::Api { status, .. } => CloudError::transport(Some(status), err.to_string()),
            GceError::Http(e) if e.is_timeout() => CloudError::Timeout(e.to_string()),
            GceError::Http(e) => {
                CloudError::transport(e.status().map(|s| s.as_u16()), e.to_string())
            }
            GceError::Json(e) => CloudError::Json(e),
            GceError::CloudError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let not_found = GceError::Api {
            status: 404,
            url: "instances/web-1".to_string(),
            message: "The resource was not found".to_string(),
        };
        assert!(matches!(CloudError::from(not_found), CloudError::NotFound(_)));

        let key = GceError::InvalidKey("missing project_id".to_string());
        assert!(matches!(CloudError::from(key), CloudError::InvalidConfig(_)));

        let denied = GceError::Authentication {
            status: Some(400),
            message: "invalid_grant".to_string(),
        };
        assert_eq!(CloudError::from(denied).backend_status(), Some(400));
    }
}
