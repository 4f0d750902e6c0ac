//! OpenStack provider error types

use skybridge_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("Error authenticating to openstack: {message}")]
    Authentication {
        status: Option<u16>,
        message: String,
    },

    #[error("Keystone response carried no X-Subject-Token header")]
    MissingSubjectToken,

    #[error("OpenStack API returned {status} for {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] skybridge_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, OpenStackError>;

impl From<OpenStackError> for CloudError {
    fn from(err: OpenStackError) -> Self {
        match err {
            OpenStackError::Authentication { status, message } => CloudError::auth(
                status,
                format!("Error authenticating to openstack: {message}"),
            ),
            OpenStackError::MissingSubjectToken => CloudError::auth(None, err.to_string()),
            OpenStackError::Api { status: 404, .. } => CloudError::NotFound(err.to_string()),
            OpenStackError::Api {
                status: status @ (401 | 403),
                ..
            } => CloudError::auth(Some(status), err.to_string()),
            OpenStackError::Api { status, .. } => {
                CloudError::transport(Some(status), err.to_string())
            }
            OpenStackError::InvalidConfig(message) => CloudError::InvalidConfig(message),
            OpenStackError::Http(e) if e.is_timeout() => CloudError::Timeout(e.to_string()),
            OpenStackError::Http(e) => {
                CloudError::transport(e.status().map(|s| s.as_u16()), e.to_string())
            }
            OpenStackError::CloudError(e) => e,
        }
    }
}
