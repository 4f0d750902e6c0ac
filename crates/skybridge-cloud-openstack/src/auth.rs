//! Keystone v3 application-credential authentication

use crate::error::OpenStackError;
use crate::models::{AuthRequest, TokenResponse};
use async_trait::async_trait;
use reqwest::StatusCode;
use skybridge_cloud::{Authenticate, Credential};

const SUBJECT_TOKEN_HEADER: &str = "x-subject-token";

/// Exchanges an application credential for a Keystone token
pub struct KeystoneAuthenticator {
    http: reqwest::Client,
    endpoint: String,
    application_id: String,
    application_secret: String,
}

impl KeystoneAuthenticator {
    pub fn new(
        http: reqwest::Client,
        identity_endpoint: &str,
        application_id: impl Into<String>,
        application_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: format!("{}/v3/auth/tokens", identity_endpoint.trim_end_matches('/')),
            application_id: application_id.into(),
            application_secret: application_secret.into(),
        }
    }

    async fn request_token(&self) -> Result<Credential, OpenStackError> {
        tracing::debug!("Requesting keystone token from {}", self.endpoint);

        let body = AuthRequest::application_credential(&self.application_id, &self.application_secret);
        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(unreachable_identity)?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let message = response.text().await.unwrap_or_default();
            return Err(OpenStackError::Authentication {
                status: Some(status.as_u16()),
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or(OpenStackError::MissingSubjectToken)?;

        let body: TokenResponse = response.json().await.map_err(unreachable_identity)?;
        Ok(Credential::new(token, body.token.expires_at))
    }
}

/// Transport and decode failures on the identity endpoint count as
/// authentication failures, not backend failures
fn unreachable_identity(e: reqwest::Error) -> OpenStackError {
    OpenStackError::Authentication {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

#[async_trait]
impl Authenticate for KeystoneAuthenticator {
    fn realm(&self) -> &str {
        "openstack"
    }

    async fn authenticate(&self) -> skybridge_cloud::Result<Credential> {
        Ok(self.request_token().await?)
    }
}
