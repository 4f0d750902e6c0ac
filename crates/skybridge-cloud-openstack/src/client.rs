//! Authenticated HTTP client for the OpenStack service endpoints

use crate::auth::KeystoneAuthenticator;
use crate::config::OpenStackConfig;
use crate::error::{OpenStackError, Result};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use skybridge_cloud::{Credential, CredentialManager};

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Thin wrapper around [`reqwest::Client`] that attaches the cached Keystone
/// token to every request
pub struct OpenStackClient {
    http: reqwest::Client,
    credentials: CredentialManager<KeystoneAuthenticator>,
    compute_endpoint: String,
    image_endpoint: String,
    network_endpoint: String,
}

impl OpenStackClient {
    pub fn new(config: &OpenStackConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        let authenticator = KeystoneAuthenticator::new(
            http.clone(),
            &config.identity_endpoint,
            &config.application_id,
            &config.application_secret,
        );

        Ok(Self {
            http,
            credentials: CredentialManager::new(authenticator),
            compute_endpoint: config.compute_endpoint.trim_end_matches('/').to_string(),
            image_endpoint: config.image_endpoint.trim_end_matches('/').to_string(),
            network_endpoint: config.network_endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn credentials(&self) -> &CredentialManager<KeystoneAuthenticator> {
        &self.credentials
    }

    /// Nova URL for a path such as `/v2/servers`
    pub fn compute_url(&self, path: &str) -> String {
        format!("{}{}", self.compute_endpoint, path)
    }

    /// Glance URL for a path such as `/v2/images`
    pub fn image_url(&self, path: &str) -> String {
        format!("{}{}", self.image_endpoint, path)
    }

    /// Neutron URL for a path such as `/v2.0/security-groups`
    pub fn network_url(&self, path: &str) -> String {
        format!("{}{}", self.network_endpoint, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.execute::<()>(Method::GET, url, None).await?;
        Ok(response.json().await?)
    }

    pub async fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(Method::POST, url, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// POST whose response body is ignored (server actions answer 202 with no body)
    pub async fn post_discard<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        self.execute(Method::POST, url, Some(body)).await?;
        Ok(())
    }

    pub async fn delete(&self, url: &str) -> Result<()> {
        self.execute::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn token(&self) -> Result<Credential> {
        Ok(self.credentials.bearer().await?)
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let credential = self.token().await?;

        tracing::debug!("{} {}", method, url);
        let mut request = self
            .http
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, credential.token());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Token rejected by {}, discarding cached credential", url);
            self.credentials.invalidate().await;
        }

        let text = response.text().await.unwrap_or_default();
        Err(OpenStackError::Api {
            status: status.as_u16(),
            url: url.to_string(),
            message: fault_message(&text).unwrap_or(text),
        })
    }
}

/// Extract the human readable message from an OpenStack fault body
///
/// Nova wraps faults as `{"itemNotFound": {"message": ..., "code": 404}}`;
/// Neutron uses `{"NeutronError": {"message": ...}}`.
fn fault_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .as_object()?
        .values()
        .find_map(|fault| fault.get("message")?.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_message() {
        let body = r#"{"itemNotFound": {"message": "Instance abc could not be found.", "code": 404}}"#;
        assert_eq!(
            fault_message(body).as_deref(),
            Some("Instance abc could not be found.")
        );
        assert!(fault_message("<html>bad gateway</html>").is_none());
        assert!(fault_message(r#"{"error": "plain"}"#).is_none());
    }
}
