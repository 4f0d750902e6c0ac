//! Authenticated Compute Engine client and per-collection handles

use crate::auth::GoogleAuthenticator;
use crate::config::GceConfig;
use crate::error::{GceError, Result};
use crate::key::ServiceAccountKey;
use crate::models::{List, Operation};
use crate::operation::OperationSource;
use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use skybridge_cloud::CredentialManager;
use std::time::Duration;

/// Google access tokens live for an hour; refresh five minutes early
const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(5 * 60);

pub struct GceClient {
    http: reqwest::Client,
    credentials: CredentialManager<GoogleAuthenticator>,
    endpoint: String,
    project: String,
    zone: String,
    region: String,
}

impl GceClient {
    pub fn new(config: &GceConfig, key: ServiceAccountKey) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        let project = key.project_id.clone();
        let authenticator = GoogleAuthenticator::new(http.clone(), key, config.token_uri.clone())?;

        Ok(Self {
            http,
            credentials: CredentialManager::new(authenticator)
                .with_safety_margin(TOKEN_SAFETY_MARGIN),
            endpoint: config.compute_endpoint.trim_end_matches('/').to_string(),
            project,
            zone: config.zone.clone(),
            region: config.region(),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn credentials(&self) -> &CredentialManager<GoogleAuthenticator> {
        &self.credentials
    }

    pub fn instances(&self) -> Collection<'_> {
        self.zonal("instances")
    }

    pub fn machine_types(&self) -> Collection<'_> {
        self.zonal("machineTypes")
    }

    pub fn zone_operations(&self) -> Collection<'_> {
        self.zonal("operations")
    }

    pub fn images(&self) -> Collection<'_> {
        self.global("images")
    }

    pub fn networks(&self) -> Collection<'_> {
        self.global("networks")
    }

    pub fn firewalls(&self) -> Collection<'_> {
        self.global("firewalls")
    }

    pub fn regions(&self) -> Collection<'_> {
        Collection {
            client: self,
            url: format!("{}/projects/{}/regions", self.endpoint, self.project),
        }
    }

    fn zonal(&self, collection: &str) -> Collection<'_> {
        Collection {
            client: self,
            url: format!(
                "{}/projects/{}/zones/{}/{}",
                self.endpoint, self.project, self.zone, collection
            ),
        }
    }

    fn global(&self, collection: &str) -> Collection<'_> {
        Collection {
            client: self,
            url: format!(
                "{}/projects/{}/global/{}",
                self.endpoint, self.project, collection
            ),
        }
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response> {
        let credential = self.credentials.bearer().await?;

        tracing::debug!("{} {}", method, url);
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(credential.token())
            .query(query);
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
        Err(GceError::Api {
            status: status.as_u16(),
            url: url.to_string(),
            message: error_message(&text).unwrap_or(text),
        })
    }
}

#[async_trait]
impl OperationSource for GceClient {
    async fn operation(&self, name: &str) -> skybridge_cloud::Result<Operation> {
        Ok(self.zone_operations().get(name).await?)
    }
}

/// Handle on one resource collection (instances, images, firewalls, ...)
pub struct Collection<'a> {
    client: &'a GceClient,
    url: String,
}

impl Collection<'_> {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let url = format!("{}/{}", self.url, name);
        let response = self
            .client
            .execute::<()>(Method::GET, &url, &[], None)
            .await?;
        Ok(response.json().await?)
    }

    /// Every item in the collection, following `nextPageToken`
    pub async fn list<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let query: Vec<(&str, &str)> = match page_token.as_deref() {
                Some(token) => vec![("pageToken", token)],
                None => Vec::new(),
            };
            let response = self
                .client
                .execute::<()>(Method::GET, &self.url, &query, None)
                .await?;
            let page: List<T> = response.json().await?;
            items.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(items),
            }
        }
    }

    pub async fn insert<B: Serialize + ?Sized>(&self, body: &B) -> Result<Operation> {
        let response = self
            .client
            .execute(Method::POST, &self.url, &[], Some(body))
            .await?;
        Ok(response.json().await?)
    }

    /// Custom method on one resource, e.g. `POST instances/{name}/start`
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        name: &str,
        method: &str,
        body: Option<&B>,
    ) -> Result<Operation> {
        let url = format!("{}/{}/{}", self.url, name, method);
        let response = self.client.execute(Method::POST, &url, &[], body).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, name: &str) -> Result<Operation> {
        let url = format!("{}/{}", self.url, name);
        let response = self
            .client
            .execute::<()>(Method::DELETE, &url, &[], None)
            .await?;
        Ok(response.json().await?)
    }
}

/// `error.message` of a Google API error body
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        let body = r#"{"error": {"code": 404, "message": "The resource 'projects/p/zones/z/instances/x' was not found", "errors": []}}"#;
        assert!(error_message(body).unwrap().contains("was not found"));
        assert!(error_message("Not Found").is_none());
    }
}
