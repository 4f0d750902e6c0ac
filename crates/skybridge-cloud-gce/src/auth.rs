//! OAuth2 JWT-bearer authentication for service accounts

use crate::error::{GceError, Result};
use crate::key::ServiceAccountKey;
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use skybridge_cloud::{Authenticate, Credential};

pub const COMPUTE_SCOPE: &str = "https://www.googleapis.com/auth/compute";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertions are valid for one hour, the maximum Google accepts
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Signs a JWT assertion with the service account key and exchanges it for
/// an access token
pub struct GoogleAuthenticator {
    http: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    token_uri: String,
}

impl GoogleAuthenticator {
    pub fn new(http: reqwest::Client, key: ServiceAccountKey, token_uri: Option<String>) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let token_uri = token_uri.unwrap_or_else(|| key.token_uri.clone());
        Ok(Self {
            http,
            key,
            encoding_key,
            token_uri,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    /// Signed RS256 assertion for the compute scope
    pub fn assertion(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: self.key.client_email.clone(),
            scope: COMPUTE_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    async fn request_token(&self) -> Result<Credential> {
        tracing::debug!("Requesting access token from {}", self.token_uri);

        let assertion = self.assertion()?;
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(unreachable_token_endpoint)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenError>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(GceError::Authentication {
                status: Some(status.as_u16()),
                message,
            });
        }

        let token: TokenResponse = response.json().await.map_err(unreachable_token_endpoint)?;
        let expires_at = Utc::now() + TimeDelta::seconds(token.expires_in);
        Ok(Credential::new(token.access_token, expires_at))
    }
}

#[async_trait]
impl Authenticate for GoogleAuthenticator {
    fn realm(&self) -> &str {
        "google"
    }

    async fn authenticate(&self) -> skybridge_cloud::Result<Credential> {
        Ok(self.request_token().await?)
    }
}

/// Transport and decode failures on the token endpoint count as
/// authentication failures
fn unreachable_token_endpoint(e: reqwest::Error) -> GceError {
    GceError::Authentication {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

// ============ API Types ============

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}
