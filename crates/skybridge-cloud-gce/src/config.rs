//! GCE connection settings

use crate::error::{GceError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";
pub const DEFAULT_NETWORK: &str = "global/networks/default";

fn default_compute_endpoint() -> String {
    DEFAULT_COMPUTE_ENDPOINT.to_string()
}

fn default_network() -> String {
    DEFAULT_NETWORK.to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GceConfig {
    /// Path to the service account key (JSON)
    pub key_file: PathBuf,

    /// Zone instances live in (e.g., "europe-west1-b")
    pub zone: String,

    /// Network new instances attach to
    #[serde(default = "default_network")]
    pub network: String,

    #[serde(default = "default_compute_endpoint")]
    pub compute_endpoint: String,

    /// Overrides the token endpoint named in the key file
    #[serde(default)]
    pub token_uri: Option<String>,

    /// HTTP timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl GceConfig {
    pub fn new(key_file: impl Into<PathBuf>, zone: impl Into<String>) -> Self {
        Self {
            key_file: key_file.into(),
            zone: zone.into(),
            network: default_network(),
            compute_endpoint: default_compute_endpoint(),
            token_uri: None,
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Region containing the configured zone ("europe-west1-b" -> "europe-west1")
    pub fn region(&self) -> String {
        self.zone
            .rsplit_once('-')
            .map_or_else(|| self.zone.clone(), |(region, _)| region.to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if self.zone.trim().is_empty() {
            return Err(GceError::InvalidConfig("zone is required".to_string()));
        }
        if self.key_file.as_os_str().is_empty() {
            return Err(GceError::InvalidConfig("key_file is required".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(GceError::InvalidConfig(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
