//! OpenStack connection settings

use crate::error::{OpenStackError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Endpoints and application credential for one OpenStack project
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenStackConfig {
    /// Keystone endpoint (without `/v3`)
    pub identity_endpoint: String,

    /// Nova endpoint (without `/v2`)
    pub compute_endpoint: String,

    /// Glance endpoint (without `/v2`)
    pub image_endpoint: String,

    /// Neutron endpoint (without `/v2.0`)
    pub network_endpoint: String,

    pub application_id: String,

    /// Usually supplied through the environment rather than the settings file
    #[serde(default)]
    pub application_secret: String,

    /// Network name whose first address is reported as the instance address
    pub address_provider: String,

    /// Network UUID(s) new instances are attached to, comma separated
    pub address_provider_uuid: String,

    /// HTTP timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl OpenStackConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Network UUIDs new instances are attached to
    pub fn network_uuids(&self) -> Vec<String> {
        self.address_provider_uuid
            .split(',')
            .map(str::trim)
            .filter(|uuid| !uuid.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check that every required setting is present
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("identity_endpoint", &self.identity_endpoint),
            ("compute_endpoint", &self.compute_endpoint),
            ("image_endpoint", &self.image_endpoint),
            ("network_endpoint", &self.network_endpoint),
            ("application_id", &self.application_id),
            ("application_secret", &self.application_secret),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(OpenStackError::InvalidConfig(format!("{key} is required")));
            }
        }
        if self.timeout_ms == 0 {
            return Err(OpenStackError::InvalidConfig(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for OpenStackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenStackConfig")
            .field("identity_endpoint", &self.identity_endpoint)
            .field("compute_endpoint", &self.compute_endpoint)
            .field("image_endpoint", &self.image_endpoint)
            .field("network_endpoint", &self.network_endpoint)
            .field("application_id", &self.application_id)
            .field("application_secret", &"<redacted>")
            .field("address_provider", &self.address_provider)
            .field("address_provider_uuid", &self.address_provider_uuid)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
