//! Settings file schema

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use skybridge_cloud_gce::GceConfig;
use skybridge_cloud_openstack::OpenStackConfig;
use std::path::{Path, PathBuf};

pub const OPENSTACK_SECRET_ENV: &str = "SKYBRIDGE_OPENSTACK_APPLICATION_SECRET";
pub const GCE_KEY_FILE_ENV: &str = "SKYBRIDGE_GCE_KEY_FILE";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log: LogSettings,
    pub provider: ProviderSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// The one backend this process talks to
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderSettings {
    OpenStack(OpenStackConfig),
    Gce(GceConfig),
}

impl ProviderSettings {
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderSettings::OpenStack(_) => "openstack",
            ProviderSettings::Gce(_) => "gce",
        }
    }
}

impl Settings {
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Read a settings file and apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::from_yaml(&content, &path.display().to_string())?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Secrets may come from the environment instead of the file
    pub fn apply_env_overrides(&mut self) {
        match &mut self.provider {
            ProviderSettings::OpenStack(config) => {
                if let Ok(secret) = std::env::var(OPENSTACK_SECRET_ENV) {
                    tracing::debug!("Using application secret from {}", OPENSTACK_SECRET_ENV);
                    config.application_secret = secret;
                }
            }
            ProviderSettings::Gce(config) => {
                if let Ok(key_file) = std::env::var(GCE_KEY_FILE_ENV) {
                    tracing::debug!("Using key file from {}", GCE_KEY_FILE_ENV);
                    config.key_file = PathBuf::from(key_file);
                }
            }
        }
    }
}
