//! Settings discovery and loading for Skybridge

pub mod error;
pub mod settings;

pub use error::*;
pub use settings::{LogSettings, ProviderSettings, Settings};

use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "SKYBRIDGE_CONFIG";

const LOCAL_FILE: &str = "skybridge.yaml";
const GLOBAL_FILE: &str = "config.yaml";

/// Skybridge's per-user config directory
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("skybridge"))
}

/// Locate the settings file
///
/// Search order:
/// 1. `SKYBRIDGE_CONFIG` (direct path)
/// 2. `./skybridge.yaml`
/// 3. `~/.config/skybridge/config.yaml`
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!("{} points at missing file {}", CONFIG_PATH_ENV, path.display());
    }

    let local = std::env::current_dir()?.join(LOCAL_FILE);
    if local.exists() {
        return Ok(local);
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join(GLOBAL_FILE);
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Find and load the settings file
pub fn load() -> Result<Settings> {
    let path = find_config_file()?;
    tracing::debug!("Loading settings from {}", path.display());
    Settings::from_file(&path)
}
