//! Canonical data model shared by every provider
//!
//! Adapters translate their backend payloads into these types; nothing
//! backend-specific crosses the [`CloudProvider`](crate::CloudProvider) boundary.

use serde::{Deserialize, Serialize};

/// Canonical lifecycle state of an instance
///
/// Adapters never expose raw backend status strings; unmapped values end up
/// as [`InstanceState::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    /// Instance is being provisioned
    Building,
    /// Instance is running
    Active,
    /// Instance is shutting down
    Stopping,
    /// Instance is powered off
    Stopped,
    /// Instance is rebooting
    Rebooting,
    /// Instance exists but cannot be used (migrating, resizing, ...)
    Unavailable,
    /// Instance has been deleted or shelved
    Deleted,
    /// Instance is in error state
    Error,
    /// Status is unknown
    Unknown,
}

impl InstanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Building => "BUILDING",
            InstanceState::Active => "ACTIVE",
            InstanceState::Stopping => "STOPPING",
            InstanceState::Stopped => "STOPPED",
            InstanceState::Rebooting => "REBOOTING",
            InstanceState::Unavailable => "UNAVAILABLE",
            InstanceState::Deleted => "DELETED",
            InstanceState::Error => "ERROR",
            InstanceState::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fault reported by the backend for an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceFault {
    pub message: String,
    pub code: i64,
    pub details: Option<String>,
    pub created_at: Option<String>,
}

/// A virtual machine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Backend-native identifier, opaque to callers
    pub id: String,

    pub name: String,

    /// Canonical state
    pub state: InstanceState,

    pub flavour_id: String,

    pub image_id: String,

    /// Creation timestamp as reported by the backend (not reparsed)
    pub created_at: String,

    /// Primary address
    pub address: Option<String>,

    /// Security group (or network tag) names; order is not significant
    pub security_groups: Vec<String>,

    pub fault: Option<InstanceFault>,
}

/// A bootable image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub created_at: String,
}

/// A machine size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flavour {
    pub id: String,
    pub name: String,
    pub cpus: u32,
    /// RAM in megabytes
    pub ram: u64,
    /// Disk in gigabytes
    pub disk: u64,
}

/// Quota and usage counters
///
/// Counters a backend cannot source are reported as `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub max_total_ram_size: i64,
    pub total_ram_used: i64,
    pub total_instances_used: i64,
    pub max_total_instances: i64,
    pub max_total_cores: i64,
    pub total_cores_used: i64,
}
