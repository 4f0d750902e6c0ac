//! Compute Engine v1 resource models
//!
//! Only the fields Skybridge reads or writes are modelled.

use serde::{Deserialize, Serialize};

/// Paged list response shared by every collection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GceInstance {
    pub name: String,
    pub status: String,
    /// Full URL, ends in `machineTypes/{name}`
    #[serde(default)]
    pub machine_type: String,
    #[serde(default)]
    pub creation_timestamp: String,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub labels: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkInterface {
    #[serde(rename = "networkIP", default)]
    pub network_ip: Option<String>,
    #[serde(rename = "accessConfigs", default)]
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub config_type: String,
    #[serde(rename = "natIP", default, skip_serializing_if = "Option::is_none")]
    pub nat_ip: Option<String>,
}

impl AccessConfig {
    pub fn external_nat() -> Self {
        Self {
            name: "External NAT".to_string(),
            config_type: "ONE_TO_ONE_NAT".to_string(),
            nat_ip: None,
        }
    }
}

/// Network tags plus the fingerprint setTags requires
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    pub items: Vec<MetadataItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertInstance {
    pub name: String,
    /// Partial URL, `zones/{zone}/machineTypes/{name}`
    pub machine_type: String,
    pub disks: Vec<AttachedDisk>,
    pub network_interfaces: Vec<NetworkInterfaceDefinition>,
    pub tags: Tags,
    pub metadata: Metadata,
    pub labels: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    pub boot: bool,
    pub auto_delete: bool,
    pub initialize_params: InitializeParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub source_image: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceDefinition {
    pub network: String,
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub guest_cpus: u32,
    #[serde(default)]
    pub memory_mb: u64,
    #[serde(default)]
    pub image_space_gb: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GceImage {
    pub name: String,
    #[serde(default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Int64 values are encoded as JSON strings
    #[serde(default)]
    pub disk_size_gb: Option<String>,
    #[serde(default)]
    pub creation_timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub name: String,
    #[serde(default)]
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Firewall {
    pub name: String,
    #[serde(default)]
    pub target_tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub quotas: Vec<Quota>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Quota {
    pub metric: String,
    #[serde(default)]
    pub limit: f64,
    #[serde(default)]
    pub usage: f64,
}

/// Zone operation returned by every mutating call
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    /// PENDING, RUNNING or DONE
    pub status: String,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub target_link: Option<String>,
    #[serde(default)]
    pub error: Option<OperationErrors>,
}

impl Operation {
    pub fn is_done(&self) -> bool {
        self.status == "DONE"
    }

    /// Messages of every error the operation reported, if any
    pub fn error_messages(&self) -> Vec<String> {
        self.error
            .iter()
            .flat_map(|error| error.errors.iter())
            .map(|item| format!("{}: {}", item.code, item.message))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationErrors {
    #[serde(default)]
    pub errors: Vec<OperationErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationErrorItem {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_instance_network_fields() {
        let instance: GceInstance = serde_json::from_value(json!({
            "name": "web-1",
            "status": "RUNNING",
            "machineType": "https://compute.googleapis.com/compute/v1/projects/p/zones/z/machineTypes/e2-small",
            "networkInterfaces": [{
                "networkIP": "10.0.0.2",
                "accessConfigs": [{"name": "External NAT", "type": "ONE_TO_ONE_NAT", "natIP": "34.1.2.3"}]
            }],
            "tags": {"items": ["web"], "fingerprint": "abc="}
        }))
        .unwrap();

        let interface = &instance.network_interfaces[0];
        assert_eq!(interface.network_ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(interface.access_configs[0].nat_ip.as_deref(), Some("34.1.2.3"));
        assert_eq!(instance.tags.fingerprint.as_deref(), Some("abc="));
    }

    #[test]
    fn test_operation_error_messages() {
        let operation: Operation = serde_json::from_value(json!({
            "name": "operation-1",
            "status": "DONE",
            "error": {"errors": [
                {"code": "QUOTA_EXCEEDED", "message": "Quota 'CPUS' exceeded."},
                {"code": "RESOURCE_NOT_READY", "message": "Disk not ready."}
            ]}
        }))
        .unwrap();

        assert!(operation.is_done());
        assert_eq!(
            operation.error_messages(),
            vec![
                "QUOTA_EXCEEDED: Quota 'CPUS' exceeded.",
                "RESOURCE_NOT_READY: Disk not ready."
            ]
        );
    }

    #[test]
    fn test_access_config_serializes_without_nat_ip() {
        let value = serde_json::to_value(AccessConfig::external_nat()).unwrap();
        assert_eq!(value, json!({"name": "External NAT", "type": "ONE_TO_ONE_NAT"}));
    }
}
