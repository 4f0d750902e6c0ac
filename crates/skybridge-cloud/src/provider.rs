//! Cloud provider trait definition

use crate::error::Result;
use crate::model::{Flavour, Image, Instance, Metrics};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cloud provider abstraction trait
///
/// All backends (OpenStack, GCE) implement this trait to provide a unified
/// interface for virtual machine management. Implementations are long-lived:
/// the caller constructs one per configured backend and shares it (usually
/// behind an `Arc`) between concurrent requests.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "openstack", "gce")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Fetch one instance
    ///
    /// Fails with [`CloudError::NotFound`](crate::CloudError::NotFound) when the
    /// backend has no such instance.
    async fn instance(&self, id: &str) -> Result<Instance>;

    /// Fetch every instance visible to the configured scope
    async fn instances(&self) -> Result<Vec<Instance>>;

    /// Identifiers of every instance visible to the configured scope
    async fn instance_identifiers(&self) -> Result<Vec<String>>;

    /// Security groups attached to an instance
    async fn security_groups_for_instance(&self, id: &str) -> Result<Vec<String>>;

    /// Attach a security group to an instance (no-op when already attached)
    async fn add_security_group_for_instance(&self, id: &str, name: &str) -> Result<()>;

    /// Detach a security group from an instance (no-op when not attached)
    async fn remove_security_group_from_instance(&self, id: &str, name: &str) -> Result<()>;

    /// Create an instance and return its identifier
    async fn create_instance(&self, request: &CreateInstanceRequest) -> Result<String>;

    async fn delete_instance(&self, id: &str) -> Result<()>;

    async fn start_instance(&self, id: &str) -> Result<()>;

    async fn shutdown_instance(&self, id: &str) -> Result<()>;

    /// Reboot an instance
    ///
    /// Backends without a native reboot action shut the instance down and
    /// start it again, in that order.
    async fn reboot_instance(&self, id: &str) -> Result<()>;

    async fn images(&self) -> Result<Vec<Image>>;

    async fn image(&self, id: &str) -> Result<Image>;

    async fn flavours(&self) -> Result<Vec<Flavour>>;

    async fn flavour(&self, id: &str) -> Result<Flavour>;

    /// Catalog of security group names available in the current scope, deduplicated
    async fn security_groups(&self) -> Result<Vec<String>>;

    /// Quota and usage counters
    async fn metrics(&self) -> Result<Metrics>;
}

/// Parameters for [`CloudProvider::create_instance`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest {
    pub name: String,
    pub image_id: String,
    pub flavour_id: String,
    #[serde(default)]
    pub security_groups: Vec<String>,
    /// Cloud-init metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Command run by the instance on first boot
    #[serde(default)]
    pub boot_command: String,
}

impl CreateInstanceRequest {
    pub fn new(
        name: impl Into<String>,
        image_id: impl Into<String>,
        flavour_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            image_id: image_id.into(),
            flavour_id: flavour_id.into(),
            ..Default::default()
        }
    }

    pub fn with_security_group(mut self, name: impl Into<String>) -> Self {
        self.security_groups.push(name.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_boot_command(mut self, command: impl Into<String>) -> Self {
        self.boot_command = command.into();
        self
    }
}

/// Deduplicate and sort a list of security group names
pub fn normalize_group_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_instance_request_builder() {
        let request = CreateInstanceRequest::new("vm1", "img-1", "flavor-1")
            .with_security_group("web")
            .with_metadata("env", "prod")
            .with_boot_command("#!/bin/sh\necho hi");

        assert_eq!(request.name, "vm1");
        assert_eq!(request.security_groups, vec!["web"]);
        assert_eq!(request.metadata.get("env").map(String::as_str), Some("prod"));
        assert!(request.boot_command.starts_with("#!/bin/sh"));
    }

    #[test]
    fn test_create_instance_request_defaults_optional_fields() {
        let request: CreateInstanceRequest = serde_json::from_str(
            r#"{"name": "vm1", "imageId": "img-1", "flavourId": "flavor-1"}"#,
        )
        .unwrap();

        assert!(request.security_groups.is_empty());
        assert!(request.metadata.is_empty());
        assert!(request.boot_command.is_empty());
    }

    #[test]
    fn test_normalize_group_names() {
        let names = normalize_group_names(["web", "default", "web", "ssh"]);
        assert_eq!(names, vec!["default", "ssh", "web"]);
    }
}
