//! GCE provider implementation

use crate::client::GceClient;
use crate::config::GceConfig;
use crate::error::Result;
use crate::key::ServiceAccountKey;
use crate::models::{
    AccessConfig, AttachedDisk, Firewall, GceImage, GceInstance, InitializeParams, InsertInstance,
    MachineType, Metadata, MetadataItem, Network, NetworkInterfaceDefinition, Operation, Region,
    Tags,
};
use crate::operation::OperationPoller;
use crate::state::normalize_state;
use async_trait::async_trait;
use skybridge_cloud::{
    CloudError, CloudProvider, CreateInstanceRequest, Flavour, Image, Instance, Metrics,
    normalize_group_names,
};
use std::collections::BTreeMap;

/// Metadata key GCE runs on first boot
const STARTUP_SCRIPT_KEY: &str = "startup-script";

/// Label recording the image an instance was created from
const IMAGE_LABEL: &str = "skybridge-image";

const BYTES_PER_GIB: u64 = 1 << 30;

/// Google Compute Engine provider
pub struct GceProvider {
    client: GceClient,
    poller: OperationPoller,
    network: String,
}

impl GceProvider {
    /// Build a provider, reading the service account key named by `config`
    pub fn new(config: GceConfig) -> Result<Self> {
        config.validate()?;
        let key = ServiceAccountKey::from_file(&config.key_file)?;
        Self::with_key(config, key)
    }

    pub fn with_key(config: GceConfig, key: ServiceAccountKey) -> Result<Self> {
        let client = GceClient::new(&config, key)?;
        tracing::info!(
            "GCE provider ready for project {} in zone {}",
            client.project(),
            client.zone()
        );
        Ok(Self {
            client,
            poller: OperationPoller::default(),
            network: config.network,
        })
    }

    /// Replace the operation poller (intervals and retry bound)
    pub fn with_poller(mut self, poller: OperationPoller) -> Self {
        self.poller = poller;
        self
    }

    pub fn client(&self) -> &GceClient {
        &self.client
    }

    async fn wait(&self, operation: &Operation) -> skybridge_cloud::Result<()> {
        self.poller.wait(&self.client, operation).await
    }

    async fn gce_instance(&self, id: &str) -> Result<GceInstance> {
        self.client.instances().get(id).await
    }

    async fn tag_catalog(&self) -> Result<Vec<String>> {
        let firewalls: Vec<Firewall> = self.client.firewalls().list().await?;
        Ok(normalize_group_names(
            firewalls.into_iter().flat_map(|firewall| firewall.target_tags),
        ))
    }

    /// Reject tags no firewall rule targets
    async fn ensure_known_tag(&self, name: &str) -> skybridge_cloud::Result<()> {
        if self.tag_catalog().await?.iter().any(|tag| tag == name) {
            return Ok(());
        }
        tracing::warn!("Network tag {} is not targeted by any firewall", name);
        Err(CloudError::Validation(format!(
            "security group '{name}' does not exist"
        )))
    }

    async fn set_tags(&self, id: &str, tags: Tags) -> skybridge_cloud::Result<()> {
        tracing::info!("Setting tags {:?} on instance {}", tags.items, id);
        let operation = self
            .client
            .instances()
            .call(id, "setTags", Some(&tags))
            .await?;
        self.wait(&operation).await
    }

    async fn power(&self, id: &str, method: &str) -> skybridge_cloud::Result<()> {
        tracing::info!("Submitting {} for instance {}", method, id);
        let operation = self
            .client
            .instances()
            .call::<()>(id, method, None)
            .await?;
        self.wait(&operation).await
    }

    fn to_instance(instance: GceInstance) -> Instance {
        let interface = instance.network_interfaces.first();
        let address = interface
            .and_then(|nic| nic.access_configs.iter().find_map(|ac| ac.nat_ip.clone()))
            .or_else(|| interface.and_then(|nic| nic.network_ip.clone()));

        Instance {
            state: normalize_state(&instance.status),
            address,
            flavour_id: last_segment(&instance.machine_type),
            image_id: instance.labels.get(IMAGE_LABEL).cloned().unwrap_or_default(),
            security_groups: normalize_group_names(instance.tags.items),
            fault: None,
            id: instance.name.clone(),
            name: instance.name,
            created_at: instance.creation_timestamp,
        }
    }
}

fn last_segment(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

/// Last path segment of a network reference (`default`,
/// `global/networks/default` or a full self link)
fn network_name(reference: &str) -> &str {
    reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(reference)
}

fn to_image(image: GceImage) -> Image {
    let size_gb = image
        .disk_size_gb
        .as_deref()
        .and_then(|gb| gb.parse::<u64>().ok())
        .unwrap_or(0);
    Image {
        id: image.name.clone(),
        name: image.name,
        size: size_gb.saturating_mul(BYTES_PER_GIB),
        created_at: image.creation_timestamp,
    }
}

fn to_flavour(machine_type: MachineType) -> Flavour {
    Flavour {
        id: machine_type.name.clone(),
        name: machine_type.name,
        cpus: machine_type.guest_cpus,
        ram: machine_type.memory_mb,
        disk: machine_type.image_space_gb.unwrap_or(0),
    }
}

#[async_trait]
impl CloudProvider for GceProvider {
    fn name(&self) -> &str {
        "gce"
    }

    fn display_name(&self) -> &str {
        "Google Compute Engine"
    }

    async fn instance(&self, id: &str) -> skybridge_cloud::Result<Instance> {
        Ok(Self::to_instance(self.gce_instance(id).await?))
    }

    async fn instances(&self) -> skybridge_cloud::Result<Vec<Instance>> {
        let instances: Vec<GceInstance> = self.client.instances().list().await?;
        Ok(instances.into_iter().map(Self::to_instance).collect())
    }

    async fn instance_identifiers(&self) -> skybridge_cloud::Result<Vec<String>> {
        let instances: Vec<GceInstance> = self.client.instances().list().await?;
        Ok(instances.into_iter().map(|instance| instance.name).collect())
    }

    async fn security_groups_for_instance(&self, id: &str) -> skybridge_cloud::Result<Vec<String>> {
        let instance = self.gce_instance(id).await?;
        Ok(normalize_group_names(instance.tags.items))
    }

    async fn add_security_group_for_instance(
        &self,
        id: &str,
        name: &str,
    ) -> skybridge_cloud::Result<()> {
        self.ensure_known_tag(name).await?;
        let instance = self.gce_instance(id).await?;
        if instance.tags.items.iter().any(|tag| tag == name) {
            tracing::debug!("Instance {} already has tag {}", id, name);
            return Ok(());
        }
        let mut items = instance.tags.items;
        items.push(name.to_string());
        let tags = Tags {
            items: normalize_group_names(items),
            fingerprint: instance.tags.fingerprint,
        };
        self.set_tags(id, tags).await
    }

    async fn remove_security_group_from_instance(
        &self,
        id: &str,
        name: &str,
    ) -> skybridge_cloud::Result<()> {
        self.ensure_known_tag(name).await?;
        let instance = self.gce_instance(id).await?;
        if !instance.tags.items.iter().any(|tag| tag == name) {
            tracing::debug!("Instance {} does not have tag {}", id, name);
            return Ok(());
        }
        let tags = Tags {
            items: normalize_group_names(instance.tags.items.into_iter().filter(|tag| tag != name)),
            fingerprint: instance.tags.fingerprint,
        };
        self.set_tags(id, tags).await
    }

    async fn create_instance(
        &self,
        request: &CreateInstanceRequest,
    ) -> skybridge_cloud::Result<String> {
        let image: GceImage = self.client.images().get(&request.image_id).await?;
        let machine_type: MachineType = self
            .client
            .machine_types()
            .get(&request.flavour_id)
            .await?;
        let network: Network = self
            .client
            .networks()
            .get(network_name(&self.network))
            .await?;

        let mut metadata: Vec<MetadataItem> = request
            .metadata
            .iter()
            .filter(|(key, _)| key.as_str() != STARTUP_SCRIPT_KEY)
            .map(|(key, value)| MetadataItem {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        if !request.boot_command.is_empty() {
            metadata.push(MetadataItem {
                key: STARTUP_SCRIPT_KEY.to_string(),
                value: request.boot_command.clone(),
            });
        }

        let source_image = image
            .self_link
            .clone()
            .unwrap_or_else(|| format!("global/images/{}", image.name));

        let body = InsertInstance {
            name: request.name.clone(),
            machine_type: format!(
                "zones/{}/machineTypes/{}",
                self.client.zone(),
                machine_type.name
            ),
            disks: vec![AttachedDisk {
                boot: true,
                auto_delete: true,
                initialize_params: InitializeParams { source_image },
            }],
            network_interfaces: vec![NetworkInterfaceDefinition {
                network: network
                    .self_link
                    .unwrap_or_else(|| format!("global/networks/{}", network.name)),
                access_configs: vec![AccessConfig::external_nat()],
            }],
            tags: Tags {
                items: normalize_group_names(request.security_groups.iter().cloned()),
                fingerprint: None,
            },
            metadata: Metadata { items: metadata },
            labels: BTreeMap::from([(IMAGE_LABEL.to_string(), image.name)]),
        };

        tracing::info!("Creating instance {}", request.name);
        let operation = self.client.instances().insert(&body).await?;
        self.wait(&operation).await?;
        Ok(request.name.clone())
    }

    async fn delete_instance(&self, id: &str) -> skybridge_cloud::Result<()> {
        tracing::info!("Deleting instance {}", id);
        let operation = self.client.instances().delete(id).await?;
        tracing::debug!("Delete of {} submitted as {}", id, operation.name);
        Ok(())
    }

    async fn start_instance(&self, id: &str) -> skybridge_cloud::Result<()> {
        self.power(id, "start").await
    }

    async fn shutdown_instance(&self, id: &str) -> skybridge_cloud::Result<()> {
        self.power(id, "stop").await
    }

    async fn reboot_instance(&self, id: &str) -> skybridge_cloud::Result<()> {
        self.shutdown_instance(id).await?;
        self.start_instance(id).await
    }

    async fn images(&self) -> skybridge_cloud::Result<Vec<Image>> {
        let images: Vec<GceImage> = self.client.images().list().await?;
        Ok(images.into_iter().map(to_image).collect())
    }

    async fn image(&self, id: &str) -> skybridge_cloud::Result<Image> {
        let image: GceImage = self.client.images().get(id).await?;
        Ok(to_image(image))
    }

    async fn flavours(&self) -> skybridge_cloud::Result<Vec<Flavour>> {
        let machine_types: Vec<MachineType> = self.client.machine_types().list().await?;
        Ok(machine_types.into_iter().map(to_flavour).collect())
    }

    async fn flavour(&self, id: &str) -> skybridge_cloud::Result<Flavour> {
        let machine_type: MachineType = self.client.machine_types().get(id).await?;
        Ok(to_flavour(machine_type))
    }

    async fn security_groups(&self) -> skybridge_cloud::Result<Vec<String>> {
        Ok(self.tag_catalog().await?)
    }

    async fn metrics(&self) -> skybridge_cloud::Result<Metrics> {
        let region: Region = self.client.regions().get(self.client.region()).await?;
        let mut metrics = Metrics::default();
        for quota in region.quotas {
            match quota.metric.as_str() {
                "CPUS" => {
                    metrics.max_total_cores = quota.limit as i64;
                    metrics.total_cores_used = quota.usage as i64;
                }
                "INSTANCES" => {
                    metrics.max_total_instances = quota.limit as i64;
                    metrics.total_instances_used = quota.usage as i64;
                }
                _ => {}
            }
        }
        tracing::debug!("GCE has no RAM quota; reporting 0 for RAM counters");
        Ok(metrics)
    }
}
