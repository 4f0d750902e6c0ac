//! OpenStack provider implementation

use crate::client::OpenStackClient;
use crate::config::OpenStackConfig;
use crate::error::Result;
use crate::models::{
    CreateServer, CreateServerRequest, CreatedServerEnvelope, FlavorEnvelope, FlavorList,
    GlanceImage, GlanceImageList, LimitsEnvelope, NamedRef, NetworkRef, RebootType,
    SecurityGroupList, Server, ServerAction, ServerEnvelope, ServerIdList, ServerList, next_link,
};
use crate::state::normalize_state;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use skybridge_cloud::{
    CloudError, CloudProvider, CreateInstanceRequest, Flavour, Image, Instance, InstanceFault,
    Metrics, normalize_group_names,
};

/// OpenStack provider
pub struct OpenStackProvider {
    client: OpenStackClient,
    address_provider: String,
    networks: Vec<String>,
}

impl OpenStackProvider {
    pub fn new(config: OpenStackConfig) -> Result<Self> {
        config.validate()?;
        let client = OpenStackClient::new(&config)?;
        Ok(Self {
            client,
            networks: config.network_uuids(),
            address_provider: config.address_provider,
        })
    }

    pub fn client(&self) -> &OpenStackClient {
        &self.client
    }

    async fn server(&self, id: &str) -> Result<Server> {
        let url = self.client.compute_url(&format!("/v2/servers/{id}"));
        let envelope: ServerEnvelope = self.client.get(&url).await?;
        Ok(envelope.server)
    }

    async fn servers(&self) -> Result<Vec<Server>> {
        let mut servers = Vec::new();
        let mut url = Some(self.client.compute_url("/v2/servers/detail"));
        while let Some(page) = url {
            let list: ServerList = self.client.get(&page).await?;
            servers.extend(list.servers);
            url = next_link(&list.servers_links);
        }
        Ok(servers)
    }

    async fn server_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut url = Some(self.client.compute_url("/v2/servers"));
        while let Some(page) = url {
            let list: ServerIdList = self.client.get(&page).await?;
            ids.extend(list.servers.into_iter().map(|server| server.id));
            url = next_link(&list.servers_links);
        }
        Ok(ids)
    }

    async fn server_groups(&self, id: &str) -> Result<Vec<String>> {
        let url = self
            .client
            .compute_url(&format!("/v2/servers/{id}/os-security-groups"));
        let list: SecurityGroupList = self.client.get(&url).await?;
        Ok(normalize_group_names(
            list.security_groups.into_iter().map(|group| group.name),
        ))
    }

    async fn group_catalog(&self) -> Result<Vec<String>> {
        let url = self.client.network_url("/v2.0/security-groups");
        let list: SecurityGroupList = self.client.get(&url).await?;
        Ok(normalize_group_names(
            list.security_groups.into_iter().map(|group| group.name),
        ))
    }

    async fn action(&self, id: &str, action: ServerAction) -> Result<()> {
        tracing::info!("Submitting {} for server {}", action.describe(), id);
        let url = self.client.compute_url(&format!("/v2/servers/{id}/action"));
        self.client.post_discard(&url, &action).await
    }

    /// Reject names missing from the Neutron catalog
    async fn ensure_known_group(&self, name: &str) -> skybridge_cloud::Result<()> {
        let catalog = self.group_catalog().await?;
        if catalog.iter().any(|group| group == name) {
            return Ok(());
        }
        tracing::warn!("Security group {} does not exist", name);
        Err(CloudError::Validation(format!(
            "security group '{name}' does not exist"
        )))
    }

    async fn glance_images(&self) -> Result<Vec<GlanceImage>> {
        let mut images = Vec::new();
        let mut url = Some(self.client.image_url("/v2/images"));
        while let Some(page) = url {
            let list: GlanceImageList = self.client.get(&page).await?;
            images.extend(list.images);
            url = list.next.map(|next| self.client.image_url(&next));
        }
        Ok(images)
    }

    fn to_instance(&self, server: Server) -> Instance {
        let state = normalize_state(&server.status, server.task_state.as_deref());
        let address = server
            .addresses
            .get(&self.address_provider)
            .and_then(|addresses| addresses.first())
            .map(|address| address.addr.clone());

        Instance {
            state,
            address,
            flavour_id: server.flavor.identifier(),
            image_id: server.image.identifier(),
            security_groups: normalize_group_names(
                server.security_groups.into_iter().map(|group| group.name),
            ),
            fault: server.fault.map(|fault| InstanceFault {
                message: fault.message,
                code: fault.code,
                details: fault.details,
                created_at: fault.created,
            }),
            id: server.id,
            name: server.name,
            created_at: server.created,
        }
    }
}

fn to_image(image: GlanceImage) -> Image {
    Image {
        id: image.id,
        name: image.name.unwrap_or_default(),
        size: image.size.unwrap_or(0),
        created_at: image.created_at,
    }
}

fn to_flavour(flavor: crate::models::Flavor) -> Flavour {
    Flavour {
        id: flavor.id,
        name: flavor.name,
        cpus: flavor.vcpus,
        ram: flavor.ram,
        disk: flavor.disk,
    }
}

#[async_trait]
impl CloudProvider for OpenStackProvider {
    fn name(&self) -> &str {
        "openstack"
    }

    fn display_name(&self) -> &str {
        "OpenStack"
    }

    async fn instance(&self, id: &str) -> skybridge_cloud::Result<Instance> {
        let server = self.server(id).await?;
        Ok(self.to_instance(server))
    }

    async fn instances(&self) -> skybridge_cloud::Result<Vec<Instance>> {
        let servers = self.servers().await?;
        Ok(servers
            .into_iter()
            .map(|server| self.to_instance(server))
            .collect())
    }

    async fn instance_identifiers(&self) -> skybridge_cloud::Result<Vec<String>> {
        Ok(self.server_ids().await?)
    }

    async fn security_groups_for_instance(&self, id: &str) -> skybridge_cloud::Result<Vec<String>> {
        Ok(self.server_groups(id).await?)
    }

    async fn add_security_group_for_instance(
        &self,
        id: &str,
        name: &str,
    ) -> skybridge_cloud::Result<()> {
        self.ensure_known_group(name).await?;
        if self.server_groups(id).await?.iter().any(|group| group == name) {
            tracing::debug!("Server {} already has security group {}", id, name);
            return Ok(());
        }
        let action = ServerAction::AddSecurityGroup {
            name: name.to_string(),
        };
        Ok(self.action(id, action).await?)
    }

    async fn remove_security_group_from_instance(
        &self,
        id: &str,
        name: &str,
    ) -> skybridge_cloud::Result<()> {
        self.ensure_known_group(name).await?;
        if !self.server_groups(id).await?.iter().any(|group| group == name) {
            tracing::debug!("Server {} does not have security group {}", id, name);
            return Ok(());
        }
        let action = ServerAction::RemoveSecurityGroup {
            name: name.to_string(),
        };
        Ok(self.action(id, action).await?)
    }

    async fn create_instance(
        &self,
        request: &CreateInstanceRequest,
    ) -> skybridge_cloud::Result<String> {
        let image = self.image(&request.image_id).await?;
        let flavour = self.flavour(&request.flavour_id).await?;

        let body = CreateServerRequest {
            server: CreateServer {
                name: request.name.clone(),
                image_ref: image.id,
                flavor_ref: flavour.id,
                security_groups: normalize_group_names(request.security_groups.iter().cloned())
                    .into_iter()
                    .map(|name| NamedRef { name })
                    .collect(),
                networks: self
                    .networks
                    .iter()
                    .map(|uuid| NetworkRef { uuid: uuid.clone() })
                    .collect(),
                metadata: request.metadata.clone(),
                user_data: BASE64.encode(request.boot_command.as_bytes()),
            },
        };

        let url = self.client.compute_url("/v2/servers");
        let created: CreatedServerEnvelope = self.client.post(&url, &body).await?;
        tracing::info!("Created server {} ({})", request.name, created.server.id);
        Ok(created.server.id)
    }

    async fn delete_instance(&self, id: &str) -> skybridge_cloud::Result<()> {
        tracing::info!("Deleting server {}", id);
        let url = self.client.compute_url(&format!("/v2/servers/{id}"));
        Ok(self.client.delete(&url).await?)
    }

    async fn start_instance(&self, id: &str) -> skybridge_cloud::Result<()> {
        Ok(self.action(id, ServerAction::Start(())).await?)
    }

    async fn shutdown_instance(&self, id: &str) -> skybridge_cloud::Result<()> {
        Ok(self.action(id, ServerAction::Stop(())).await?)
    }

    async fn reboot_instance(&self, id: &str) -> skybridge_cloud::Result<()> {
        let action = ServerAction::Reboot {
            reboot_type: RebootType::Hard,
        };
        Ok(self.action(id, action).await?)
    }

    async fn images(&self) -> skybridge_cloud::Result<Vec<Image>> {
        let images = self.glance_images().await?;
        Ok(images.into_iter().map(to_image).collect())
    }

    async fn image(&self, id: &str) -> skybridge_cloud::Result<Image> {
        let url = self.client.image_url(&format!("/v2/images/{id}"));
        let image: GlanceImage = self.client.get(&url).await?;
        Ok(to_image(image))
    }

    async fn flavours(&self) -> skybridge_cloud::Result<Vec<Flavour>> {
        let mut flavours = Vec::new();
        let mut url = Some(self.client.compute_url("/v2/flavors/detail"));
        while let Some(page) = url {
            let list: FlavorList = self.client.get(&page).await?;
            flavours.extend(list.flavors.into_iter().map(to_flavour));
            url = next_link(&list.flavors_links);
        }
        Ok(flavours)
    }

    async fn flavour(&self, id: &str) -> skybridge_cloud::Result<Flavour> {
        let url = self.client.compute_url(&format!("/v2/flavors/{id}"));
        let envelope: FlavorEnvelope = self.client.get(&url).await?;
        Ok(to_flavour(envelope.flavor))
    }

    async fn security_groups(&self) -> skybridge_cloud::Result<Vec<String>> {
        Ok(self.group_catalog().await?)
    }

    async fn metrics(&self) -> skybridge_cloud::Result<Metrics> {
        let url = self.client.compute_url("/v2/limits");
        let envelope: LimitsEnvelope = self.client.get(&url).await?;
        let absolute = envelope.limits.absolute;
        Ok(Metrics {
            max_total_ram_size: absolute.max_total_ram_size,
            total_ram_used: absolute.total_ram_used,
            total_instances_used: absolute.total_instances_used,
            max_total_instances: absolute.max_total_instances,
            max_total_cores: absolute.max_total_cores,
            total_cores_used: absolute.total_cores_used,
        })
    }
}
