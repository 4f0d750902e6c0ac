//! OpenStack API request and response models.
//!
//! Only the fields Skybridge reads are modelled; everything else in the
//! Nova, Glance and Neutron payloads is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Keystone
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub auth: AuthBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct AuthBody<'a> {
    pub identity: Identity<'a>,
}

#[derive(Debug, Serialize)]
pub struct Identity<'a> {
    pub methods: [&'static str; 1],
    pub application_credential: ApplicationCredential<'a>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationCredential<'a> {
    pub id: &'a str,
    pub secret: &'a str,
}

impl<'a> AuthRequest<'a> {
    pub fn application_credential(id: &'a str, secret: &'a str) -> Self {
        Self {
            auth: AuthBody {
                identity: Identity {
                    methods: ["application_credential"],
                    application_credential: ApplicationCredential { id, secret },
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: TokenBody,
}

#[derive(Debug, Deserialize)]
pub struct TokenBody {
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Nova (compute)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "OS-EXT-STS:task_state", default)]
    pub task_state: Option<String>,
    pub flavor: FlavorRef,
    /// Volume-backed servers report `""` instead of an image reference
    #[serde(default)]
    pub image: ServerImage,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub addresses: HashMap<String, Vec<ServerAddress>>,
    #[serde(default)]
    pub security_groups: Vec<NamedRef>,
    #[serde(default)]
    pub fault: Option<ServerFault>,
}

/// Flavor reference; newer microversions embed `original_name` instead of `id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlavorRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
}

impl FlavorRef {
    pub fn identifier(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.original_name.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServerImage {
    Ref { id: String },
    None(String),
}

impl Default for ServerImage {
    fn default() -> Self {
        ServerImage::None(String::new())
    }
}

impl ServerImage {
    pub fn identifier(&self) -> String {
        match self {
            ServerImage::Ref { id } => id.clone(),
            ServerImage::None(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerAddress {
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerFault {
    pub message: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerEnvelope {
    pub server: Server,
}

#[derive(Debug, Deserialize)]
pub struct ServerList {
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub servers_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub struct ServerIdList {
    #[serde(default)]
    pub servers: Vec<ServerId>,
    #[serde(default)]
    pub servers_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub struct ServerId {
    pub id: String,
}

/// Pagination link (`rel` = "next" points at the following page)
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// Href of the `next` link, if any
pub fn next_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel == "next")
        .map(|link| link.href.clone())
}

#[derive(Debug, Deserialize)]
pub struct SecurityGroupList {
    #[serde(default)]
    pub security_groups: Vec<NamedRef>,
}

#[derive(Debug, Serialize)]
pub struct CreateServerRequest {
    pub server: CreateServer,
}

#[derive(Debug, Serialize)]
pub struct CreateServer {
    pub name: String,
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    pub security_groups: Vec<NamedRef>,
    pub networks: Vec<NetworkRef>,
    pub metadata: BTreeMap<String, String>,
    /// Base64 encoded
    pub user_data: String,
}

#[derive(Debug, Serialize)]
pub struct NetworkRef {
    pub uuid: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatedServerEnvelope {
    pub server: CreatedServer,
}

#[derive(Debug, Deserialize)]
pub struct CreatedServer {
    pub id: String,
}

/// Body of `POST /v2/servers/{id}/action`
#[derive(Debug, Serialize)]
pub enum ServerAction {
    #[serde(rename = "addSecurityGroup")]
    AddSecurityGroup { name: String },
    #[serde(rename = "removeSecurityGroup")]
    RemoveSecurityGroup { name: String },
    #[serde(rename = "os-start")]
    Start(()),
    #[serde(rename = "os-stop")]
    Stop(()),
    #[serde(rename = "reboot")]
    Reboot {
        #[serde(rename = "type")]
        reboot_type: RebootType,
    },
}

impl ServerAction {
    pub fn describe(&self) -> &'static str {
        match self {
            ServerAction::AddSecurityGroup { .. } => "addSecurityGroup",
            ServerAction::RemoveSecurityGroup { .. } => "removeSecurityGroup",
            ServerAction::Start(()) => "os-start",
            ServerAction::Stop(()) => "os-stop",
            ServerAction::Reboot { .. } => "reboot",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RebootType {
    Soft,
    Hard,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vcpus: u32,
    /// Megabytes
    #[serde(default)]
    pub ram: u64,
    /// Gigabytes
    #[serde(default)]
    pub disk: u64,
}

#[derive(Debug, Deserialize)]
pub struct FlavorList {
    #[serde(default)]
    pub flavors: Vec<Flavor>,
    #[serde(default)]
    pub flavors_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub struct FlavorEnvelope {
    pub flavor: Flavor,
}

#[derive(Debug, Deserialize)]
pub struct LimitsEnvelope {
    pub limits: Limits,
}

#[derive(Debug, Deserialize)]
pub struct Limits {
    #[serde(default)]
    pub absolute: AbsoluteLimits,
}

/// Absolute limits; counters Nova omits default to 0
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AbsoluteLimits {
    #[serde(rename = "maxTotalRAMSize")]
    pub max_total_ram_size: i64,
    #[serde(rename = "totalRAMUsed")]
    pub total_ram_used: i64,
    #[serde(rename = "totalInstancesUsed")]
    pub total_instances_used: i64,
    #[serde(rename = "maxTotalInstances")]
    pub max_total_instances: i64,
    #[serde(rename = "maxTotalCores")]
    pub max_total_cores: i64,
    #[serde(rename = "totalCoresUsed")]
    pub total_cores_used: i64,
}

// ============================================================================
// Glance (images)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GlanceImage {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Bytes; `null` while the image is still queued
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct GlanceImageList {
    #[serde(default)]
    pub images: Vec<GlanceImage>,
    /// Path of the next page, relative to the image endpoint
    #[serde(default)]
    pub next: Option<String>,
}
