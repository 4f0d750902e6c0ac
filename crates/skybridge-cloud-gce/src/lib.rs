//! Google Compute Engine provider for Skybridge
//!
//! This crate implements the CloudProvider trait for GCE using the
//! Compute Engine v1 REST API.
//!
//! # Mapping
//!
//! - Instance identifier: the instance name (unique within project and zone)
//! - Flavour: machine type
//! - Security groups: network tags; the catalog is the set of firewall
//!   target tags in the project
//!
//! # Asynchronous operations
//!
//! Insert, start, stop and setTags return a zone operation which is polled
//! until it is `DONE` (see [`OperationPoller`]). Delete is submitted without
//! waiting. GCE has no native reboot here, so reboot stops the instance and
//! then starts it.
//!
//! # Example
//!
//! ```ignore
//! use skybridge_cloud::CloudProvider;
//! use skybridge_cloud_gce::{GceConfig, GceProvider};
//!
//! let provider = GceProvider::new(config)?;
//! provider.reboot_instance("web-1").await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod models;
pub mod operation;
pub mod provider;
pub mod state;

pub use auth::GoogleAuthenticator;
pub use client::{Collection, GceClient};
pub use config::GceConfig;
pub use error::GceError;
pub use key::ServiceAccountKey;
pub use operation::{OperationPoller, OperationSource};
pub use provider::GceProvider;
pub use state::normalize_state;
