//! Skybridge Cloud
//!
//! This crate provides the provider-agnostic contract that every Skybridge
//! backend implements, so callers can manage virtual machines, images,
//! flavours and security groups without knowing which cloud serves them.
//!
//! # Supported Providers
//!
//! - **OpenStack**: Nova, Glance, Neutron (via `skybridge-cloud-openstack`)
//! - **Google Compute Engine**: instances, images, firewalls (via `skybridge-cloud-gce`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │           Caller (HTTP layer, skybridge CLI)     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               skybridge-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Provider Abstraction             │   │
//! │  │  trait CloudProvider { ... }              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │ Canonical    │  │ Credential lifecycle │     │
//! │  │ model        │  │ (single-flight)      │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │   openstack   │ │      gce      │
//! │   provider    │ │   provider    │
//! └───────────────┘ └───────────────┘
//! ```

pub mod credential;
pub mod error;
pub mod model;
pub mod provider;

// Re-exports
pub use credential::{Authenticate, Credential, CredentialManager, DEFAULT_SAFETY_MARGIN};
pub use error::{CloudError, Result};
pub use model::{Flavour, Image, Instance, InstanceFault, InstanceState, Metrics};
pub use provider::{CloudProvider, CreateInstanceRequest, normalize_group_names};
