//! OpenStack provider for Skybridge
//!
//! This crate implements the CloudProvider trait for OpenStack,
//! talking to Nova (compute), Glance (images) and Neutron (networking)
//! over their REST APIs.
//!
//! # Features
//!
//! - Server management (create, delete, start, stop, reboot)
//! - Security group attachment
//! - Image and flavour catalogs
//! - Absolute limits (quota usage)
//!
//! # Authentication
//!
//! Keystone v3 application credentials. The token is cached and refreshed
//! once it is within 30 minutes of expiry; concurrent requests share a
//! single refresh.
//!
//! # Example
//!
//! ```ignore
//! use skybridge_cloud::CloudProvider;
//! use skybridge_cloud_openstack::{OpenStackConfig, OpenStackProvider};
//!
//! let provider = OpenStackProvider::new(config)?;
//!
//! for instance in provider.instances().await? {
//!     println!("{} {}", instance.name, instance.state);
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod state;

pub use auth::KeystoneAuthenticator;
pub use client::OpenStackClient;
pub use config::OpenStackConfig;
pub use error::OpenStackError;
pub use provider::OpenStackProvider;
pub use state::normalize_state;
