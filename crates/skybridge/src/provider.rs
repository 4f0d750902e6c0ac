use anyhow::Context;
use skybridge_cloud::CloudProvider;
use skybridge_cloud_gce::GceProvider;
use skybridge_cloud_openstack::OpenStackProvider;
use skybridge_config::ProviderSettings;
use std::sync::Arc;

/// Construct the configured backend
pub fn build(settings: &ProviderSettings) -> anyhow::Result<Arc<dyn CloudProvider>> {
    let provider: Arc<dyn CloudProvider> = match settings {
        ProviderSettings::OpenStack(config) => Arc::new(
            OpenStackProvider::new(config.clone())
                .context("Failed to initialise the OpenStack provider")?,
        ),
        ProviderSettings::Gce(config) => Arc::new(
            GceProvider::new(config.clone()).context("Failed to initialise the GCE provider")?,
        ),
    };
    Ok(provider)
}
