use super::{failed, print};
use skybridge_cloud::CloudProvider;

/// Project catalog, or the groups attached to `instance`
pub async fn security_groups(
    provider: &dyn CloudProvider,
    instance: Option<&str>,
) -> anyhow::Result<()> {
    let groups = match instance {
        Some(id) => provider.security_groups_for_instance(id).await,
        None => provider.security_groups().await,
    }
    .map_err(failed)?;
    print(&groups)
}
