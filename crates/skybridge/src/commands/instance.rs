use super::{failed, print};
use colored::Colorize;
use skybridge_cloud::{CloudProvider, CreateInstanceRequest};

pub async fn create(provider: &dyn CloudProvider, request: &CreateInstanceRequest) -> anyhow::Result<()> {
    eprintln!("{} {}", "Creating instance".blue(), request.name.cyan());
    let id = provider.create_instance(request).await.map_err(failed)?;
    eprintln!("{} {}", "✓ Created".green(), id.cyan());
    print(&serde_json::json!({ "id": id }))
}

pub async fn delete(provider: &dyn CloudProvider, id: &str) -> anyhow::Result<()> {
    provider.delete_instance(id).await.map_err(failed)?;
    eprintln!("{} {}", "✓ Delete submitted for".green(), id.cyan());
    Ok(())
}

pub async fn start(provider: &dyn CloudProvider, id: &str) -> anyhow::Result<()> {
    provider.start_instance(id).await.map_err(failed)?;
    eprintln!("{} {}", "✓ Started".green(), id.cyan());
    Ok(())
}

pub async fn stop(provider: &dyn CloudProvider, id: &str) -> anyhow::Result<()> {
    provider.shutdown_instance(id).await.map_err(failed)?;
    eprintln!("{} {}", "✓ Stopped".green(), id.cyan());
    Ok(())
}

pub async fn reboot(provider: &dyn CloudProvider, id: &str) -> anyhow::Result<()> {
    provider.reboot_instance(id).await.map_err(failed)?;
    eprintln!("{} {}", "✓ Rebooted".green(), id.cyan());
    Ok(())
}

pub async fn add_security_group(
    provider: &dyn CloudProvider,
    id: &str,
    name: &str,
) -> anyhow::Result<()> {
    provider
        .add_security_group_for_instance(id, name)
        .await
        .map_err(failed)?;
    print(&provider.security_groups_for_instance(id).await.map_err(failed)?)
}

pub async fn remove_security_group(
    provider: &dyn CloudProvider,
    id: &str,
    name: &str,
) -> anyhow::Result<()> {
    provider
        .remove_security_group_from_instance(id, name)
        .await
        .map_err(failed)?;
    print(&provider.security_groups_for_instance(id).await.map_err(failed)?)
}
