mod catalog;
mod instance;

use crate::Commands;
use serde::Serialize;
use skybridge_cloud::{CloudError, CloudProvider};

pub async fn run(provider: &dyn CloudProvider, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Instances => print(&provider.instances().await.map_err(failed)?),
        Commands::Instance { id } => print(&provider.instance(&id).await.map_err(failed)?),
        Commands::InstanceIds => print(&provider.instance_identifiers().await.map_err(failed)?),
        Commands::SecurityGroups { instance } => {
            catalog::security_groups(provider, instance.as_deref()).await
        }
        Commands::AddSecurityGroup { id, name } => {
            instance::add_security_group(provider, &id, &name).await
        }
        Commands::RemoveSecurityGroup { id, name } => {
            instance::remove_security_group(provider, &id, &name).await
        }
        Commands::Create {
            name,
            image,
            flavour,
            security_groups,
            metadata,
            boot_command,
        } => {
            let mut request = skybridge_cloud::CreateInstanceRequest::new(name, image, flavour)
                .with_boot_command(boot_command);
            for group in security_groups {
                request = request.with_security_group(group);
            }
            for (key, value) in metadata {
                request = request.with_metadata(key, value);
            }
            instance::create(provider, &request).await
        }
        Commands::Start { id } => instance::start(provider, &id).await,
        Commands::Stop { id } => instance::stop(provider, &id).await,
        Commands::Reboot { id } => instance::reboot(provider, &id).await,
        Commands::Delete { id } => instance::delete(provider, &id).await,
        Commands::Images => print(&provider.images().await.map_err(failed)?),
        Commands::Image { id } => print(&provider.image(&id).await.map_err(failed)?),
        Commands::Flavours => print(&provider.flavours().await.map_err(failed)?),
        Commands::Flavour { id } => print(&provider.flavour(&id).await.map_err(failed)?),
        Commands::Metrics => print(&provider.metrics().await.map_err(failed)?),
    }
}

/// Pretty JSON on stdout
fn print<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Attach the boundary status to a provider error
fn failed(err: CloudError) -> anyhow::Error {
    let status = err.http_status();
    anyhow::Error::new(err).context(format!("Request failed (status {status})"))
}
