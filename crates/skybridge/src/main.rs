mod commands;
mod provider;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skybridge", version)]
#[command(about = "Manage virtual machines on OpenStack and Google Compute Engine", long_about = None)]
struct Cli {
    /// Settings file (otherwise SKYBRIDGE_CONFIG, ./skybridge.yaml, ~/.config/skybridge/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// List instances
    Instances,
    /// Show one instance
    Instance { id: String },
    /// List instance identifiers
    InstanceIds,
    /// List security groups, for the project or for one instance
    SecurityGroups {
        #[arg(long)]
        instance: Option<String>,
    },
    /// Attach a security group to an instance
    AddSecurityGroup { id: String, name: String },
    /// Detach a security group from an instance
    RemoveSecurityGroup { id: String, name: String },
    /// Create an instance
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        image: String,
        #[arg(long)]
        flavour: String,
        /// Security group (repeatable)
        #[arg(long = "security-group")]
        security_groups: Vec<String>,
        /// Metadata entry as KEY=VALUE (repeatable)
        #[arg(long, value_parser = parse_key_val)]
        metadata: Vec<(String, String)>,
        /// Command run on first boot
        #[arg(long, default_value = "")]
        boot_command: String,
    },
    /// Start an instance
    Start { id: String },
    /// Stop an instance
    Stop { id: String },
    /// Reboot an instance
    Reboot { id: String },
    /// Delete an instance
    Delete { id: String },
    /// List images
    Images,
    /// Show one image
    Image { id: String },
    /// List flavours
    Flavours,
    /// Show one flavour
    Flavour { id: String },
    /// Show quota usage
    Metrics,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{s}'"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<skybridge_config::Settings> {
    let settings = match path {
        Some(path) => skybridge_config::Settings::from_file(path)?,
        None => skybridge_config::load()?,
    };
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    // Logs go to stderr; stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log.level)),
        )
        .init();

    let provider = provider::build(&settings.provider)?;
    tracing::debug!("Using {} provider", provider.display_name());

    commands::run(provider.as_ref(), cli.command).await
}
