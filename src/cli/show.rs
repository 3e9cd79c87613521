use crate::config::Config;
use crate::error::Result;
use crate::graph::{GraphClient, GraphOperations};
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ShowResource {
    /// List drives visible to the signed-in user
    Drives,
    /// Show configuration and cache paths
    Paths,
}

impl ShowResource {
    pub async fn execute(&self) -> Result<()> {
        match self {
            ShowResource::Drives => show_drives().await,
            ShowResource::Paths => show_paths(),
        }
    }
}

async fn show_drives() -> Result<()> {
    let config = Config::load()?;
    let client = GraphClient::new(&config.graph).await?;

    let drives = client.list_drives().await?;
    if drives.is_empty() {
        info!("No drives visible to this account");
    }
    for drive in drives {
        info!(
            id = %drive.id,
            name = %drive.name,
            drive_type = drive.drive_type.as_deref().unwrap_or("unknown"),
            "Drive"
        );
    }

    Ok(())
}

fn show_paths() -> Result<()> {
    let config_path = Config::config_file()?;
    let cache_dir = Config::cache_dir()?;

    info!(path = ?config_path, "Config path");
    info!(path = ?cache_dir, "Cache path");

    Ok(())
}
