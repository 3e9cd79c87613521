use crate::config::Config;
use crate::error::Result;
use crate::graph::{GraphClient, clear_graph_tokens};
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum AuthProvider {
    /// Authenticate with Microsoft Graph
    Microsoft,
}

impl AuthProvider {
    pub async fn execute(&self, reset: bool) -> Result<()> {
        match self {
            AuthProvider::Microsoft => authenticate_microsoft(reset).await,
        }
    }
}

async fn authenticate_microsoft(reset: bool) -> Result<()> {
    if reset {
        clear_graph_tokens()?;
    }

    let config = Config::load()?;
    let client = GraphClient::new(&config.graph).await?;

    let user = client.me().await?;
    info!(
        name = user.display_name.as_deref().unwrap_or("unknown"),
        account = user.user_principal_name.as_deref().unwrap_or("unknown"),
        "Microsoft Graph authentication verified"
    );

    Ok(())
}
