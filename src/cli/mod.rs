mod auth;
mod provision;
mod show;
mod submit;

use crate::error::Result;
use clap::{Parser, Subcommand};

pub use auth::AuthProvider;
pub use provision::ProvisionArgs;
pub use show::ShowResource;
pub use submit::SubmitArgs;

#[derive(Parser, Debug)]
#[command(name = "form-workbook-provisioner")]
#[command(about = "Provision an Excel workbook in OneDrive for collecting form submissions", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Auth { provider, reset } => provider.execute(*reset).await,
            Commands::Provision(args) => provision::execute(args).await,
            Commands::Submit(args) => submit::execute(args).await,
            Commands::Show { resource } => resource.execute().await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and verify credentials
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,

        /// Discard cached tokens and authenticate from scratch
        #[arg(long)]
        reset: bool,
    },
    /// Create and initialize the submissions workbook
    Provision(ProvisionArgs),
    /// Append a submission row to a provisioned workbook
    Submit(SubmitArgs),
    /// Inspect remote and local state
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}
