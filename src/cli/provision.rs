use crate::config::Config;
use crate::error::{AppError, Result};
use crate::graph::{GraphClient, GraphOperations};
use crate::models::FormDefinition;
use crate::provision::{DriveSelection, ProvisioningEngine};
use clap::Args;
use dialoguer::Select;
use tracing::info;

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Target drive id; prompts for a choice when omitted
    #[arg(long)]
    pub drive: Option<String>,

    /// Use the personal OneDrive app folder, skipping drive selection
    #[arg(long)]
    pub personal: bool,

    /// Workbook file name, overriding the configured one
    #[arg(long)]
    pub name: Option<String>,
}

pub async fn execute(args: &ProvisionArgs) -> Result<()> {
    let config = Config::load()?;
    let client = GraphClient::new(&config.graph).await?;

    let mut workbook = config.workbook.clone();
    if let Some(name) = &args.name {
        workbook.file_name = name.clone();
    }

    let form = FormDefinition::new(config.form.questions.clone());
    let engine = ProvisioningEngine::new(workbook, form, client);

    let selection = if args.personal {
        DriveSelection::PersonalAppFolder
    } else if let Some(drive) = &args.drive {
        DriveSelection::Drive(drive.clone())
    } else {
        DriveSelection::Drive(prompt_for_drive(&engine).await?)
    };

    let outcome = engine.provision(&selection).await?;

    info!(
        drive = %outcome.item.drive_id,
        item = %outcome.item.item_id,
        table = %outcome.table_id,
        "Workbook provisioned"
    );
    if let Some(url) = &outcome.file.web_url {
        info!(url = %url, "Workbook ready");
    }

    Ok(())
}

async fn prompt_for_drive<G>(engine: &ProvisioningEngine<G>) -> Result<String>
where
    G: GraphOperations + Sync,
{
    let choices = engine.drive_choices().await?;
    if choices.is_empty() {
        return Err(AppError::Input(
            "no drives visible to this account".to_string(),
        ));
    }

    let mut names: Vec<String> = choices.keys().cloned().collect();
    names.sort();

    let picked = Select::new()
        .with_prompt("Select a drive")
        .items(&names)
        .default(0)
        .interact()
        .map_err(|e| AppError::Input(format!("Drive selection aborted: {}", e)))?;

    Ok(choices[&names[picked]].clone())
}
