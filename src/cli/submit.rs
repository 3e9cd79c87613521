use crate::config::Config;
use crate::error::Result;
use crate::graph::GraphClient;
use crate::graph::types::DriveItemRef;
use crate::models::{FormDefinition, Submission};
use crate::provision::ProvisioningEngine;
use chrono::Utc;
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Drive id holding the provisioned workbook
    #[arg(long)]
    pub drive: String,

    /// Item id of the provisioned workbook
    #[arg(long)]
    pub item: String,

    /// Table id created at provisioning time
    #[arg(long)]
    pub table: String,

    /// Submission reference code
    #[arg(long)]
    pub reference: String,

    /// One answer per configured form question, in order; repeatable
    #[arg(long = "answer")]
    pub answers: Vec<String>,
}

pub async fn execute(args: &SubmitArgs) -> Result<()> {
    let config = Config::load()?;
    let client = GraphClient::new(&config.graph).await?;

    let form = FormDefinition::new(config.form.questions.clone());
    let engine = ProvisioningEngine::new(config.workbook.clone(), form, client);

    let item = DriveItemRef {
        drive_id: args.drive.clone(),
        item_id: args.item.clone(),
    };
    let submission = Submission {
        reference: args.reference.clone(),
        submitted_at: Utc::now(),
        answers: args.answers.clone(),
    };

    engine
        .append_submission(&item, &args.table, &submission)
        .await?;

    info!(reference = %submission.reference, "Submission appended");

    Ok(())
}
