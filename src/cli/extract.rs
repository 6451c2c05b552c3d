//! Extract command handler
//!
//! Submits a batch extraction job for one location.

use crate::cli::{init_logging, load_config, LocationArgs};
use crate::error::Result;
use crate::service::HttpAnalysisService;
use clap::Args;

/// Extract command arguments
#[derive(Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub target: LocationArgs,
}

/// Run the extract command
pub async fn run(args: ExtractArgs, api_url: Option<String>) -> Result<()> {
    init_logging("warn");
    let config = load_config(api_url)?;

    let location = args.target.resolve(&config).await?;
    let service = HttpAnalysisService::from_config(&config)?;

    let job = service.trigger_extraction(&location).await?;
    println!("Extraction {} for {}", job.status, location.name);
    println!("  Task: {}", job.task_id);

    Ok(())
}
