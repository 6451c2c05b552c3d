//! Analyze command handler
//!
//! Runs a one-shot dashboard session: select a place, request analyses,
//! wait for them to settle, then print (and optionally export) the results.

use crate::cli::{init_logging, load_config, LocationArgs};
use crate::config::{parse_kinds, Config};
use crate::dashboard::{self, DashboardHandle, ExportOutcome, Snapshot};
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::model::AnalysisKind;
use crate::service::HttpAnalysisService;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Analyze command arguments
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub target: LocationArgs,

    /// Analyses to run, comma separated (e.g. "seasonal,growth")
    #[arg(long, short = 'k')]
    pub kinds: Option<String>,

    /// Also generate a stocking action for every returned signal
    #[arg(long)]
    pub stocking: bool,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Export signals as CSV into DIR (config default if omitted)
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,

    /// Seconds to wait for the analyses to settle
    #[arg(long)]
    pub timeout: Option<u64>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the analyze command
pub async fn run(args: AnalyzeArgs, api_url: Option<String>) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    init_logging("warn");
    let config = load_config(api_url)?;

    let kinds = match &args.kinds {
        Some(value) => parse_kinds(value)?,
        None => config.default_kinds()?,
    };
    let format = args.format.clone().unwrap_or(config.defaults.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
    let timeout = Duration::from_secs(args.timeout.unwrap_or(config.service.timeout_secs));

    let location = args.target.resolve(&config).await?;

    let service = HttpAnalysisService::from_config(&config)?;
    let session = dashboard::spawn(Arc::new(service));

    info!("Analyzing {} ({})", location.name, location.id);
    session.select_location(location).await?;
    for kind in &kinds {
        session.request_analysis(*kind).await?;
    }
    let mut snapshot = settle(&session, timeout).await?;

    if args.stocking {
        for kind in returned_kinds(&snapshot, &kinds) {
            session.generate_stocking_action(kind).await?;
        }
        snapshot = settle(&session, timeout).await?;
    }

    for kind in &kinds {
        if snapshot.signal(*kind).is_none() {
            eprintln!("Warning: no {} signal was returned", kind);
        }
    }

    let output = formatter.format(&snapshot)?;
    if let Some(path) = &args.output {
        std::fs::write(path, &output)?;
        eprintln!("Output written to {}", path.display());
    } else {
        println!("{}", output);
    }

    if let Some(dir) = &args.export {
        let dir = dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.export.directory));
        export(&session, &dir).await?;
    }

    Ok(())
}

/// Wait for every outstanding request, giving up after `timeout`
async fn settle(session: &DashboardHandle, timeout: Duration) -> Result<Snapshot> {
    tokio::time::timeout(timeout, session.wait_idle())
        .await
        .map_err(|_| {
            Error::Dashboard(format!(
                "Analyses did not finish within {}s",
                timeout.as_secs()
            ))
        })?
}

/// Requested kinds that actually produced a signal
fn returned_kinds(snapshot: &Snapshot, requested: &[AnalysisKind]) -> Vec<AnalysisKind> {
    requested
        .iter()
        .copied()
        .filter(|kind| snapshot.signal(*kind).is_some())
        .collect()
}

/// Write the CSV export into `dir`, reporting an empty result
async fn export(session: &DashboardHandle, dir: &Path) -> Result<Option<PathBuf>> {
    let today = chrono::Local::now().date_naive();

    match session.export(today).await? {
        ExportOutcome::Empty => {
            eprintln!("No data available to export.");
            Ok(None)
        }
        ExportOutcome::Ready(export) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(&export.file_name);
            std::fs::write(&path, export.content)?;
            eprintln!("Exported to {}", path.display());
            Ok(Some(path))
        }
    }
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:8} - {}", format.name, format.description);
    }
    println!();
    println!("Default: {}", Config::default().defaults.format);
}
