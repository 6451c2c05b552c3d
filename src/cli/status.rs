//! Status command handler
//!
//! Shows whether the Analysis Service and the session server are reachable.

use crate::cli::load_config;
use crate::config::Config;
use crate::error::Result;
use crate::service::HttpAnalysisService;
use clap::Args;
use std::time::Duration;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Also check if the session server is running
    #[arg(long)]
    pub server: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs, api_url: Option<String>) -> Result<()> {
    let config = load_config(api_url)?;

    println!("greengrowth v{}", env!("CARGO_PKG_VERSION"));
    println!("Config: {}", Config::config_path()?.display());
    println!();

    let service = HttpAnalysisService::with_timeout(&config.service.base_url, Duration::from_secs(10))?;
    match service.ping().await {
        Ok(()) => println!("Analysis Service: UP at {}", service.base_url()),
        Err(e) => println!("Analysis Service: DOWN at {} ({})", service.base_url(), e),
    }

    if args.server {
        check_server_status(&config).await;
    }

    Ok(())
}

/// Check if the session server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/api/status", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) => {
            if response.status().is_success() {
                println!("Server: RUNNING on {}", config.server_addr());
                if let Ok(status) = response.json::<serde_json::Value>().await {
                    if let Some(version) = status.get("version").and_then(|v| v.as_str()) {
                        println!("  Version: {}", version);
                    }
                    match status.get("active").and_then(|v| v.as_str()) {
                        Some(active) => println!("  Selected: {}", active),
                        None => println!("  Selected: none"),
                    }
                }
            } else {
                println!("Server: ERROR (status {})", response.status());
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
}
