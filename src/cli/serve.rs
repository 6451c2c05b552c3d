//! Serve command handler
//!
//! Starts the dashboard session server in foreground mode.

use crate::cli::{init_logging, load_config};
use crate::error::Result;
use crate::server;
use clap::Args;
use tracing::info;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
}

/// Run the serve command
pub async fn run(args: ServeArgs, api_url: Option<String>) -> Result<()> {
    init_logging("info");

    // Load and optionally override config
    let mut config = load_config(api_url)?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!(
        "Starting greengrowth server v{} on {} (service: {})",
        env!("CARGO_PKG_VERSION"),
        config.server_addr(),
        config.service.base_url
    );

    server::run(config).await
}
