//! HTTP session server
//!
//! Exposes one dashboard session to a browser presentation layer: intents
//! come in as REST calls, the current snapshot goes back as JSON.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::dashboard;
use crate::error::{Error, Result};
use crate::service::HttpAnalysisService;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server
///
/// Never returns unless the server shuts down
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    run_on(&addr, config).await
}

/// Start the HTTP server on a specific address
pub async fn run_on(addr: &str, config: Config) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let service = HttpAnalysisService::from_config(&config)?;
    info!("Using Analysis Service at {}", service.base_url());

    let session = dashboard::spawn(Arc::new(service));
    let state = Arc::new(AppState::new(config, session)?);
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}
