//! greengrowth CLI entry point
//!
//! Retail location intelligence dashboard - CLI + session server

use greengrowth::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
