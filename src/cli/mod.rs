//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod analyze;
pub mod config;
pub mod extract;
pub mod serve;
pub mod status;
pub mod stores;

use crate::config::Config;
use crate::constants::api::ANALYSIS_URL_ENV;
use crate::error::{Error, Result};
use crate::geo::{self, nominatim::NominatimBackend};
use crate::model::{Coordinates, Location};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Retail location intelligence dashboard
#[derive(Parser)]
#[command(name = "greengrowth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Analysis Service base URL (overrides config)
    #[arg(long, global = true, env = ANALYSIS_URL_ENV)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a location and print its signals
    Analyze(analyze::AnalyzeArgs),

    /// Start the dashboard session server (foreground)
    Serve(serve::ServeArgs),

    /// List stores known to the Analysis Service
    Stores(stores::StoresArgs),

    /// Submit a batch extraction job for a location
    Extract(extract::ExtractArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show service/server status
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let api_url = cli.api_url;

    match cli.command {
        Commands::Analyze(args) => analyze::run(args, api_url).await,
        Commands::Serve(args) => serve::run(args, api_url).await,
        Commands::Stores(args) => stores::run(args, api_url).await,
        Commands::Extract(args) => extract::run(args, api_url).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args, api_url).await,
    }
}

/// Initialize logging, honoring RUST_LOG over `default`
pub(crate) fn init_logging(default: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

/// Load config and apply the `--api-url` override
pub(crate) fn load_config(api_url: Option<String>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = api_url {
        config.service.base_url = url;
    }
    Ok(config)
}

/// Location selection shared by commands that act on one place
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Place to look up (e.g. "Home Depot, Chaska MN")
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub location: Option<String>,

    /// Latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Display name for a dropped pin
    #[arg(long)]
    pub name: Option<String>,
}

impl LocationArgs {
    /// Resolve the arguments into a Location, geocoding if needed
    pub async fn resolve(&self, config: &Config) -> Result<Location> {
        if let Some(query) = &self.location {
            let geocoder = NominatimBackend::from_config(config)?;
            let location = geo::locate(&geocoder, query).await?;
            eprintln!("Found: {}", location.address);
            return Ok(location);
        }

        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                let coords = Coordinates::new(lat, lng);
                coords.validate()?;
                Ok(Location::from_coordinates(coords, self.name.as_deref()))
            }
            _ => Err(Error::Config(
                "No location specified. Use --location or --lat/--lng".to_string(),
            )),
        }
    }
}
