//! Server shared state
//!
//! Holds configuration, the dashboard session and the place lookup backend.

use crate::config::Config;
use crate::dashboard::DashboardHandle;
use crate::error::Result;
use crate::geo::nominatim::NominatimBackend;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// The single dashboard session this server drives
    pub dashboard: DashboardHandle,

    /// Place lookup for free-text selection
    pub geocoder: NominatimBackend,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, dashboard: DashboardHandle) -> Result<Self> {
        let geocoder = NominatimBackend::from_config(&config)?;
        Ok(Self {
            config,
            dashboard,
            geocoder,
        })
    }
}
