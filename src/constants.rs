//! Centralized constants for the greengrowth crate
//!
//! Values shared by the config defaults, the clients and the export code.

/// External API endpoints
pub mod api {
    /// Analysis Service base URL used when nothing is configured
    pub const ANALYSIS_URL: &str = "http://127.0.0.1:8000/api";

    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// User-Agent sent to every external service (Nominatim requires one)
    pub const USER_AGENT: &str = concat!("greengrowth/", env!("CARGO_PKG_VERSION"));

    /// Environment variable overriding the Analysis Service URL
    pub const ANALYSIS_URL_ENV: &str = "GREENGROWTH_API_URL";
}

/// Map viewport settings
pub mod map {
    /// Latitude of the default (national) view
    pub const DEFAULT_CENTER_LAT: f64 = 39.8283;

    /// Longitude of the default (national) view
    pub const DEFAULT_CENTER_LNG: f64 = -98.5795;

    /// Zoom of the default (national) view
    pub const DEFAULT_ZOOM: u8 = 4;

    /// Zoom used when a location is selected
    pub const SELECTED_ZOOM: u8 = 14;
}

/// Export settings
pub mod export {
    /// Prefix of every exported file name
    pub const FILE_PREFIX: &str = "GreenGrowth_Export";

    /// Stands in for the location id when nothing is selected
    pub const NO_SELECTION_SENTINEL: &str = "National";

    /// Column headers of the CSV export
    pub const HEADERS: [&str; 7] = [
        "Store Name",
        "Store ID",
        "Type",
        "Metric",
        "Market Signal",
        "Stocking Action",
        "Intensity",
    ];
}
