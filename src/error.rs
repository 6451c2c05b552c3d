//! Error types for greengrowth

use thiserror::Error;

/// Main error type for greengrowth operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("No location is selected")]
    NoActiveLocation,

    #[error("Place has no geometry: {0}")]
    MissingGeometry(String),

    #[error("No {0} signal for the selected location")]
    SignalNotFound(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Analysis service returned status {status} for {endpoint}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("Unexpected payload: {0}")]
    Payload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Dashboard error: {0}")]
    Dashboard(String),
}

/// Result type alias for greengrowth operations
pub type Result<T> = std::result::Result<T, Error>;
