//! Domain types shared by the dashboard, the clients and the formatters
//!
//! This module holds:
//! - Locations and their coordinates
//! - Analysis kinds and signal intensities
//! - Signals, NDVI history and demographic context

pub mod context;
pub mod signal;

pub use context::LocationContext;
pub use signal::{HistoryPoint, Overlay, Signal};

use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

/// A store or site under analysis
///
/// Locations are never mutated after creation; a new selection replaces the
/// whole value. The serialized form is the body of every analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Opaque identifier (place id, store number, or a generated UUID)
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        coords: Coordinates,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            lat: coords.lat,
            lng: coords.lng,
        }
    }

    /// Create a dropped-pin location with a generated id
    pub fn from_coordinates(coords: Coordinates, name: Option<&str>) -> Self {
        let label = format!("{:.5}, {:.5}", coords.lat, coords.lng);
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            name.unwrap_or(&label),
            label.clone(),
            coords,
        )
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Analyses that can be requested for a location
///
/// NDVI history is fetched alongside `Seasonal` and is not a kind of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnalysisKind {
    /// Vegetation health (NDVI) and seasonal transition
    Seasonal,
    /// Construction and built-up area growth
    Growth,
}

impl AnalysisKind {
    /// Path segment of the analysis endpoint
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Seasonal => "analyze/seasonal",
            Self::Growth => "analyze/growth",
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seasonal => write!(f, "Seasonal"),
            Self::Growth => write!(f, "Growth"),
        }
    }
}

impl std::str::FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "seasonal" | "ndvi" => Ok(Self::Seasonal),
            "growth" | "construction" => Ok(Self::Growth),
            _ => Err(format!("Unknown analysis kind: {}", s)),
        }
    }
}

/// List all analysis kinds, in display order
pub fn available_kinds() -> Vec<AnalysisKind> {
    vec![AnalysisKind::Seasonal, AnalysisKind::Growth]
}

/// Display emphasis of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Intensity {
    Low,
    Medium,
    High,
    Extreme,
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Extreme => write!(f, "Extreme"),
        }
    }
}
