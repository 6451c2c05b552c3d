//! Analysis signals and NDVI history

use crate::model::{AnalysisKind, Coordinates, Intensity, LocationContext};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One analysis result for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub kind: AnalysisKind,

    /// Short metric label, e.g. "Vegetation Waking Up (NDVI 0.31)"
    pub metric: String,

    /// Narrative of what the metric means for the market
    pub market_signal: String,

    /// Recommendation text, filled in by a separate request
    #[serde(default)]
    pub stocking_action: Option<String>,

    pub intensity: Intensity,

    /// XYZ tile URL template of the analysis raster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_url: Option<String>,

    /// Sample points of the detected area
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geo_points: Vec<Coordinates>,

    /// Demographic context the service attached to this signal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_context: Option<LocationContext>,
}

/// Geographic overlay carried by a signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay<'a> {
    Tiles(&'a str),
    Points(&'a [Coordinates]),
}

impl Signal {
    /// Overlay to draw for this signal; tiles win over points
    pub fn overlay(&self) -> Option<Overlay<'_>> {
        if let Some(url) = self.tile_url.as_deref().filter(|u| !u.is_empty()) {
            Some(Overlay::Tiles(url))
        } else if !self.geo_points.is_empty() {
            Some(Overlay::Points(&self.geo_points))
        } else {
            None
        }
    }

    pub fn has_stocking_action(&self) -> bool {
        self.stocking_action.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// One NDVI sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub ndvi: f64,
}

/// Sort a history sequence ascending by date
pub fn sort_history(history: &mut [HistoryPoint]) {
    history.sort_by_key(|p| p.date);
}
