//! Bulk store listing (superseded)
//!
//! The first version of the service precomputed signals for a fixed store
//! list. The on-demand `/analyze/*` flow replaced it; these endpoints are kept
//! only so the store list can still be shown on the map.

use crate::error::Result;
use crate::model::{HistoryPoint, Intensity, Location};
use crate::service::HttpAnalysisService;
use serde::{Deserialize, Serialize};

/// Signal as stored by the bulk endpoints
///
/// Types are free-form here ("Machinery" and friends predate `AnalysisKind`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSignal {
    #[serde(rename = "type")]
    pub signal_type: String,
    pub metric: String,
    pub market_signal: String,
    #[serde(default)]
    pub stocking_action: Option<String>,
    pub intensity: Intensity,
}

/// Precomputed results for one store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSignals {
    #[serde(default)]
    pub signals: Vec<StoredSignal>,
    #[serde(default)]
    pub history: Vec<HistoryPoint>,
}

impl HttpAnalysisService {
    /// List the stores known to the service
    pub async fn list_stores(&self) -> Result<Vec<Location>> {
        self.get_json("stores").await
    }

    /// Fetch the precomputed signals of one store
    pub async fn stored_signals(&self, store_id: &str) -> Result<StoredSignals> {
        let path = format!("stores/{}/signals", urlencoding::encode(store_id));
        self.get_json(&path).await
    }
}
