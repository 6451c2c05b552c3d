//! Analysis Service clients
//!
//! This module defines the `AnalysisService` trait, the seam between the
//! dashboard and the remote service that does the satellite and demographic
//! work. `http` talks to the real service; `legacy` adds the superseded bulk
//! listing endpoints.
//!
//! Implementations return plain `Result`s. Turning failures into "no result"
//! is the dashboard's job, not the client's.

pub mod http;
pub mod legacy;

#[cfg(test)]
pub(crate) mod mock;

use crate::error::Result;
use crate::model::{AnalysisKind, HistoryPoint, Location, LocationContext, Signal};
use serde::{Deserialize, Serialize};
use std::future::Future;

pub use http::HttpAnalysisService;

/// Body of a stocking-action request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockingRequest {
    pub store_name: String,
    pub signal_type: AnalysisKind,
    pub metric: String,
    pub market_signal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_context: Option<LocationContext>,
}

/// Response of the stocking-action endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StockingResponse {
    pub stocking_action: Option<String>,
}

/// Batch extraction job accepted by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionJob {
    pub status: String,
    pub task_id: String,
}

/// Trait for Analysis Service backends
///
/// Implementations must be thread-safe (Send + Sync): calls are issued from
/// tasks spawned by the dashboard actor.
pub trait AnalysisService: Send + Sync {
    /// Run one analysis for a location
    ///
    /// The returned signal's kind is always `kind`.
    fn analyze(
        &self,
        kind: AnalysisKind,
        location: &Location,
    ) -> impl Future<Output = Result<Signal>> + Send;

    /// Fetch the NDVI time series for a location, sorted by date
    fn history(&self, location: &Location) -> impl Future<Output = Result<Vec<HistoryPoint>>> + Send;

    /// Fetch the demographic snapshot for a location
    fn context(&self, location: &Location) -> impl Future<Output = Result<LocationContext>> + Send;

    /// Ask for a stocking recommendation for one signal
    fn stocking_action(
        &self,
        request: &StockingRequest,
    ) -> impl Future<Output = Result<String>> + Send;
}
