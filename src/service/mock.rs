//! Scriptable Analysis Service for tests

use crate::error::{Error, Result};
use crate::model::{
    AnalysisKind, Coordinates, HistoryPoint, Intensity, Location, LocationContext, Signal,
};
use crate::service::{AnalysisService, StockingRequest};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Records every call; can fail endpoints and hold calls until released
#[derive(Default)]
pub struct MockService {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    stocking_failures: AtomicUsize,
    gate: Option<Semaphore>,
    held: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits for a permit from `release`
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Calls for `location_id` wait for `release_location`
    pub fn hold(&self, location_id: &str) {
        self.held
            .lock()
            .unwrap()
            .insert(location_id.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub fn release_location(&self, location_id: &str, n: usize) {
        if let Some(gate) = self.held.lock().unwrap().get(location_id) {
            gate.add_permits(n);
        }
    }

    pub fn fail(&self, endpoint: &str) {
        self.failing.lock().unwrap().insert(endpoint.to_string());
    }

    pub fn recover(&self, endpoint: &str) {
        self.failing.lock().unwrap().remove(endpoint);
    }

    /// Fail the next `n` stocking-action calls
    pub fn fail_stocking_times(&self, n: usize) {
        self.stocking_failures.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == endpoint).count()
    }

    async fn enter(&self, endpoint: &str, location_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(endpoint.to_string());

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let held = self.held.lock().unwrap().get(location_id).cloned();
        if let Some(gate) = held {
            gate.acquire().await.unwrap().forget();
        }

        if self.failing.lock().unwrap().contains(endpoint) {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        Ok(())
    }
}

impl AnalysisService for MockService {
    async fn analyze(&self, kind: AnalysisKind, location: &Location) -> Result<Signal> {
        self.enter(kind.endpoint(), &location.id).await?;
        Ok(signal_for(kind, location))
    }

    async fn history(&self, location: &Location) -> Result<Vec<HistoryPoint>> {
        self.enter("analyze/history", &location.id).await?;
        Ok(vec![
            HistoryPoint {
                date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                ndvi: 0.1,
            },
            HistoryPoint {
                date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                ndvi: location.lat / 100.0,
            },
        ])
    }

    async fn context(&self, location: &Location) -> Result<LocationContext> {
        self.enter("context", &location.id).await?;
        Ok(context_for(location))
    }

    async fn stocking_action(&self, request: &StockingRequest) -> Result<String> {
        self.enter("generate_stocking_action", &request.store_name).await?;
        let remaining = self.stocking_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.stocking_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Payload("stocking action missing from response".to_string()));
        }
        Ok(format!("Restock for {} at {}", request.signal_type, request.store_name))
    }
}

pub fn signal_for(kind: AnalysisKind, location: &Location) -> Signal {
    Signal {
        kind,
        metric: format!("{} metric for {}", kind, location.id),
        market_signal: format!("{} market signal", kind),
        stocking_action: None,
        intensity: Intensity::High,
        tile_url: None,
        geo_points: vec![location.coordinates()],
        location_context: None,
    }
}

pub fn context_for(location: &Location) -> LocationContext {
    LocationContext {
        dcid: Some(format!("ctx/{}", location.id)),
        population: Some(1000.0),
        ..Default::default()
    }
}

pub fn store(id: &str) -> Location {
    Location::new(
        id,
        format!("Store {}", id),
        format!("{} Main St", id),
        Coordinates::new(44.79, -93.6),
    )
}
