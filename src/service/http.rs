//! HTTP Analysis Service backend
//!
//! Posts locations as JSON to the on-demand `/analyze/*` endpoints.

use crate::config::Config;
use crate::constants::api::USER_AGENT;
use crate::error::{Error, Result};
use crate::model::signal::sort_history;
use crate::model::{AnalysisKind, HistoryPoint, Location, LocationContext, Signal};
use crate::service::{AnalysisService, ExtractionJob, StockingRequest, StockingResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Analysis Service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalysisService {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::build(base_url.into(), None)
    }

    /// Create a client with a per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::build(base_url.into(), Some(timeout))
    }

    /// Create a client from the `[service]` config section
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(
            config.service.base_url.clone(),
            Duration::from_secs(config.service.timeout_secs),
        )
    }

    fn build(base_url: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Service root URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(path, response).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: path.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::Payload(format!("{} returned malformed JSON: {}", path, e)))
    }

    /// Check that the service answers at its root
    pub async fn ping(&self) -> Result<()> {
        let _: serde_json::Value = self.get_json("").await?;
        Ok(())
    }

    /// Submit a batch extraction job for a location
    pub async fn trigger_extraction(&self, location: &Location) -> Result<ExtractionJob> {
        self.post_json("trigger_extraction", location).await
    }
}

impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, kind: AnalysisKind, location: &Location) -> Result<Signal> {
        let mut signal: Signal = self.post_json(kind.endpoint(), location).await?;
        signal.kind = kind;
        Ok(signal)
    }

    async fn history(&self, location: &Location) -> Result<Vec<HistoryPoint>> {
        let mut history: Vec<HistoryPoint> = self.post_json("analyze/history", location).await?;
        sort_history(&mut history);
        Ok(history)
    }

    async fn context(&self, location: &Location) -> Result<LocationContext> {
        self.post_json("context", location).await
    }

    async fn stocking_action(&self, request: &StockingRequest) -> Result<String> {
        let response: StockingResponse = self.post_json("generate_stocking_action", request).await?;
        response
            .stocking_action
            .filter(|action| !action.trim().is_empty())
            .ok_or_else(|| Error::Payload("stocking action missing from response".to_string()))
    }
}
