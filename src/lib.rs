//! greengrowth: retail location intelligence dashboard
//!
//! A library and CLI for selecting a retail location, running satellite-based
//! analyses against a remote Analysis Service, and exporting the resulting
//! market signals.
//!
//! ## Features
//!
//! - Selection lifecycle with stale-result discard
//! - At most one in-flight analysis per kind per selection
//! - Location context and stocking-action enrichment
//! - CSV export
//! - HTTP session server + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use greengrowth::dashboard::{Dashboard, Request};
//! use greengrowth::model::{AnalysisKind, Coordinates, Location};
//!
//! let mut dashboard = Dashboard::new();
//! let store = Location::new("2801", "Chaska", "3000 Chestnut St", Coordinates::new(44.79, -93.6));
//!
//! // Selecting a location asks for its context
//! let requests = dashboard.select_location(store);
//! assert!(matches!(requests[0], Request::Context { .. }));
//!
//! // Requesting an analysis yields the backend calls to issue
//! let requests = dashboard.request_analysis(AnalysisKind::Growth).unwrap();
//! assert_eq!(requests.len(), 1);
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod geo;
pub mod model;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use config::Config;
pub use dashboard::{Dashboard, DashboardHandle, Snapshot};
pub use error::{Error, Result};
pub use model::{AnalysisKind, Location, Signal};
