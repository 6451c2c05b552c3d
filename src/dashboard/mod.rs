//! Selection and analysis lifecycle
//!
//! `Dashboard` is a synchronous state machine: intents go in, backend
//! requests come out, and completed requests are applied back with
//! `Dashboard::apply`. It never performs I/O itself; `actor` runs it on a
//! tokio task and executes the requests against an `AnalysisService`.
//!
//! Every request carries the `Ticket` of the selection it was issued for.
//! Completions whose ticket is no longer current are dropped, so results for
//! a location the analyst has already left never leak into the new one.

pub mod actor;
pub mod coordinator;
pub mod export;
pub mod selection;

pub use actor::{spawn, DashboardHandle};
pub use coordinator::{AnalysisCoordinator, AnalysisState, ResultAggregate};
pub use export::{CsvExport, ExportOutcome};
pub use selection::{SelectionStore, Ticket, Viewport};

use crate::error::{Error, Result};
use crate::model::{
    AnalysisKind, HistoryPoint, Location, LocationContext, Signal,
};
use crate::service::StockingRequest;
use chrono::NaiveDate;
use coordinator::Call;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// User intents consumed by the dashboard
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SelectLocation(Location),
    ClearSelection,
    SetStores(Vec<Location>),
    RequestAnalysis(AnalysisKind),
    GenerateStockingAction(AnalysisKind),
}

/// A backend call the dashboard wants made
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Context {
        ticket: Ticket,
        location: Location,
    },
    Signal {
        ticket: Ticket,
        kind: AnalysisKind,
        location: Location,
    },
    History {
        ticket: Ticket,
        location: Location,
    },
    StockingAction {
        ticket: Ticket,
        kind: AnalysisKind,
        request: StockingRequest,
    },
}

/// Outcome of a `Request`; `None` means the call produced nothing usable
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Context {
        ticket: Ticket,
        result: Option<LocationContext>,
    },
    Signal {
        ticket: Ticket,
        kind: AnalysisKind,
        result: Option<Signal>,
    },
    History {
        ticket: Ticket,
        result: Option<Vec<HistoryPoint>>,
    },
    StockingAction {
        ticket: Ticket,
        kind: AnalysisKind,
        result: Option<String>,
    },
}

impl Completion {
    pub fn ticket(&self) -> &Ticket {
        match self {
            Self::Context { ticket, .. }
            | Self::Signal { ticket, .. }
            | Self::History { ticket, .. }
            | Self::StockingAction { ticket, .. } => ticket,
        }
    }
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub active: Option<Location>,
    pub stores: Vec<Location>,
    pub viewport: Viewport,
    pub signals: Vec<Signal>,
    pub history: Vec<HistoryPoint>,
    pub context: Option<LocationContext>,
    /// Analyses in flight
    pub pending: Vec<AnalysisKind>,
    /// Stocking-action requests in flight
    pub stocking_pending: Vec<AnalysisKind>,
}

impl Snapshot {
    pub fn signal(&self, kind: AnalysisKind) -> Option<&Signal> {
        self.signals.iter().find(|s| s.kind == kind)
    }

    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty() || !self.stocking_pending.is_empty()
    }
}

/// Selection store plus analysis coordinator
#[derive(Debug, Default)]
pub struct Dashboard {
    selection: SelectionStore,
    analysis: AnalysisCoordinator,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch an intent to the matching operation
    pub fn handle(&mut self, intent: Intent) -> Result<Vec<Request>> {
        match intent {
            Intent::SelectLocation(location) => Ok(self.select_location(location)),
            Intent::ClearSelection => {
                self.clear_selection();
                Ok(Vec::new())
            }
            Intent::SetStores(stores) => {
                self.set_stores(stores);
                Ok(Vec::new())
            }
            Intent::RequestAnalysis(kind) => self.request_analysis(kind),
            Intent::GenerateStockingAction(kind) => self.generate_stocking_action(kind),
        }
    }

    /// Make `location` active and fetch its context
    ///
    /// Everything known about the previous location is discarded.
    pub fn select_location(&mut self, location: Location) -> Vec<Request> {
        info!("Selected {} ({})", location.name, location.id);
        let ticket = self.selection.select(location.clone());
        self.analysis.reset();
        vec![Request::Context { ticket, location }]
    }

    /// Drop the selection, its results and the store markers
    pub fn clear_selection(&mut self) {
        info!("Selection cleared");
        self.selection.clear();
        self.analysis.reset();
    }

    pub fn set_stores(&mut self, stores: Vec<Location>) {
        self.selection.set_stores(stores);
    }

    /// Request one analysis for the active location
    ///
    /// At most once per kind per selection; a pending or fulfilled kind is a
    /// no-op.
    pub fn request_analysis(&mut self, kind: AnalysisKind) -> Result<Vec<Request>> {
        let (ticket, location) = self.active()?;

        let requests = self
            .analysis
            .begin(kind)
            .into_iter()
            .map(|call| match call {
                Call::Signal(kind) => Request::Signal {
                    ticket: ticket.clone(),
                    kind,
                    location: location.clone(),
                },
                Call::History => Request::History {
                    ticket: ticket.clone(),
                    location: location.clone(),
                },
            })
            .collect();
        Ok(requests)
    }

    /// Ask for a stocking recommendation for the signal of `kind`
    pub fn generate_stocking_action(&mut self, kind: AnalysisKind) -> Result<Vec<Request>> {
        let (ticket, location) = self.active()?;

        Ok(self
            .analysis
            .begin_stocking(kind, &location)?
            .map(|request| Request::StockingAction {
                ticket,
                kind,
                request,
            })
            .into_iter()
            .collect())
    }

    fn active(&self) -> Result<(Ticket, Location)> {
        match (self.selection.ticket(), self.selection.active()) {
            (Some(ticket), Some(location)) => Ok((ticket, location.clone())),
            _ => Err(Error::NoActiveLocation),
        }
    }

    /// Apply a completed request
    ///
    /// Returns false when the completion was stale and discarded.
    pub fn apply(&mut self, completion: Completion) -> bool {
        if !self.selection.is_current(completion.ticket()) {
            debug!(
                "Discarding stale result for {} (generation {})",
                completion.ticket().location_id,
                completion.ticket().generation
            );
            return false;
        }

        match completion {
            Completion::Context { result, .. } => self.analysis.set_context(result),
            Completion::Signal { kind, result, .. } => self.analysis.finish_signal(kind, result),
            Completion::History { result, .. } => self.analysis.finish_history(result),
            Completion::StockingAction { kind, result, .. } => {
                self.analysis.finish_stocking(kind, result)
            }
        }
        true
    }

    pub fn state(&self, kind: AnalysisKind) -> AnalysisState {
        self.analysis.state(kind)
    }

    pub fn active_location(&self) -> Option<&Location> {
        self.selection.active()
    }

    pub fn aggregate(&self) -> &ResultAggregate {
        self.analysis.aggregate()
    }

    pub fn context(&self) -> Option<&LocationContext> {
        self.analysis.context()
    }

    pub fn snapshot(&self) -> Snapshot {
        let aggregate = self.analysis.aggregate();
        Snapshot {
            active: self.selection.active().cloned(),
            stores: self.selection.stores().to_vec(),
            viewport: self.selection.viewport(),
            signals: aggregate.signals.clone(),
            history: aggregate.history.clone(),
            context: self.analysis.context().cloned(),
            pending: self.analysis.pending(),
            stocking_pending: self.analysis.stocking_pending(),
        }
    }

    /// Export the current signals as CSV
    pub fn export(&self, date: NaiveDate) -> Result<ExportOutcome> {
        export::export(self.selection.active(), &self.aggregate().signals, date)
    }
}
