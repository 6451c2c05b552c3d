//! Dashboard actor
//!
//! Owns a `Dashboard` on a single tokio task. Intents arrive through a
//! `DashboardHandle`; backend requests run as spawned tasks and report back
//! over a completion channel, so dashboard state is only ever touched by the
//! actor itself.

use crate::dashboard::{Completion, Dashboard, ExportOutcome, Intent, Request, Snapshot};
use crate::error::{Error, Result};
use crate::model::{AnalysisKind, Location};
use crate::service::AnalysisService;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum Command {
    Intent(Intent, oneshot::Sender<Result<Snapshot>>),
    Snapshot(oneshot::Sender<Snapshot>),
    Export(NaiveDate, oneshot::Sender<Result<ExportOutcome>>),
    WaitIdle(oneshot::Sender<Snapshot>),
}

/// Cloneable handle to a running dashboard actor
///
/// The actor stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intent(intent, _) => write!(f, "Intent({:?})", intent),
            Self::Snapshot(_) => write!(f, "Snapshot"),
            Self::Export(date, _) => write!(f, "Export({})", date),
            Self::WaitIdle(_) => write!(f, "WaitIdle"),
        }
    }
}

/// Start a dashboard actor backed by `service`
///
/// Must be called from within a tokio runtime.
pub fn spawn<S>(service: Arc<S>) -> DashboardHandle
where
    S: AnalysisService + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let actor = Actor {
        dashboard: Dashboard::new(),
        service,
        in_flight: 0,
        idle_waiters: Vec::new(),
    };
    tokio::spawn(actor.run(rx));
    DashboardHandle { tx }
}

fn stopped() -> Error {
    Error::Dashboard("dashboard actor is not running".to_string())
}

impl DashboardHandle {
    async fn intent(&self, intent: Intent) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Intent(intent, reply))
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }

    pub async fn select_location(&self, location: Location) -> Result<Snapshot> {
        self.intent(Intent::SelectLocation(location)).await
    }

    pub async fn clear_selection(&self) -> Result<Snapshot> {
        self.intent(Intent::ClearSelection).await
    }

    pub async fn set_stores(&self, stores: Vec<Location>) -> Result<Snapshot> {
        self.intent(Intent::SetStores(stores)).await
    }

    pub async fn request_analysis(&self, kind: AnalysisKind) -> Result<Snapshot> {
        self.intent(Intent::RequestAnalysis(kind)).await
    }

    pub async fn generate_stocking_action(&self, kind: AnalysisKind) -> Result<Snapshot> {
        self.intent(Intent::GenerateStockingAction(kind)).await
    }

    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Snapshot(reply)).map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())
    }

    /// Export the current signals, stamped with `date`
    pub async fn export(&self, date: NaiveDate) -> Result<ExportOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Export(date, reply))
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }

    /// Resolve once no backend request is outstanding
    ///
    /// Stale requests count too: they still have to come back to be dropped.
    pub async fn wait_idle(&self) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::WaitIdle(reply)).map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())
    }
}

struct Actor<S> {
    dashboard: Dashboard,
    service: Arc<S>,
    in_flight: usize,
    idle_waiters: Vec<oneshot::Sender<Snapshot>>,
}

impl<S> Actor<S>
where
    S: AnalysisService + 'static,
{
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command, &done_tx),
                    None => break,
                },
                Some(completion) = done_rx.recv() => self.on_completion(completion),
            }
        }

        debug!("Dashboard actor stopped");
    }

    fn on_command(&mut self, command: Command, done: &mpsc::UnboundedSender<Completion>) {
        match command {
            Command::Intent(intent, reply) => {
                let result = self.dashboard.handle(intent).map(|requests| {
                    for request in requests {
                        self.dispatch(request, done);
                    }
                    self.dashboard.snapshot()
                });
                let _ = reply.send(result);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.dashboard.snapshot());
            }
            Command::Export(date, reply) => {
                let _ = reply.send(self.dashboard.export(date));
            }
            Command::WaitIdle(reply) => {
                if self.in_flight == 0 {
                    let _ = reply.send(self.dashboard.snapshot());
                } else {
                    self.idle_waiters.push(reply);
                }
            }
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.dashboard.apply(completion);

        if self.in_flight == 0 && !self.idle_waiters.is_empty() {
            let snapshot = self.dashboard.snapshot();
            for waiter in self.idle_waiters.drain(..) {
                let _ = waiter.send(snapshot.clone());
            }
        }
    }

    fn dispatch(&mut self, request: Request, done: &mpsc::UnboundedSender<Completion>) {
        self.in_flight += 1;
        let service = Arc::clone(&self.service);
        let done = done.clone();

        tokio::spawn(async move {
            let completion = execute(service.as_ref(), request).await;
            let _ = done.send(completion);
        });
    }
}

/// Run one request, folding any failure into an empty result
async fn execute<S: AnalysisService>(service: &S, request: Request) -> Completion {
    match request {
        Request::Context { ticket, location } => {
            let result = service.context(&location).await;
            Completion::Context {
                result: or_log("context", &location.id, result),
                ticket,
            }
        }
        Request::Signal {
            ticket,
            kind,
            location,
        } => {
            let result = service.analyze(kind, &location).await;
            Completion::Signal {
                result: or_log(kind.endpoint(), &location.id, result),
                ticket,
                kind,
            }
        }
        Request::History { ticket, location } => {
            let result = service.history(&location).await;
            Completion::History {
                result: or_log("analyze/history", &location.id, result),
                ticket,
            }
        }
        Request::StockingAction {
            ticket,
            kind,
            request,
        } => {
            let result = service.stocking_action(&request).await;
            Completion::StockingAction {
                result: or_log("generate_stocking_action", &ticket.location_id, result),
                ticket,
                kind,
            }
        }
    }
}

fn or_log<T>(endpoint: &str, location_id: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} failed for {}: {}", endpoint, location_id, e);
            None
        }
    }
}
