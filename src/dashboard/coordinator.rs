//! Analysis coordinator
//!
//! Tracks, for the active location, which analyses are in flight and which
//! have produced a signal, and accumulates their results.
//!
//! Per kind the lifecycle is `Idle -> Pending -> {Fulfilled | Idle}`:
//! - a request is accepted only from `Idle`
//! - `Pending` lasts until every call the request fanned out to has returned
//! - a stored signal makes the kind `Fulfilled` for the rest of the selection
//! - a failed signal call drops the kind back to `Idle` so it can be retried

use crate::error::{Error, Result};
use crate::model::{AnalysisKind, HistoryPoint, Location, LocationContext, Signal};
use crate::service::StockingRequest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Accumulated results for the active location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultAggregate {
    /// At most one signal per kind, in arrival order
    pub signals: Vec<Signal>,
    /// NDVI history, sorted by date
    pub history: Vec<HistoryPoint>,
}

impl ResultAggregate {
    pub fn signal(&self, kind: AnalysisKind) -> Option<&Signal> {
        self.signals.iter().find(|s| s.kind == kind)
    }

    fn signal_mut(&mut self, kind: AnalysisKind) -> Option<&mut Signal> {
        self.signals.iter_mut().find(|s| s.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty() && self.history.is_empty()
    }
}

/// Lifecycle state of one analysis kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Idle,
    Pending,
    Fulfilled,
}

/// Backend call an analysis request fans out into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Signal(AnalysisKind),
    History,
}

/// Calls issued for a request of `kind`
fn fan_out(kind: AnalysisKind) -> Vec<Call> {
    match kind {
        AnalysisKind::Seasonal => vec![Call::Signal(kind), Call::History],
        AnalysisKind::Growth => vec![Call::Signal(kind)],
    }
}

/// Per-location analysis bookkeeping
#[derive(Debug, Default)]
pub struct AnalysisCoordinator {
    aggregate: ResultAggregate,
    context: Option<LocationContext>,
    /// Outstanding call count per pending kind
    pending: BTreeMap<AnalysisKind, usize>,
    stocking: BTreeSet<AnalysisKind>,
}

impl AnalysisCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything known about the previous location
    pub fn reset(&mut self) {
        self.aggregate = ResultAggregate::default();
        self.context = None;
        self.pending.clear();
        self.stocking.clear();
    }

    pub fn state(&self, kind: AnalysisKind) -> AnalysisState {
        if self.pending.contains_key(&kind) {
            AnalysisState::Pending
        } else if self.aggregate.signal(kind).is_some() {
            AnalysisState::Fulfilled
        } else {
            AnalysisState::Idle
        }
    }

    /// Mark `kind` pending and return the calls to issue
    ///
    /// Returns nothing when the kind is already pending or fulfilled.
    pub fn begin(&mut self, kind: AnalysisKind) -> Vec<Call> {
        if self.state(kind) != AnalysisState::Idle {
            debug!("{} analysis is {:?}, ignoring request", kind, self.state(kind));
            return Vec::new();
        }
        let calls = fan_out(kind);
        self.pending.insert(kind, calls.len());
        calls
    }

    /// Apply the result of a signal call
    pub fn finish_signal(&mut self, kind: AnalysisKind, result: Option<Signal>) {
        if !self.pending.contains_key(&kind) {
            return;
        }
        if let Some(mut signal) = result {
            signal.kind = kind;
            if self.aggregate.signal(kind).is_none() {
                self.aggregate.signals.push(signal);
            }
        }
        self.settle(kind);
    }

    /// Apply the result of the history call issued with `Seasonal`
    pub fn finish_history(&mut self, result: Option<Vec<HistoryPoint>>) {
        let kind = AnalysisKind::Seasonal;
        if !self.pending.contains_key(&kind) {
            return;
        }
        if let Some(history) = result {
            self.aggregate.history = history;
        }
        self.settle(kind);
    }

    fn settle(&mut self, kind: AnalysisKind) {
        if let Some(outstanding) = self.pending.get_mut(&kind) {
            *outstanding = outstanding.saturating_sub(1);
            if *outstanding == 0 {
                self.pending.remove(&kind);
            }
        }
    }

    pub fn set_context(&mut self, context: Option<LocationContext>) {
        self.context = context.filter(|c| !c.is_empty());
    }

    /// Build the stocking-action request for the signal of `kind`
    ///
    /// Returns `Ok(None)` while a request for the same signal is in flight.
    pub fn begin_stocking(
        &mut self,
        kind: AnalysisKind,
        location: &Location,
    ) -> Result<Option<StockingRequest>> {
        let signal = self
            .aggregate
            .signal(kind)
            .ok_or_else(|| Error::SignalNotFound(kind.to_string()))?;

        if self.stocking.contains(&kind) {
            return Ok(None);
        }

        let request = StockingRequest {
            store_name: location.name.clone(),
            signal_type: kind,
            metric: signal.metric.clone(),
            market_signal: signal.market_signal.clone(),
            location_context: self
                .context
                .clone()
                .or_else(|| signal.location_context.clone()),
        };
        self.stocking.insert(kind);
        Ok(Some(request))
    }

    /// Attach a stocking action to the signal of `kind`
    pub fn finish_stocking(&mut self, kind: AnalysisKind, result: Option<String>) {
        if !self.stocking.remove(&kind) {
            return;
        }
        if let (Some(action), Some(signal)) = (result, self.aggregate.signal_mut(kind)) {
            signal.stocking_action = Some(action);
        }
    }

    pub fn aggregate(&self) -> &ResultAggregate {
        &self.aggregate
    }

    pub fn context(&self) -> Option<&LocationContext> {
        self.context.as_ref()
    }

    /// Kinds with calls in flight
    pub fn pending(&self) -> Vec<AnalysisKind> {
        self.pending.keys().copied().collect()
    }

    /// Kinds with a stocking-action request in flight
    pub fn stocking_pending(&self) -> Vec<AnalysisKind> {
        self.stocking.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mock::{context_for, signal_for, store};
    use chrono::NaiveDate;

    fn point(day: u32, ndvi: f64) -> HistoryPoint {
        HistoryPoint {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            ndvi,
        }
    }

    #[test]
    fn test_seasonal_fans_out_to_history() {
        let mut coordinator = AnalysisCoordinator::new();
        let calls = coordinator.begin(AnalysisKind::Seasonal);

        assert_eq!(calls, vec![Call::Signal(AnalysisKind::Seasonal), Call::History]);
        assert_eq!(coordinator.begin(AnalysisKind::Growth), vec![Call::Signal(AnalysisKind::Growth)]);
    }

    #[test]
    fn test_pending_request_is_not_repeated() {
        let mut coordinator = AnalysisCoordinator::new();
        assert_eq!(coordinator.begin(AnalysisKind::Growth).len(), 1);
        assert!(coordinator.begin(AnalysisKind::Growth).is_empty());
        assert_eq!(coordinator.state(AnalysisKind::Growth), AnalysisState::Pending);
    }

    #[test]
    fn test_seasonal_stays_pending_until_both_calls_return() {
        let loc = store("1");
        let mut coordinator = AnalysisCoordinator::new();
        coordinator.begin(AnalysisKind::Seasonal);

        coordinator.finish_signal(AnalysisKind::Seasonal, Some(signal_for(AnalysisKind::Seasonal, &loc)));
        assert_eq!(coordinator.state(AnalysisKind::Seasonal), AnalysisState::Pending);
        assert_eq!(coordinator.aggregate().signals.len(), 1);

        coordinator.finish_history(Some(vec![point(1, 0.2), point(2, 0.3)]));
        assert_eq!(coordinator.state(AnalysisKind::Seasonal), AnalysisState::Fulfilled);
        assert_eq!(coordinator.aggregate().history.len(), 2);
        assert!(coordinator.begin(AnalysisKind::Seasonal).is_empty());
    }

    #[test]
    fn test_partial_seasonal_success_keeps_history() {
        let mut coordinator = AnalysisCoordinator::new();
        coordinator.begin(AnalysisKind::Seasonal);

        coordinator.finish_history(Some(vec![point(1, 0.2)]));
        coordinator.finish_signal(AnalysisKind::Seasonal, None);

        assert_eq!(coordinator.state(AnalysisKind::Seasonal), AnalysisState::Idle);
        assert!(coordinator.aggregate().signals.is_empty());
        assert_eq!(coordinator.aggregate().history.len(), 1);
    }

    #[test]
    fn test_seasonal_signal_survives_failed_history() {
        let loc = store("1");
        let mut coordinator = AnalysisCoordinator::new();
        coordinator.begin(AnalysisKind::Seasonal);

        coordinator.finish_signal(AnalysisKind::Seasonal, Some(signal_for(AnalysisKind::Seasonal, &loc)));
        coordinator.finish_history(None);

        assert_eq!(coordinator.state(AnalysisKind::Seasonal), AnalysisState::Fulfilled);
        assert!(coordinator.pending().is_empty());
        assert!(coordinator.aggregate().signal(AnalysisKind::Seasonal).is_some());
        assert!(coordinator.aggregate().history.is_empty());
    }

    #[test]
    fn test_retry_replaces_history_wholesale() {
        let loc = store("1");
        let mut coordinator = AnalysisCoordinator::new();
        coordinator.begin(AnalysisKind::Seasonal);
        coordinator.finish_history(Some(vec![point(1, 0.2), point(2, 0.25)]));
        coordinator.finish_signal(AnalysisKind::Seasonal, None);

        assert_eq!(coordinator.begin(AnalysisKind::Seasonal).len(), 2);
        coordinator.finish_history(Some(vec![point(9, 0.5)]));
        coordinator.finish_signal(AnalysisKind::Seasonal, Some(signal_for(AnalysisKind::Seasonal, &loc)));

        assert_eq!(coordinator.aggregate().history, vec![point(9, 0.5)]);
        assert_eq!(coordinator.state(AnalysisKind::Seasonal), AnalysisState::Fulfilled);
    }

    #[test]
    fn test_failure_returns_to_idle() {
        let mut coordinator = AnalysisCoordinator::new();
        coordinator.begin(AnalysisKind::Growth);
        coordinator.finish_signal(AnalysisKind::Growth, None);

        assert_eq!(coordinator.state(AnalysisKind::Growth), AnalysisState::Idle);
        assert_eq!(coordinator.begin(AnalysisKind::Growth).len(), 1);
    }

    #[test]
    fn test_unrequested_results_are_ignored() {
        let loc = store("1");
        let mut coordinator = AnalysisCoordinator::new();
        coordinator.finish_signal(AnalysisKind::Growth, Some(signal_for(AnalysisKind::Growth, &loc)));
        coordinator.finish_history(Some(vec![point(1, 0.2)]));

        assert!(coordinator.aggregate().is_empty());
    }

    #[test]
    fn test_empty_context_is_no_context() {
        let mut coordinator = AnalysisCoordinator::new();
        coordinator.set_context(Some(LocationContext::default()));
        assert!(coordinator.context().is_none());

        coordinator.set_context(Some(context_for(&store("1"))));
        assert!(coordinator.context().is_some());
    }

    #[test]
    fn test_stocking_requires_signal() {
        let loc = store("1");
        let mut coordinator = AnalysisCoordinator::new();
        let err = coordinator.begin_stocking(AnalysisKind::Growth, &loc).unwrap_err();
        assert!(matches!(err, Error::SignalNotFound(_)));
    }

    #[test]
    fn test_stocking_request_uses_current_context() {
        let loc = store("1");
        let mut coordinator = AnalysisCoordinator::new();
        coordinator.begin(AnalysisKind::Growth);
        let mut signal = signal_for(AnalysisKind::Growth, &loc);
        signal.location_context = Some(LocationContext {
            dcid: Some("embedded".to_string()),
            ..Default::default()
        });
        coordinator.finish_signal(AnalysisKind::Growth, Some(signal));

        let request = coordinator
            .begin_stocking(AnalysisKind::Growth, &loc)
            .unwrap()
            .unwrap();
        assert_eq!(request.store_name, "Store 1");
        assert_eq!(request.location_context.unwrap().dcid.as_deref(), Some("embedded"));
        coordinator.finish_stocking(AnalysisKind::Growth, None);

        coordinator.set_context(Some(context_for(&loc)));
        let request = coordinator
            .begin_stocking(AnalysisKind::Growth, &loc)
            .unwrap()
            .unwrap();
        assert_eq!(request.location_context.unwrap().dcid.as_deref(), Some("ctx/1"));
    }

    #[test]
    fn test_stocking_attaches_to_one_signal_only() {
        let loc = store("1");
        let mut coordinator = AnalysisCoordinator::new();
        for kind in [AnalysisKind::Seasonal, AnalysisKind::Growth] {
            coordinator.begin(kind);
            coordinator.finish_signal(kind, Some(signal_for(kind, &loc)));
        }
        coordinator.finish_history(None);
        assert_eq!(coordinator.state(AnalysisKind::Seasonal), AnalysisState::Fulfilled);
        assert!(coordinator.aggregate().history.is_empty());

        assert!(coordinator.begin_stocking(AnalysisKind::Growth, &loc).unwrap().is_some());
        assert!(coordinator.begin_stocking(AnalysisKind::Growth, &loc).unwrap().is_none());
        assert_eq!(coordinator.stocking_pending(), vec![AnalysisKind::Growth]);

        coordinator.finish_stocking(AnalysisKind::Growth, Some("Stock lumber".to_string()));

        let aggregate = coordinator.aggregate();
        assert_eq!(
            aggregate.signal(AnalysisKind::Growth).unwrap().stocking_action.as_deref(),
            Some("Stock lumber")
        );
        assert!(aggregate.signal(AnalysisKind::Seasonal).unwrap().stocking_action.is_none());
        assert!(coordinator.stocking_pending().is_empty());
    }

    #[test]
    fn test_reset_discards_everything() {
        let loc = store("1");
        let mut coordinator = AnalysisCoordinator::new();
        coordinator.begin(AnalysisKind::Growth);
        coordinator.finish_signal(AnalysisKind::Growth, Some(signal_for(AnalysisKind::Growth, &loc)));
        coordinator.begin(AnalysisKind::Seasonal);
        coordinator.set_context(Some(context_for(&loc)));

        coordinator.reset();

        assert!(coordinator.aggregate().is_empty());
        assert!(coordinator.context().is_none());
        assert!(coordinator.pending().is_empty());
        assert_eq!(coordinator.state(AnalysisKind::Growth), AnalysisState::Idle);
    }
}
