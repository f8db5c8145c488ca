// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process-wide router: demultiplexes the engine's event stream into per-submission
//! records and owns their lifecycle.

use crate::error::{ListenerFault, MuxError};
use crate::listener::Listener;
use crate::record::SubmissionRecord;
use evmux_core::{Clock, Event, RouterConfig, SubmissionId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The mux router. Bound once by the engine via [`MuxRouter::bind`]; every event the engine
/// raises afterward is handed to [`MuxRouter::dispatch`].
pub struct MuxRouter<C: Clock> {
    clock: C,
    inner: Mutex<Records<C>>,
}

struct Records<C: Clock> {
    bound: bool,
    max_node_count: u32,
    records: HashMap<SubmissionId, Arc<SubmissionRecord<C>>>,
    in_flight_projects: HashMap<SubmissionId, u32>,
    build_started_carrier: Option<Event>,
}

impl<C: Clock> MuxRouter<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            inner: Mutex::new(Records {
                bound: false,
                max_node_count: 1,
                records: HashMap::new(),
                in_flight_projects: HashMap::new(),
                build_started_carrier: None,
            }),
        }
    }

    /// Binds the router with the given configuration. The engine is expected to call
    /// `dispatch` for every event from this point on.
    pub fn bind(&self, config: RouterConfig) -> Result<(), MuxError> {
        let mut inner = self.inner.lock();
        if inner.bound {
            return Err(MuxError::AlreadyBound);
        }
        inner.bound = true;
        inner.max_node_count = config.max_node_count;
        tracing::info!(max_node_count = config.max_node_count, "mux router bound");
        Ok(())
    }

    /// Reverses `bind`, forcibly shutting down every surviving record.
    pub fn unbind(&self) -> Result<(), MuxError> {
        let records = {
            let mut inner = self.inner.lock();
            if !inner.bound {
                return Err(MuxError::NotBound);
            }
            inner.bound = false;
            inner.in_flight_projects.clear();
            inner.build_started_carrier = None;
            std::mem::take(&mut inner.records)
        };
        for record in records.values() {
            record.shutdown();
        }
        tracing::info!("mux router unbound");
        Ok(())
    }

    /// Registers a listener for a submission, creating its record on first use. Rejected once
    /// the submission is already active (has a ProjectStarted in flight), regardless of whether
    /// its record still exists.
    pub fn register(
        &self,
        submission_id: SubmissionId,
        listener: Arc<dyn Listener>,
    ) -> Result<(), MuxError> {
        let record = {
            let mut inner = self.inner.lock();
            if !inner.bound {
                return Err(MuxError::NotBound);
            }
            if inner.in_flight_projects.contains_key(&submission_id) {
                return Err(MuxError::SubmissionAlreadyStarted(submission_id));
            }
            if let Some(existing) = inner.records.get(&submission_id) {
                existing.clone()
            } else {
                let record = Arc::new(SubmissionRecord::new(
                    submission_id,
                    inner.max_node_count,
                    self.clock.clone(),
                ));
                if let Some(carrier) = inner.build_started_carrier.clone() {
                    record.set_build_started_carrier(carrier);
                }
                inner.records.insert(submission_id, record.clone());
                tracing::info!(submission = submission_id.0, "submission record created");
                record
            }
        };
        record.attach(listener)?;
        Ok(())
    }

    /// Removes and shuts down the record for a submission, if one exists. Returns whether a
    /// record existed.
    pub fn unregister(&self, submission_id: SubmissionId) -> bool {
        let record = {
            let mut inner = self.inner.lock();
            inner.records.remove(&submission_id)
        };
        match record {
            Some(record) => {
                record.shutdown();
                true
            }
            None => false,
        }
    }

    /// The single entry point the engine's dispatch thread calls for every event.
    ///
    /// Every target record is offered the event before any fault is propagated, so a fault in
    /// one submission's listener never keeps sibling submissions from observing a broadcast
    /// event (the record-level fan-out in [`SubmissionRecord::route`] follows the same
    /// collect-then-react discipline).
    pub fn dispatch(&self, evt: Event) -> Result<(), ListenerFault> {
        self.bookkeep(&evt);

        let targets = self.targets_for(&evt);
        let mut first_fault = None;
        for record in targets {
            if let Err(fault) = record.route(&evt) {
                let swallow = matches!(evt, Event::Error { .. } | Event::Warning { .. })
                    && !fault.is_polite();
                if swallow {
                    tracing::warn!(
                        submission = fault.submission().0,
                        polite = fault.is_polite(),
                        "listener fault swallowed on error/warning broadcast path"
                    );
                } else if first_fault.is_none() {
                    first_fault = Some(fault);
                }
            }
        }

        self.reap_finished_submission(&evt);
        match first_fault {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn bookkeep(&self, evt: &Event) {
        match evt {
            Event::BuildStarted { .. } => {
                let records = {
                    let mut inner = self.inner.lock();
                    inner.build_started_carrier = Some(evt.clone());
                    inner.records.values().cloned().collect::<Vec<_>>()
                };
                for record in records {
                    record.set_build_started_carrier(evt.clone());
                }
            }
            Event::BuildFinished { .. } => {
                self.inner.lock().build_started_carrier = None;
            }
            Event::ProjectStarted { .. } => {
                let mut inner = self.inner.lock();
                *inner
                    .in_flight_projects
                    .entry(evt.submission_id())
                    .or_insert(0) += 1;
            }
            _ => {}
        }
    }

    fn reap_finished_submission(&self, evt: &Event) {
        if !matches!(evt, Event::ProjectFinished { .. }) {
            return;
        }
        let submission_id = evt.submission_id();
        let mut inner = self.inner.lock();
        let Some(count) = inner.in_flight_projects.get_mut(&submission_id) else {
            return;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            inner.in_flight_projects.remove(&submission_id);
            inner.records.remove(&submission_id);
        }
    }

    /// Only Error/Warning tagged with the sentinel submission id broadcast to every record.
    /// Any other untagged event (engine-internal origin, per the data model) matches no real
    /// submission id and is dropped everywhere rather than fanned out.
    fn targets_for(&self, evt: &Event) -> Vec<Arc<SubmissionRecord<C>>> {
        let inner = self.inner.lock();
        if evt.is_broadcast_eligible() {
            inner.records.values().cloned().collect()
        } else {
            inner
                .records
                .get(&evt.submission_id())
                .cloned()
                .into_iter()
                .collect()
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
