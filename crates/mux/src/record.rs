// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-submission event record: bracket synthesis, fan-out, and failure containment.

use crate::error::{ListenerFault, MuxError};
use crate::listener::{Listener, LocalBus};
use evmux_core::{Clock, Envelope, Event, EventContext, SubmissionId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordState {
    /// Created, no matching ProjectStarted observed yet.
    Registered,
    /// First matching ProjectStarted has been observed; brackets are live.
    Active,
    /// Torn down; no further listeners or events are accepted.
    Terminal,
}

struct RecordInner {
    state: RecordState,
    listeners: Vec<Arc<dyn Listener>>,
    build_started_carrier: Option<Event>,
    first_project_context: Option<EventContext>,
}

/// Per-submission state: its attached listeners, the carrier used to synthesize a bracketing
/// BuildStarted, and the anchor context used to detect the matching BuildFinished.
pub struct SubmissionRecord<C: Clock> {
    submission_id: SubmissionId,
    max_node_count: u32,
    clock: C,
    inner: Mutex<RecordInner>,
}

impl<C: Clock> SubmissionRecord<C> {
    pub fn new(submission_id: SubmissionId, max_node_count: u32, clock: C) -> Self {
        Self {
            submission_id,
            max_node_count,
            clock,
            inner: Mutex::new(RecordInner {
                state: RecordState::Registered,
                listeners: Vec::new(),
                build_started_carrier: None,
                first_project_context: None,
            }),
        }
    }

    pub fn submission_id(&self) -> SubmissionId {
        self.submission_id
    }

    pub fn is_terminal(&self) -> bool {
        self.inner.lock().state == RecordState::Terminal
    }

    /// Attaches a listener, rejecting it if the record is already shut down or if the same
    /// listener instance is already attached.
    pub fn attach(&self, listener: Arc<dyn Listener>) -> Result<(), MuxError> {
        let mut inner = self.inner.lock();
        if inner.state == RecordState::Terminal {
            return Err(MuxError::RecordShutDown(self.submission_id));
        }
        if inner
            .listeners
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &listener))
        {
            return Err(MuxError::AlreadyAttached(self.submission_id));
        }

        listener.initialize();
        if let Some(node_aware) = listener.as_node_aware() {
            node_aware.initialize_with_nodes(self.max_node_count);
        }
        inner.listeners.push(listener);
        Ok(())
    }

    /// Stores the most recently observed global BuildStarted as the carrier used to synthesize
    /// this record's own bracketing BuildStarted. Idempotent after the first call within a
    /// build: once a carrier is stored it is not replaced until the record is reused.
    pub fn set_build_started_carrier(&self, evt: Event) {
        let mut inner = self.inner.lock();
        if inner.build_started_carrier.is_none() {
            inner.build_started_carrier = Some(evt);
        }
    }

    /// Routes a single event through this record: bracket synthesis, suppression, fan-out, and
    /// terminal detection, per the record's state machine.
    pub fn route(&self, evt: &Event) -> Result<(), ListenerFault> {
        if self.is_terminal() {
            return Ok(());
        }

        let mut to_deliver: Vec<Event> = Vec::new();

        if let Event::ProjectStarted { .. } = evt {
            let mut inner = self.inner.lock();
            if inner.first_project_context.is_none() {
                inner.first_project_context = evt.context().copied();
                inner.state = RecordState::Active;
                let carrier = inner.build_started_carrier.clone().unwrap_or_else(|| {
                    tracing::warn!(
                        submission = self.submission_id.0,
                        "project:started observed before any build:started carrier; synthesizing an empty one"
                    );
                    Event::BuildStarted {
                        envelope: Envelope::new("", "router", self.clock.now()),
                        environment: HashMap::new(),
                    }
                });
                drop(inner);
                let context = evt
                    .context()
                    .copied()
                    .unwrap_or_else(EventContext::sentinel);
                to_deliver.push(carrier.with_timestamp(self.clock.now()).with_context(context));
                tracing::info!(submission = self.submission_id.0, "submission record activated");
            }
        }

        let raw_bracket = matches!(evt, Event::BuildStarted { .. } | Event::BuildFinished { .. });
        if raw_bracket {
            let inner = self.inner.lock();
            if inner.first_project_context.is_none() {
                return Ok(());
            }
        }

        to_deliver.push(evt.clone());

        let listeners = self.inner.lock().listeners.clone();
        let mut first_fault = None;
        for e in &to_deliver {
            for fault in LocalBus::deliver(&listeners, e) {
                if first_fault.is_none() {
                    first_fault = Some(fault);
                }
            }
        }

        let mut terminal_success = None;
        if let Event::ProjectFinished { success, .. } = evt {
            let inner = self.inner.lock();
            if inner.first_project_context == evt.context().copied() {
                terminal_success = Some(*success);
            }
        }

        if let Some(success) = terminal_success {
            let context = evt
                .context()
                .copied()
                .unwrap_or_else(EventContext::sentinel);
            let finish = Event::BuildFinished {
                envelope: Envelope::new("build finished", "router", self.clock.now())
                    .with_context(context),
                success,
            };
            for fault in LocalBus::deliver(&listeners, &finish) {
                if first_fault.is_none() {
                    first_fault = Some(fault);
                }
            }
            tracing::info!(submission = self.submission_id.0, success, "submission record reached terminal project, synthesizing build:finished");
            self.shutdown();
        }

        if let Some(fault) = first_fault {
            self.shutdown();
            return Err(fault);
        }

        Ok(())
    }

    /// Idempotent teardown: detaches every listener (invoking their terminal hook in
    /// registration order) and marks the record terminal. Safe to call from either the
    /// explicit-unregister path or the terminal-ProjectFinished path; the second caller is a
    /// no-op.
    pub fn shutdown(&self) {
        let listeners = {
            let mut inner = self.inner.lock();
            if inner.state == RecordState::Terminal {
                return;
            }
            inner.state = RecordState::Terminal;
            std::mem::take(&mut inner.listeners)
        };
        for listener in &listeners {
            listener.shutdown();
        }
        tracing::info!(submission = self.submission_id.0, "submission record shut down");
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
