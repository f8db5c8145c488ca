// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake listeners shared by this crate's tests and downstream crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::error::ListenerFault;
use crate::listener::{Listener, NodeAwareListener};
use evmux_core::{Channel, Event, SubmissionId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Captures every (channel, event) pair it is offered, in delivery order.
#[derive(Default)]
pub struct RecordingListener {
    received: Mutex<Vec<(Channel, Event)>>,
    initialized: AtomicBool,
    shut_down: AtomicBool,
    nodes_seen: AtomicU32,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn received(&self) -> Vec<(Channel, Event)> {
        self.received.lock().clone()
    }

    pub fn was_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn was_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    pub fn max_node_count(&self) -> u32 {
        self.nodes_seen.load(Ordering::SeqCst)
    }
}

impl Listener for RecordingListener {
    fn initialize(&self) {
        self.initialized.store(true, Ordering::SeqCst);
    }

    fn on_event(&self, channel: Channel, event: &Event) -> Result<(), ListenerFault> {
        self.received.lock().push((channel, event.clone()));
        Ok(())
    }

    fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }

    fn as_node_aware(&self) -> Option<&dyn NodeAwareListener> {
        Some(self)
    }
}

impl NodeAwareListener for RecordingListener {
    fn initialize_with_nodes(&self, max_node_count: u32) {
        self.nodes_seen.store(max_node_count, Ordering::SeqCst);
    }
}

/// Faults on the configured channel; records everything else like [`RecordingListener`].
pub struct FaultingListener {
    inner: RecordingListener,
    fault_on: Channel,
    submission: SubmissionId,
    polite: bool,
}

impl FaultingListener {
    pub fn new(fault_on: Channel, submission: SubmissionId) -> Arc<Self> {
        Arc::new(Self {
            inner: RecordingListener::default(),
            fault_on,
            submission,
            polite: false,
        })
    }

    pub fn polite(fault_on: Channel, submission: SubmissionId) -> Arc<Self> {
        Arc::new(Self {
            inner: RecordingListener::default(),
            fault_on,
            submission,
            polite: true,
        })
    }

    pub fn received(&self) -> Vec<(Channel, Event)> {
        self.inner.received()
    }

    pub fn was_shut_down(&self) -> bool {
        self.inner.was_shut_down()
    }
}

impl Listener for FaultingListener {
    fn initialize(&self) {
        self.inner.initialize();
    }

    fn on_event(&self, channel: Channel, event: &Event) -> Result<(), ListenerFault> {
        self.inner.received.lock().push((channel, event.clone()));
        if channel == self.fault_on {
            let message = format!("fault on {channel:?}");
            return Err(if self.polite {
                ListenerFault::Polite {
                    submission: self.submission,
                    message,
                }
            } else {
                ListenerFault::Other {
                    submission: self.submission,
                    message,
                }
            });
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.inner.shutdown();
    }
}
