// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time source abstraction used to stamp events deterministically in tests.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// A source of the current time. Components that stamp events are generic over `Clock` so
/// tests can substitute [`FakeClock`] instead of sleeping real time.
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Test clock holding a shared, manually-advanced instant.
#[derive(Debug, Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<SystemTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SystemTime::UNIX_EPOCH)),
        }
    }

    pub fn at(time: SystemTime) -> Self {
        Self {
            inner: Arc::new(Mutex::new(time)),
        }
    }

    /// Moves the clock forward by `secs` seconds, returning the new time.
    pub fn advance(&self, secs: u64) -> SystemTime {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard += std::time::Duration::from_secs(secs);
        *guard
    }

    /// Sets the clock to an explicit time.
    pub fn set(&self, time: SystemTime) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = time;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
