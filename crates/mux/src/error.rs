// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the mux router.

use evmux_core::SubmissionId;
use thiserror::Error;

/// Usage errors: programmer mistakes that leave the router's own state consistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MuxError {
    #[error("router already bound")]
    AlreadyBound,
    #[error("router not bound")]
    NotBound,
    #[error("listener registered for submission {0} is null")]
    NullListener(SubmissionId),
    #[error("submission {0} has already started")]
    SubmissionAlreadyStarted(SubmissionId),
    #[error("listener already attached to submission {0}")]
    AlreadyAttached(SubmissionId),
    #[error("submission {0} record is already shut down")]
    RecordShutDown(SubmissionId),
}

/// A fault raised by a listener while handling an event.
///
/// `Polite` faults are the listener's own well-known "I am failing cleanly" signal and are
/// always re-raised by the router after the faulting record is detached. `Other` faults are
/// re-raised too, except when raised from the Error/Warning delivery path, which swallows them
/// to preserve continuity of the broadcast stream (see the router's dispatch docs).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListenerFault {
    #[error("listener for submission {submission} failed politely: {message}")]
    Polite {
        submission: SubmissionId,
        message: String,
    },
    #[error("listener for submission {submission} faulted: {message}")]
    Other {
        submission: SubmissionId,
        message: String,
    },
}

impl ListenerFault {
    pub fn submission(&self) -> SubmissionId {
        match self {
            ListenerFault::Polite { submission, .. } | ListenerFault::Other { submission, .. } => {
                *submission
            }
        }
    }

    pub fn is_polite(&self) -> bool {
        matches!(self, ListenerFault::Polite { .. })
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
