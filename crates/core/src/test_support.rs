// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::event::{Diagnostic, Envelope, Event, EventContext};
use crate::id::SubmissionId;
use std::collections::HashMap;
use std::time::SystemTime;

// ── Event factory functions ─────────────────────────────────────────────────

pub fn build_started_event(submission: i64, at: SystemTime) -> Event {
    Event::BuildStarted {
        envelope: Envelope::new("build started", "engine", at)
            .with_context(EventContext::for_submission(SubmissionId::new(submission))),
        environment: HashMap::new(),
    }
}

pub fn build_finished_event(submission: i64, at: SystemTime, success: bool) -> Event {
    Event::BuildFinished {
        envelope: Envelope::new("build finished", "engine", at)
            .with_context(EventContext::for_submission(SubmissionId::new(submission))),
        success,
    }
}

pub fn project_started_event(submission: i64, project: &str, at: SystemTime) -> Event {
    Event::ProjectStarted {
        envelope: Envelope::new(format!("project {project} started"), "engine", at).with_context(
            EventContext::for_submission(SubmissionId::new(submission)),
        ),
    }
}

pub fn project_finished_event(submission: i64, project: &str, at: SystemTime, success: bool) -> Event {
    Event::ProjectFinished {
        envelope: Envelope::new(format!("project {project} finished"), "engine", at).with_context(
            EventContext::for_submission(SubmissionId::new(submission)),
        ),
        success,
    }
}

pub fn target_started_event(submission: i64, target: &str, at: SystemTime) -> Event {
    Event::TargetStarted {
        envelope: Envelope::new(format!("target {target} started"), "engine", at).with_context(
            EventContext::for_submission(SubmissionId::new(submission)),
        ),
    }
}

pub fn task_finished_event(submission: i64, task: &str, at: SystemTime, success: bool) -> Event {
    Event::TaskFinished {
        envelope: Envelope::new(format!("task {task} finished"), "engine", at).with_context(
            EventContext::for_submission(SubmissionId::new(submission)),
        ),
        success,
    }
}

pub fn message_event(submission: i64, text: &str, at: SystemTime) -> Event {
    Event::Message {
        envelope: Envelope::new(text, "engine", at)
            .with_context(EventContext::for_submission(SubmissionId::new(submission))),
    }
}

/// A genuinely untagged event: no context at all, as an engine-internal `Message` would carry.
/// Unlike [`message_event`], this has no submission id to route on, tagged or sentinel.
pub fn untagged_message_event(text: &str, at: SystemTime) -> Event {
    Event::Message {
        envelope: Envelope::new(text, "engine", at),
    }
}

pub fn sentinel_error_event(text: &str, at: SystemTime) -> Event {
    Event::Error {
        envelope: Envelope::new(text, "engine", at).with_context(EventContext::sentinel()),
        diagnostic: Diagnostic::default(),
    }
}

pub fn tagged_warning_event(submission: i64, text: &str, at: SystemTime) -> Event {
    Event::Warning {
        envelope: Envelope::new(text, "engine", at)
            .with_context(EventContext::for_submission(SubmissionId::new(submission))),
        diagnostic: Diagnostic::default(),
    }
}
