// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types emitted by the build engine and routed by the mux.
//!
//! Serializes with `{"type": "event:name", ...fields}` format, matching the tagged-enum
//! convention used throughout this codebase's event types.

use crate::id::{NodeId, ProjectContextId, SubmissionId, TargetId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::SystemTime;

mod timestamp {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S: Serializer>(t: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
        let millis = t.duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        millis.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SystemTime, D::Error> {
        let millis = u128::deserialize(d)?;
        Ok(UNIX_EPOCH + Duration::from_millis(millis.min(u64::MAX as u128) as u64))
    }
}

/// Identifies which submission (and, within it, which node/project/target/task) an event
/// belongs to. Absent on events the engine raises without a submission in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub submission_id: SubmissionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_context_id: Option<ProjectContextId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<TargetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
}

impl EventContext {
    pub fn for_submission(submission_id: SubmissionId) -> Self {
        Self {
            submission_id,
            node_id: None,
            project_context_id: None,
            target_id: None,
            task_id: None,
        }
    }

    /// The reserved context used by Error/Warning events raised outside any submission.
    pub fn sentinel() -> Self {
        Self::for_submission(SubmissionId::SENTINEL)
    }
}

/// Error/warning detail: source location and classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Diagnostic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

/// Fields common to every event variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub sender: String,
    #[serde(with = "timestamp")]
    pub timestamp: SystemTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<EventContext>,
}

impl Envelope {
    pub fn new(message: impl Into<String>, sender: impl Into<String>, timestamp: SystemTime) -> Self {
        Self {
            message: message.into(),
            help: String::new(),
            sender: sender.into(),
            timestamp,
            context: None,
        }
    }

    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

/// The channel a listener can subscribe to. `Status` and `Any` are aggregate channels that the
/// router fans an event out to in addition to its specific kind channel; they are never a
/// value returned by [`Event::channel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    BuildStarted,
    BuildFinished,
    ProjectStarted,
    ProjectFinished,
    TargetStarted,
    TargetFinished,
    TaskStarted,
    TaskFinished,
    Message,
    Warning,
    Error,
    Custom,
    /// Aggregates every lifecycle (Build/Project/Target/Task Started/Finished) channel.
    Status,
    /// Aggregates every channel.
    Any,
}

/// Events that trigger routing decisions in the mux.
///
/// Serializes with `{"type": "event:name", ...fields}` format. A sender that wants to emit a
/// kind this enum doesn't name should use `Custom` explicitly, tagged `"type": "custom"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "build:started")]
    BuildStarted {
        #[serde(flatten)]
        envelope: Envelope,
        #[serde(default)]
        environment: HashMap<String, String>,
    },

    #[serde(rename = "build:finished")]
    BuildFinished {
        #[serde(flatten)]
        envelope: Envelope,
        success: bool,
    },

    #[serde(rename = "project:started")]
    ProjectStarted {
        #[serde(flatten)]
        envelope: Envelope,
    },

    #[serde(rename = "project:finished")]
    ProjectFinished {
        #[serde(flatten)]
        envelope: Envelope,
        success: bool,
    },

    #[serde(rename = "target:started")]
    TargetStarted {
        #[serde(flatten)]
        envelope: Envelope,
    },

    #[serde(rename = "target:finished")]
    TargetFinished {
        #[serde(flatten)]
        envelope: Envelope,
        success: bool,
    },

    #[serde(rename = "task:started")]
    TaskStarted {
        #[serde(flatten)]
        envelope: Envelope,
    },

    #[serde(rename = "task:finished")]
    TaskFinished {
        #[serde(flatten)]
        envelope: Envelope,
        success: bool,
    },

    #[serde(rename = "message")]
    Message {
        #[serde(flatten)]
        envelope: Envelope,
    },

    #[serde(rename = "warning")]
    Warning {
        #[serde(flatten)]
        envelope: Envelope,
        #[serde(default)]
        diagnostic: Diagnostic,
    },

    #[serde(rename = "error")]
    Error {
        #[serde(flatten)]
        envelope: Envelope,
        #[serde(default)]
        diagnostic: Diagnostic,
    },

    #[serde(rename = "custom")]
    Custom {
        #[serde(flatten)]
        envelope: Envelope,
        kind: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
}

impl Event {
    pub fn envelope(&self) -> &Envelope {
        match self {
            Event::BuildStarted { envelope, .. }
            | Event::BuildFinished { envelope, .. }
            | Event::ProjectStarted { envelope }
            | Event::ProjectFinished { envelope, .. }
            | Event::TargetStarted { envelope }
            | Event::TargetFinished { envelope, .. }
            | Event::TaskStarted { envelope }
            | Event::TaskFinished { envelope, .. }
            | Event::Message { envelope }
            | Event::Warning { envelope, .. }
            | Event::Error { envelope, .. }
            | Event::Custom { envelope, .. } => envelope,
        }
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        match self {
            Event::BuildStarted { envelope, .. }
            | Event::BuildFinished { envelope, .. }
            | Event::ProjectStarted { envelope }
            | Event::ProjectFinished { envelope, .. }
            | Event::TargetStarted { envelope }
            | Event::TargetFinished { envelope, .. }
            | Event::TaskStarted { envelope }
            | Event::TaskFinished { envelope, .. }
            | Event::Message { envelope }
            | Event::Warning { envelope, .. }
            | Event::Error { envelope, .. }
            | Event::Custom { envelope, .. } => envelope,
        }
    }

    /// The submission this event is tagged with, if any. `None` means engine-internal.
    pub fn context(&self) -> Option<&EventContext> {
        self.envelope().context.as_ref()
    }

    /// The submission id this event is tagged with, treating an absent context as the
    /// sentinel (engine-internal) id.
    pub fn submission_id(&self) -> SubmissionId {
        self.context()
            .map(|c| c.submission_id)
            .unwrap_or(SubmissionId::SENTINEL)
    }

    /// Returns a copy of this event with its timestamp replaced, used when synthesizing a
    /// bracketing BuildStarted/BuildFinished from a stored carrier.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.envelope_mut().timestamp = timestamp;
        self
    }

    /// Returns a copy of this event re-tagged with a different context, used when
    /// synthesizing a bracketing event for a specific record.
    pub fn with_context(mut self, context: EventContext) -> Self {
        self.envelope_mut().context = Some(context);
        self
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::BuildStarted { .. } => "build:started",
            Event::BuildFinished { .. } => "build:finished",
            Event::ProjectStarted { .. } => "project:started",
            Event::ProjectFinished { .. } => "project:finished",
            Event::TargetStarted { .. } => "target:started",
            Event::TargetFinished { .. } => "target:finished",
            Event::TaskStarted { .. } => "task:started",
            Event::TaskFinished { .. } => "task:finished",
            Event::Message { .. } => "message",
            Event::Warning { .. } => "warning",
            Event::Error { .. } => "error",
            Event::Custom { .. } => "custom",
        }
    }

    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self.context() {
            Some(ctx) => format!("{t} submission={}", ctx.submission_id),
            None => format!("{t} submission=-"),
        }
    }

    /// The specific-kind channel this event is delivered on. Lifecycle events are also
    /// delivered on the aggregate `Status` channel, and every event on `Any`.
    pub fn channel(&self) -> Channel {
        match self {
            Event::BuildStarted { .. } => Channel::BuildStarted,
            Event::BuildFinished { .. } => Channel::BuildFinished,
            Event::ProjectStarted { .. } => Channel::ProjectStarted,
            Event::ProjectFinished { .. } => Channel::ProjectFinished,
            Event::TargetStarted { .. } => Channel::TargetStarted,
            Event::TargetFinished { .. } => Channel::TargetFinished,
            Event::TaskStarted { .. } => Channel::TaskStarted,
            Event::TaskFinished { .. } => Channel::TaskFinished,
            Event::Message { .. } => Channel::Message,
            Event::Warning { .. } => Channel::Warning,
            Event::Error { .. } => Channel::Error,
            Event::Custom { .. } => Channel::Custom,
        }
    }

    /// True for the eight Started/Finished lifecycle kinds (the events also fanned out on
    /// the `Status` aggregate channel).
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self.channel(),
            Channel::BuildStarted
                | Channel::BuildFinished
                | Channel::ProjectStarted
                | Channel::ProjectFinished
                | Channel::TargetStarted
                | Channel::TargetFinished
                | Channel::TaskStarted
                | Channel::TaskFinished
        )
    }

    /// True if this event is Error/Warning carrying the sentinel (engine-internal) context,
    /// which the router broadcasts to every active record regardless of submission tagging.
    pub fn is_broadcast_eligible(&self) -> bool {
        matches!(self, Event::Error { .. } | Event::Warning { .. })
            && self.submission_id().is_sentinel()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
