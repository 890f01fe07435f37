//! Automation lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Lifecycle transition reported by an automation runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Started,
    Completed,
    Failed,
    Paused,
    Resumed,
    Timeout,
    Retry,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Started => "started",
            EventKind::Completed => "completed",
            EventKind::Failed => "failed",
            EventKind::Paused => "paused",
            EventKind::Resumed => "resumed",
            EventKind::Timeout => "timeout",
            EventKind::Retry => "retry",
        };
        write!(f, "{name}")
    }
}

/// Outcome attached to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Success,
    Failure,
    Warning,
    Info,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventStatus::Success => "success",
            EventStatus::Failure => "failure",
            EventStatus::Warning => "warning",
            EventStatus::Info => "info",
        };
        write!(f, "{name}")
    }
}

/// One observed lifecycle occurrence for one automation.
///
/// Events are immutable once stored; the engine hands out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationEvent {
    pub id: Uuid,
    pub automation_id: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    /// Execution duration in milliseconds
    pub duration_ms: Option<u64>,
    pub status: EventStatus,
    pub message: String,
    pub metadata: Option<Value>,
    pub error: Option<String>,
    pub retry_count: Option<u32>,
}

impl AutomationEvent {
    /// Stamp an input with a fresh id and the current time
    pub fn from_input(input: EventInput) -> Self {
        Self::from_input_at(input, Utc::now())
    }

    pub fn from_input_at(input: EventInput, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            automation_id: input.automation_id,
            kind: input.kind,
            timestamp,
            duration_ms: input.duration_ms,
            status: input.status,
            message: input.message,
            metadata: input.metadata,
            error: input.error,
            retry_count: input.retry_count,
        }
    }

    /// `completed` with `success` status
    pub fn is_successful_completion(&self) -> bool {
        self.kind == EventKind::Completed && self.status == EventStatus::Success
    }

    /// Counts toward the failed-execution counter
    pub fn is_failed_execution(&self) -> bool {
        self.kind == EventKind::Failed
            || (self.kind == EventKind::Completed && self.status != EventStatus::Success)
    }

    /// Counts toward a run of consecutive failures
    pub fn is_failure(&self) -> bool {
        self.kind == EventKind::Failed || self.status == EventStatus::Failure
    }
}

/// Event as submitted by a collaborator, before id and timestamp are assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInput {
    pub automation_id: String,
    pub kind: EventKind,
    pub status: EventStatus,
    pub message: String,
    pub duration_ms: Option<u64>,
    pub metadata: Option<Value>,
    pub error: Option<String>,
    pub retry_count: Option<u32>,
}

impl EventInput {
    pub fn new(
        automation_id: impl Into<String>,
        kind: EventKind,
        status: EventStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            automation_id: automation_id.into(),
            kind,
            status,
            message: message.into(),
            duration_ms: None,
            metadata: None,
            error: None,
            retry_count: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }
}
