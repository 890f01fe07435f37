//! Raised alert conditions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// Severities surfaced on the dashboard
    pub fn is_urgent(&self) -> bool {
        matches!(self, AlertSeverity::High | AlertSeverity::Critical)
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Failure,
    Timeout,
    Performance,
    Quota,
    Dependency,
    Resource,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertType::Failure => "failure",
            AlertType::Timeout => "timeout",
            AlertType::Performance => "performance",
            AlertType::Quota => "quota",
            AlertType::Dependency => "dependency",
            AlertType::Resource => "resource",
        };
        write!(f, "{name}")
    }
}

/// A raised threshold breach. Alerts are never deleted, only acknowledged
/// and/or resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationAlert {
    pub id: Uuid,
    pub automation_id: String,
    pub severity: AlertSeverity,
    pub alert_type: AlertType,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub metadata: Option<Value>,
    /// Global insertion order, assigned when the alert is stored
    #[serde(skip)]
    pub(crate) sequence: u64,
}

impl AutomationAlert {
    pub fn new(
        automation_id: impl Into<String>,
        severity: AlertSeverity,
        alert_type: AlertType,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            automation_id: automation_id.into(),
            severity,
            alert_type,
            title: title.into(),
            description: description.into(),
            timestamp: Utc::now(),
            is_resolved: false,
            resolved_at: None,
            acknowledged_at: None,
            metadata: None,
            sequence: 0,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged_at.is_some()
    }

    /// Record the first acknowledgement; later calls keep the original time
    pub fn acknowledge(&mut self, at: DateTime<Utc>) {
        if self.acknowledged_at.is_none() {
            self.acknowledged_at = Some(at);
        }
    }

    /// Mark resolved; resolving twice keeps the original resolution time
    pub fn resolve(&mut self, at: DateTime<Utc>) {
        if !self.is_resolved {
            self.is_resolved = true;
            self.resolved_at = Some(at);
        }
    }
}
