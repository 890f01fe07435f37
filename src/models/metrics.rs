//! Rolling per-automation execution statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational state of an automation as seen from its latest event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationStatus {
    Active,
    Paused,
    Failed,
    Idle,
}

/// Qualitative health indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Critical,
    Unknown,
}

impl HealthState {
    pub fn needs_attention(&self) -> bool {
        matches!(self, HealthState::Degraded | HealthState::Critical)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HealthState::Healthy => "healthy",
            HealthState::Degraded => "degraded",
            HealthState::Critical => "critical",
            HealthState::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationMetrics {
    pub automation_id: String,
    pub automation_name: String,
    pub total_executions: u64,
    pub successful_executions: u64,
    pub failed_executions: u64,
    /// Percent, 0-100
    pub success_rate: f64,
    /// Cumulative duration of successful completions, milliseconds
    pub total_execution_time_ms: u64,
    pub average_execution_time_ms: f64,
    pub last_executed: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub error_count: u64,
    pub warning_count: u64,
    pub retry_count: u64,
    pub status: AutomationStatus,
    /// Percent of executions that did not fail
    pub uptime_percentage: f64,
    pub health: HealthState,
}

impl AutomationMetrics {
    /// Fresh record with all counters at zero
    pub fn new(automation_id: impl Into<String>) -> Self {
        let automation_id = automation_id.into();
        Self {
            automation_name: automation_id.clone(),
            automation_id,
            total_executions: 0,
            successful_executions: 0,
            failed_executions: 0,
            success_rate: 0.0,
            total_execution_time_ms: 0,
            average_execution_time_ms: 0.0,
            last_executed: None,
            last_success: None,
            last_failure: None,
            error_count: 0,
            warning_count: 0,
            retry_count: 0,
            status: AutomationStatus::Idle,
            uptime_percentage: 0.0,
            health: HealthState::Unknown,
        }
    }
}
