//! Read-only roll-up across every monitored automation, computed on demand.

use serde::{Deserialize, Serialize};

use crate::models::{AutomationAlert, AutomationHealthCheckResult, AutomationMetrics, HealthState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub automation_id: String,
    pub health: HealthState,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub total_automations: usize,
    pub healthy_automations: usize,
    /// Unresolved alerts of any severity
    pub active_alerts: usize,
    pub average_success_rate: f64,
    /// Oldest unresolved high and critical alerts
    pub recent_alerts: Vec<AutomationAlert>,
    pub health_checks: Vec<HealthSummary>,
}

impl DashboardData {
    /// `unresolved_alerts` must be in insertion order
    pub fn build(
        metrics: &[AutomationMetrics],
        unresolved_alerts: &[AutomationAlert],
        health_checks: &[AutomationHealthCheckResult],
        alert_limit: usize,
    ) -> Self {
        let average_success_rate = if metrics.is_empty() {
            0.0
        } else {
            metrics.iter().map(|m| m.success_rate).sum::<f64>() / metrics.len() as f64
        };

        Self {
            total_automations: metrics.len(),
            healthy_automations: metrics
                .iter()
                .filter(|m| m.health == HealthState::Healthy)
                .count(),
            active_alerts: unresolved_alerts.len(),
            average_success_rate,
            recent_alerts: unresolved_alerts
                .iter()
                .filter(|a| a.severity.is_urgent())
                .take(alert_limit)
                .cloned()
                .collect(),
            health_checks: health_checks
                .iter()
                .map(|check| HealthSummary {
                    automation_id: check.automation_id.clone(),
                    health: check.overall_health,
                    score: check.score,
                })
                .collect(),
        }
    }
}
