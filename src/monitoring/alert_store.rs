//! Append-only alert history per automation, with an id index for
//! acknowledge/resolve.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::error::{MonitorError, Result};
use crate::models::AutomationAlert;

#[derive(Debug, Default)]
pub struct AlertStore {
    by_automation: DashMap<String, Vec<AutomationAlert>>,
    index: DashMap<Uuid, String>,
    sequence: AtomicU64,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an alert, stamping its global insertion order
    pub fn push(&self, mut alert: AutomationAlert) -> AutomationAlert {
        alert.sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.index.insert(alert.id, alert.automation_id.clone());
        self.by_automation
            .entry(alert.automation_id.clone())
            .or_default()
            .push(alert.clone());
        alert
    }

    /// Alerts for one automation (or all), oldest first
    pub fn list(&self, automation_id: Option<&str>, unresolved_only: bool) -> Vec<AutomationAlert> {
        let mut alerts: Vec<AutomationAlert> = match automation_id {
            Some(id) => self
                .by_automation
                .get(id)
                .map(|alerts| alerts.clone())
                .unwrap_or_default(),
            None => self
                .by_automation
                .iter()
                .flat_map(|entry| entry.value().clone())
                .collect(),
        };
        if unresolved_only {
            alerts.retain(|alert| !alert.is_resolved);
        }
        alerts.sort_by_key(|alert| alert.sequence);
        alerts
    }

    pub fn acknowledge(&self, alert_id: Uuid) -> Result<AutomationAlert> {
        let now = Utc::now();
        self.update(alert_id, |alert| alert.acknowledge(now))
    }

    pub fn resolve(&self, alert_id: Uuid) -> Result<AutomationAlert> {
        let now = Utc::now();
        self.update(alert_id, |alert| alert.resolve(now))
    }

    fn update<F>(&self, alert_id: Uuid, apply: F) -> Result<AutomationAlert>
    where
        F: FnOnce(&mut AutomationAlert),
    {
        let automation_id = self
            .index
            .get(&alert_id)
            .map(|entry| entry.value().clone())
            .ok_or(MonitorError::AlertNotFound(alert_id))?;

        let mut alerts = self
            .by_automation
            .get_mut(&automation_id)
            .ok_or(MonitorError::AlertNotFound(alert_id))?;
        let alert = alerts
            .iter_mut()
            .find(|alert| alert.id == alert_id)
            .ok_or(MonitorError::AlertNotFound(alert_id))?;

        apply(alert);
        Ok(alert.clone())
    }
}
