//! # Health Checks
//!
//! Periodic composite health scoring, independent of event traffic.
//!
//! [`HealthChecker`] turns an automation's metrics and thresholds into an
//! [`AutomationHealthCheckResult`]. [`HealthCheckScheduler`] runs a tick on a
//! fixed interval in a dedicated tokio task until it is stopped.
//!
//! Connectivity, dependency and resource probing are deployment specific and
//! sit behind [`HealthProbe`]; [`StaticHealthProbe`] reports every probe healthy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::constants::{recommendations, DEGRADED_SCORE, HEALTHY_SCORE, HEALTH_CHECK_COUNT};
use crate::error::{MonitorError, Result};
use crate::models::{
    AutomationHealthCheckResult, AutomationMetrics, HealthChecks, HealthState,
    MonitoringThresholds,
};

/// External probes consulted by each health check
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check_connectivity(&self, _automation_id: &str) -> bool {
        true
    }

    async fn check_dependencies(&self, _automation_id: &str) -> bool {
        true
    }

    async fn check_resources(&self, _automation_id: &str) -> bool {
        true
    }
}

/// Reports every probe as passing
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticHealthProbe;

#[async_trait]
impl HealthProbe for StaticHealthProbe {}

pub struct HealthChecker {
    probe: Arc<dyn HealthProbe>,
    interval: Duration,
}

impl std::fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthChecker")
            .field("interval", &self.interval)
            .finish()
    }
}

impl HealthChecker {
    pub fn new(probe: Arc<dyn HealthProbe>, interval: Duration) -> Self {
        Self { probe, interval }
    }

    pub async fn check(
        &self,
        metrics: &AutomationMetrics,
        thresholds: &MonitoringThresholds,
    ) -> AutomationHealthCheckResult {
        let automation_id = metrics.automation_id.as_str();
        let checks = HealthChecks {
            connectivity: self.probe.check_connectivity(automation_id).await,
            performance: metrics.average_execution_time_ms
                < thresholds.max_execution_time_ms as f64,
            error_rate: metrics.success_rate >= thresholds.min_success_rate,
            dependencies: self.probe.check_dependencies(automation_id).await,
            resources: self.probe.check_resources(automation_id).await,
        };

        self.result_for(automation_id, checks, Utc::now())
    }

    fn result_for(
        &self,
        automation_id: &str,
        checks: HealthChecks,
        now: DateTime<Utc>,
    ) -> AutomationHealthCheckResult {
        let score = health_score(&checks);
        let next_check_at = chrono::Duration::from_std(self.interval)
            .map(|interval| now + interval)
            .unwrap_or(now);

        AutomationHealthCheckResult {
            automation_id: automation_id.to_string(),
            timestamp: now,
            overall_health: overall_health(&checks, score),
            checks,
            score,
            recommendations: recommendations_for(&checks),
            next_check_at,
        }
    }
}

/// `round(100 * passed / 5)`
pub fn health_score(checks: &HealthChecks) -> u8 {
    (100.0 * f64::from(checks.passed()) / f64::from(HEALTH_CHECK_COUNT)).round() as u8
}

/// Score bands, except that any failing check caps the result at degraded
pub fn overall_health(checks: &HealthChecks, score: u8) -> HealthState {
    if score >= HEALTHY_SCORE && checks.all_passed() {
        HealthState::Healthy
    } else if score >= DEGRADED_SCORE {
        HealthState::Degraded
    } else {
        HealthState::Critical
    }
}

fn recommendations_for(checks: &HealthChecks) -> Vec<String> {
    [
        (checks.performance, recommendations::OPTIMIZE_PERFORMANCE),
        (checks.error_rate, recommendations::FIX_RECURRING_ERRORS),
        (checks.dependencies, recommendations::CHECK_DEPENDENCIES),
        (checks.resources, recommendations::REVIEW_RESOURCES),
    ]
    .into_iter()
    .filter(|(passed, _)| !passed)
    .map(|(_, recommendation)| recommendation.to_string())
    .collect()
}

/// Background ticker with an explicit cancellation handle
#[derive(Debug)]
pub struct HealthCheckScheduler {
    interval: Duration,
    shutdown: Arc<Notify>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl HealthCheckScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            shutdown: Arc::new(Notify::new()),
            handle: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Spawn the ticker. `tick` runs once per interval, first after one
    /// full interval has elapsed.
    pub fn start<F, Fut>(&self, tick: F) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| MonitorError::RuntimeUnavailable(e.to_string()))?;

        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(MonitorError::Scheduler(
                "health check scheduler is already running".to_string(),
            ));
        }

        let interval = self.interval;
        let shutdown = Arc::clone(&self.shutdown);
        *handle = Some(runtime.spawn(async move {
            info!(
                interval_seconds = interval.as_secs(),
                "HEALTH: health check scheduler started"
            );
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        debug!("HEALTH: running scheduled health checks");
                        tick().await;
                    }
                    _ = shutdown.notified() => {
                        info!("HEALTH: health check scheduler shutting down");
                        break;
                    }
                }
            }
        }));
        Ok(())
    }

    /// Signal the ticker to stop and wait for it, up to `timeout`. A ticker
    /// still running after `timeout` is aborted.
    pub async fn stop(&self, timeout: Duration) -> Result<()> {
        let Some(mut handle) = self.handle.lock().take() else {
            return Ok(());
        };

        // notify_one stores a permit if the task is mid-tick
        self.shutdown.notify_one();

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!(error = %e, "HEALTH: health check scheduler task failed");
                Err(MonitorError::Scheduler(e.to_string()))
            }
            Err(_) => {
                handle.abort();
                error!(
                    timeout_ms = timeout.as_millis() as u64,
                    "HEALTH: health check scheduler did not stop in time, aborted"
                );
                Err(MonitorError::Scheduler(format!(
                    "health check scheduler did not stop within {}ms",
                    timeout.as_millis()
                )))
            }
        }
    }
}

impl Drop for HealthCheckScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}
