//! # Automation Monitor
//!
//! The monitoring engine service. Owns every store and wires ingestion
//! through the aggregator, the evaluator and the notification bus.
//!
//! ## Ingestion path
//!
//! `record_event` runs as one atomic step per automation: the event is
//! appended, the metrics are updated and any raised alerts are stored while
//! the automation's record entry is locked. Only then is the event handed to
//! subscribers. Lock order is always record, then alert store.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use automation_monitor::{AutomationMonitor, EventInput, EventKind, EventStatus, MonitorConfig};
//!
//! # async fn example() -> automation_monitor::Result<()> {
//! let monitor = AutomationMonitor::new(MonitorConfig::default());
//! monitor.start()?;
//!
//! monitor.record_event(
//!     EventInput::new("invoice-sync", EventKind::Completed, EventStatus::Success, "synced")
//!         .with_duration(1200),
//! );
//! let dashboard = monitor.dashboard_data();
//! println!("{} automations monitored", dashboard.total_automations);
//!
//! monitor.stop().await?;
//! # Ok(())
//! # }
//! ```

use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::constants::SCHEDULER_SHUTDOWN_TIMEOUT_SECONDS;
use crate::error::Result;
use crate::models::{
    AutomationAlert, AutomationEvent, AutomationHealthCheckResult, AutomationMetrics,
    AutomationPerformanceDataPoint, EventInput, MonitoringThresholds, PerformanceSample,
    ThresholdsUpdate,
};

use super::alert_evaluator::AlertEvaluator;
use super::alert_store::AlertStore;
use super::dashboard::DashboardData;
use super::event_store::{window_start, EventLog};
use super::health_check::{HealthCheckScheduler, HealthChecker, HealthProbe, StaticHealthProbe};
use super::metrics_aggregator::{derive_health, MetricsAggregator};
use super::notification_bus::{
    EventSubscriber, FnSubscriber, NotificationBus, NotificationBusConfig, SubscriberError,
    Subscription, SubscriptionStats,
};

/// Event log and running metrics of one automation, locked together
#[derive(Debug)]
struct AutomationRecord {
    events: EventLog,
    metrics: AutomationMetrics,
}

impl AutomationRecord {
    fn new(automation_id: &str, capacity: usize) -> Self {
        Self {
            events: EventLog::new(capacity),
            metrics: AutomationMetrics::new(automation_id),
        }
    }
}

/// State shared between the service handle and the scheduler task
struct MonitorState {
    config: MonitorConfig,
    records: DashMap<String, AutomationRecord>,
    thresholds: DashMap<String, MonitoringThresholds>,
    alerts: AlertStore,
    performance: DashMap<String, VecDeque<AutomationPerformanceDataPoint>>,
    health_checks: DashMap<String, AutomationHealthCheckResult>,
    aggregator: MetricsAggregator,
    evaluator: AlertEvaluator,
    health_checker: HealthChecker,
    alert_stream: broadcast::Sender<AutomationAlert>,
}

impl MonitorState {
    /// Stored thresholds, creating them from the defaults on first use when
    /// `auto_default_thresholds` is set
    fn resolve_thresholds(&self, automation_id: &str) -> Option<MonitoringThresholds> {
        if let Some(thresholds) = self.thresholds.get(automation_id) {
            return Some(thresholds.value().clone());
        }
        if !self.config.auto_default_thresholds {
            return None;
        }

        let thresholds = self
            .thresholds
            .entry(automation_id.to_string())
            .or_insert_with(|| self.config.default_thresholds.clone())
            .value()
            .clone();
        debug!(
            automation_id = automation_id,
            "Default thresholds assigned to automation"
        );
        Some(thresholds)
    }

    fn store_alerts(&self, raised: Vec<AutomationAlert>) -> Vec<AutomationAlert> {
        raised
            .into_iter()
            .map(|alert| self.alerts.push(alert))
            .collect()
    }

    fn announce_alerts(&self, alerts: &[AutomationAlert]) {
        for alert in alerts {
            warn!(
                automation_id = %alert.automation_id,
                alert_id = %alert.id,
                severity = %alert.severity,
                alert_type = %alert.alert_type,
                title = %alert.title,
                "Alert raised"
            );
            // No receivers is the common case
            let _ = self.alert_stream.send(alert.clone());
        }
    }

    async fn run_health_checks(&self) -> Vec<AutomationHealthCheckResult> {
        let snapshot: Vec<AutomationMetrics> = self
            .records
            .iter()
            .map(|record| record.value().metrics.clone())
            .collect();

        let mut results = Vec::with_capacity(snapshot.len());
        for metrics in snapshot {
            let thresholds = self
                .thresholds
                .get(&metrics.automation_id)
                .map(|thresholds| thresholds.value().clone())
                .unwrap_or_else(|| self.config.default_thresholds.clone());

            let result = self.health_checker.check(&metrics, &thresholds).await;
            debug!(
                automation_id = %result.automation_id,
                score = result.score,
                health = %result.overall_health,
                "Health check completed"
            );
            self.health_checks
                .insert(result.automation_id.clone(), result.clone());
            results.push(result);
        }

        info!(
            automations_checked = results.len(),
            degraded_or_worse = results
                .iter()
                .filter(|result| result.overall_health.needs_attention())
                .count(),
            "HEALTH: health check tick finished"
        );
        results
    }
}

/// Monitoring and alerting engine for independently running automations
pub struct AutomationMonitor {
    state: Arc<MonitorState>,
    bus: Arc<NotificationBus>,
    scheduler: HealthCheckScheduler,
}

impl std::fmt::Debug for AutomationMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationMonitor")
            .field("automations", &self.state.records.len())
            .field("bus", &self.bus)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl AutomationMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_probe(config, Arc::new(StaticHealthProbe))
    }

    /// Create a monitor whose health checks consult `probe`
    pub fn with_probe(config: MonitorConfig, probe: Arc<dyn HealthProbe>) -> Self {
        let interval = config.health_check_interval();
        let bus = Arc::new(NotificationBus::new(NotificationBusConfig {
            buffer_size: config.subscriber_buffer_size,
            subscriber_timeout: config.subscriber_timeout(),
            broadcast_capacity: config.broadcast_capacity,
        }));
        let (alert_stream, _) = broadcast::channel(config.broadcast_capacity.max(1));

        let state = Arc::new(MonitorState {
            records: DashMap::new(),
            thresholds: DashMap::new(),
            alerts: AlertStore::new(),
            performance: DashMap::new(),
            health_checks: DashMap::new(),
            aggregator: MetricsAggregator::new(),
            evaluator: AlertEvaluator::from_config(&config),
            health_checker: HealthChecker::new(probe, interval),
            alert_stream,
            config,
        });

        Self {
            state,
            bus,
            scheduler: HealthCheckScheduler::new(interval),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.state.config
    }

    /// Start the periodic health check scheduler on the current runtime
    pub fn start(&self) -> Result<()> {
        let state = Arc::clone(&self.state);
        self.scheduler.start(move || {
            let state = Arc::clone(&state);
            async move {
                state.run_health_checks().await;
            }
        })?;
        info!(
            interval_seconds = self.scheduler.interval().as_secs(),
            "🚀 MONITOR: Automation monitor started"
        );
        Ok(())
    }

    /// Stop the scheduler and wait for it to finish
    pub async fn stop(&self) -> Result<()> {
        if !self.scheduler.is_running() {
            info!("MONITOR: Already stopped");
            return Ok(());
        }
        info!("🛑 MONITOR: Stopping automation monitor");
        self.scheduler
            .stop(Duration::from_secs(SCHEDULER_SHUTDOWN_TIMEOUT_SECONDS))
            .await?;
        info!("✅ MONITOR: Automation monitor stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Ingest one lifecycle event. Never fails.
    pub fn record_event(&self, input: EventInput) -> AutomationEvent {
        let state = &self.state;
        let automation_id = input.automation_id.clone();
        let thresholds = state.resolve_thresholds(&automation_id);

        let (event, raised) = {
            let mut record = state
                .records
                .entry(automation_id.clone())
                .or_insert_with(|| {
                    AutomationRecord::new(&automation_id, state.config.max_events_per_automation)
                });
            let AutomationRecord { events, metrics } = &mut *record;

            // Timestamped under the entry lock so log order is temporal order
            let event = AutomationEvent::from_input(input);
            events.append(event.clone());
            state
                .aggregator
                .apply(metrics, &event, thresholds.as_ref());

            let raised = match &thresholds {
                Some(thresholds) => state.evaluator.evaluate(&event, metrics, events, thresholds),
                None => Vec::new(),
            };
            (event, state.store_alerts(raised))
        };

        debug!(
            automation_id = %event.automation_id,
            event_id = %event.id,
            kind = %event.kind,
            status = %event.status,
            alerts_raised = raised.len(),
            "Automation event recorded"
        );
        state.announce_alerts(&raised);
        self.bus.publish(&event);
        event
    }

    /// Store a performance sample, raising a resource alert when it breaches
    /// the automation's limits. Never fails.
    pub fn record_performance_data(&self, sample: PerformanceSample) -> AutomationPerformanceDataPoint {
        let state = &self.state;
        let point = AutomationPerformanceDataPoint::from_sample(sample);

        {
            let mut points = state
                .performance
                .entry(point.automation_id.clone())
                .or_default();
            points.push_back(point.clone());
            while points.len() > state.config.max_performance_points.max(1) {
                points.pop_front();
            }
        }

        if state.config.resource_alerts_enabled {
            let raised = state
                .resolve_thresholds(&point.automation_id)
                .and_then(|thresholds| state.evaluator.evaluate_performance(&point, &thresholds));
            if let Some(alert) = raised {
                let stored = state.store_alerts(vec![alert]);
                state.announce_alerts(&stored);
            }
        }

        debug!(
            automation_id = %point.automation_id,
            execution_time_ms = point.execution_time_ms,
            "Performance sample recorded"
        );
        point
    }

    /// Merge a partial update onto the automation's thresholds (or the
    /// defaults), validate and store the result
    pub fn set_thresholds(
        &self,
        automation_id: &str,
        update: ThresholdsUpdate,
    ) -> Result<MonitoringThresholds> {
        let state = &self.state;
        let current = state
            .thresholds
            .get(automation_id)
            .map(|thresholds| thresholds.value().clone())
            .unwrap_or_else(|| state.config.default_thresholds.clone());

        let merged = current.merged(&update);
        merged.validate()?;
        state
            .thresholds
            .insert(automation_id.to_string(), merged.clone());

        if let Some(mut record) = state.records.get_mut(automation_id) {
            record.metrics.health = derive_health(&record.metrics, Some(&merged));
        }

        info!(
            automation_id = automation_id,
            max_execution_time_ms = merged.max_execution_time_ms,
            min_success_rate = merged.min_success_rate,
            alert_on_consecutive_failures = merged.alert_on_consecutive_failures,
            "Monitoring thresholds updated"
        );
        Ok(merged)
    }

    pub fn thresholds(&self, automation_id: &str) -> Option<MonitoringThresholds> {
        self.state
            .thresholds
            .get(automation_id)
            .map(|thresholds| thresholds.value().clone())
    }

    pub fn metrics(&self, automation_id: &str) -> Option<AutomationMetrics> {
        self.state
            .records
            .get(automation_id)
            .map(|record| record.metrics.clone())
    }

    /// Every metrics record, ordered by automation id
    pub fn all_metrics(&self) -> Vec<AutomationMetrics> {
        let mut metrics: Vec<AutomationMetrics> = self
            .state
            .records
            .iter()
            .map(|record| record.value().metrics.clone())
            .collect();
        metrics.sort_by(|a, b| a.automation_id.cmp(&b.automation_id));
        metrics
    }

    /// The newest `limit` events (all when `None`), oldest first
    pub fn events(&self, automation_id: &str, limit: Option<usize>) -> Vec<AutomationEvent> {
        self.state
            .records
            .get(automation_id)
            .map(|record| record.events.latest(limit))
            .unwrap_or_default()
    }

    pub fn recent_events(&self, automation_id: &str, window_minutes: i64) -> Vec<AutomationEvent> {
        self.state
            .records
            .get(automation_id)
            .map(|record| record.events.within_minutes(Utc::now(), window_minutes))
            .unwrap_or_default()
    }

    /// Alerts in the order they were raised
    pub fn alerts(&self, automation_id: Option<&str>, unresolved_only: bool) -> Vec<AutomationAlert> {
        self.state.alerts.list(automation_id, unresolved_only)
    }

    pub fn acknowledge_alert(&self, alert_id: Uuid) -> Result<AutomationAlert> {
        let alert = self.state.alerts.acknowledge(alert_id)?;
        info!(
            automation_id = %alert.automation_id,
            alert_id = %alert.id,
            "Alert acknowledged"
        );
        Ok(alert)
    }

    pub fn resolve_alert(&self, alert_id: Uuid) -> Result<AutomationAlert> {
        let alert = self.state.alerts.resolve(alert_id)?;
        info!(
            automation_id = %alert.automation_id,
            alert_id = %alert.id,
            "Alert resolved"
        );
        Ok(alert)
    }

    /// Latest health check result per automation, ordered by automation id
    pub fn health_checks(&self) -> Vec<AutomationHealthCheckResult> {
        let mut results: Vec<AutomationHealthCheckResult> = self
            .state
            .health_checks
            .iter()
            .map(|result| result.value().clone())
            .collect();
        results.sort_by(|a, b| a.automation_id.cmp(&b.automation_id));
        results
    }

    pub fn health_check(&self, automation_id: &str) -> Option<AutomationHealthCheckResult> {
        self.state
            .health_checks
            .get(automation_id)
            .map(|result| result.value().clone())
    }

    /// Run one health check tick immediately
    pub async fn run_health_checks(&self) -> Vec<AutomationHealthCheckResult> {
        self.state.run_health_checks().await
    }

    /// Samples from the last `hours_window` hours, oldest first. A window
    /// reaching past the representable range returns every sample.
    pub fn performance_data(
        &self,
        automation_id: &str,
        hours_window: i64,
    ) -> Vec<AutomationPerformanceDataPoint> {
        self.state
            .performance
            .get(automation_id)
            .map(|points| {
                let cutoff = window_start(Utc::now(), TimeDelta::try_hours(hours_window));
                points
                    .iter()
                    .filter(|point| cutoff.map_or(true, |cutoff| point.timestamp >= cutoff))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn subscribe(
        &self,
        automation_id: &str,
        subscriber: Arc<dyn EventSubscriber>,
    ) -> Result<Subscription> {
        self.bus.subscribe(automation_id, subscriber)
    }

    /// Subscribe a synchronous closure. It runs on the blocking pool, so a
    /// slow closure costs a timeout but never stalls the runtime.
    pub fn subscribe_fn<F>(&self, automation_id: &str, name: &str, callback: F) -> Result<Subscription>
    where
        F: Fn(&AutomationEvent) -> std::result::Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.subscribe(automation_id, Arc::new(FnSubscriber::new(name, callback)))
    }

    /// Every accepted event, across automations
    pub fn event_stream(&self) -> broadcast::Receiver<AutomationEvent> {
        self.bus.event_stream()
    }

    /// Every raised alert, across automations
    pub fn alert_stream(&self) -> broadcast::Receiver<AutomationAlert> {
        self.state.alert_stream.subscribe()
    }

    pub fn subscription_stats(&self) -> Vec<SubscriptionStats> {
        self.bus.stats()
    }

    /// Dashboard roll-up, computed on every call
    pub fn dashboard_data(&self) -> DashboardData {
        DashboardData::build(
            &self.all_metrics(),
            &self.state.alerts.list(None, true),
            &self.health_checks(),
            self.state.config.dashboard_alert_limit,
        )
    }
}

impl Default for AutomationMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}
