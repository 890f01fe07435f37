//! # Alert Evaluator
//!
//! Runs after every metrics update. Each rule is evaluated independently, so
//! a single event may raise several alerts. Alerts are never deduplicated.

use serde_json::json;

use crate::config::MonitorConfig;
use crate::models::{
    AlertSeverity, AlertType, AutomationAlert, AutomationEvent, AutomationMetrics,
    AutomationPerformanceDataPoint, EventKind, MonitoringThresholds,
};

use super::event_store::EventLog;

#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    /// Newest events inspected for a failure streak
    failure_window: usize,
    /// Executions required before the success rate is judged
    min_executions: u64,
}

impl AlertEvaluator {
    pub fn new(failure_window: usize, min_executions: u64) -> Self {
        Self {
            failure_window,
            min_executions,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.consecutive_failure_window,
            config.low_success_rate_min_executions,
        )
    }

    /// Evaluate the event-driven rules. `log` must already contain `event`.
    pub fn evaluate(
        &self,
        event: &AutomationEvent,
        metrics: &AutomationMetrics,
        log: &EventLog,
        thresholds: &MonitoringThresholds,
    ) -> Vec<AutomationAlert> {
        let automation_id = event.automation_id.as_str();
        let mut alerts = Vec::new();

        let failures = self.consecutive_failures(log);
        if failures >= thresholds.alert_on_consecutive_failures {
            alerts.push(
                AutomationAlert::new(
                    automation_id,
                    AlertSeverity::High,
                    AlertType::Failure,
                    "Consecutive failures detected",
                    format!(
                        "{automation_id} failed {failures} times in a row (threshold: {})",
                        thresholds.alert_on_consecutive_failures
                    ),
                )
                .with_metadata(json!({
                    "consecutive_failures": failures,
                    "threshold": thresholds.alert_on_consecutive_failures,
                })),
            );
        }

        if let Some(duration) = event
            .duration_ms
            .filter(|duration| *duration > thresholds.max_execution_time_ms)
        {
            alerts.push(
                AutomationAlert::new(
                    automation_id,
                    AlertSeverity::Medium,
                    AlertType::Performance,
                    "Execution time exceeded",
                    format!(
                        "{automation_id} took {duration}ms (threshold: {}ms)",
                        thresholds.max_execution_time_ms
                    ),
                )
                .with_metadata(json!({
                    "execution_time_ms": duration,
                    "threshold_ms": thresholds.max_execution_time_ms,
                })),
            );
        }

        if metrics.total_executions >= self.min_executions
            && metrics.success_rate < thresholds.min_success_rate
        {
            alerts.push(
                AutomationAlert::new(
                    automation_id,
                    AlertSeverity::High,
                    AlertType::Performance,
                    "Low success rate",
                    format!(
                        "{automation_id} success rate is {:.1}% (threshold: {:.1}%)",
                        metrics.success_rate, thresholds.min_success_rate
                    ),
                )
                .with_metadata(json!({
                    "success_rate": metrics.success_rate,
                    "threshold": thresholds.min_success_rate,
                    "total_executions": metrics.total_executions,
                })),
            );
        }

        if event.kind == EventKind::Timeout {
            alerts.push(
                AutomationAlert::new(
                    automation_id,
                    AlertSeverity::Medium,
                    AlertType::Timeout,
                    "Execution timed out",
                    event
                        .error
                        .clone()
                        .unwrap_or_else(|| format!("{automation_id} timed out: {}", event.message)),
                )
                .with_metadata(json!({
                    "event_id": event.id,
                    "duration_ms": event.duration_ms,
                })),
            );
        }

        alerts
    }

    /// Failures counted backward from the newest event until a successful
    /// completion or the end of the window
    pub fn consecutive_failures(&self, log: &EventLog) -> u32 {
        let mut failures = 0;
        for event in log.iter_newest_first().take(self.failure_window) {
            if event.is_successful_completion() {
                break;
            }
            if event.is_failure() {
                failures += 1;
            }
        }
        failures
    }

    /// Resource rule: one alert listing every limit the sample breaches
    pub fn evaluate_performance(
        &self,
        point: &AutomationPerformanceDataPoint,
        thresholds: &MonitoringThresholds,
    ) -> Option<AutomationAlert> {
        let limits = &thresholds.performance;
        let mut breaches = serde_json::Map::new();
        let mut descriptions = Vec::new();

        let checks = [
            ("memory_usage", point.memory_usage, limits.max_memory_usage, "MB"),
            ("cpu_usage", point.cpu_usage, limits.max_cpu_usage, "%"),
            (
                "network_latency",
                point.network_latency,
                limits.max_network_latency,
                "ms",
            ),
        ];
        for (name, observed, limit, unit) in checks {
            if let Some(observed) = observed.filter(|observed| *observed > limit) {
                breaches.insert(
                    name.to_string(),
                    json!({ "observed": observed, "threshold": limit }),
                );
                descriptions.push(format!("{name} {observed:.1}{unit} > {limit:.1}{unit}"));
            }
        }

        if breaches.is_empty() {
            return None;
        }

        Some(
            AutomationAlert::new(
                point.automation_id.as_str(),
                AlertSeverity::Medium,
                AlertType::Resource,
                "Resource limits exceeded",
                format!(
                    "{} exceeded resource limits: {}",
                    point.automation_id,
                    descriptions.join(", ")
                ),
            )
            .with_metadata(serde_json::Value::Object(breaches)),
        )
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventInput, EventStatus, PerformanceSample};
    use crate::monitoring::metrics_aggregator::MetricsAggregator;

    struct Harness {
        log: EventLog,
        metrics: AutomationMetrics,
        thresholds: MonitoringThresholds,
        evaluator: AlertEvaluator,
    }

    impl Harness {
        fn new(thresholds: MonitoringThresholds) -> Self {
            Self {
                log: EventLog::new(1000),
                metrics: AutomationMetrics::new("sync-a"),
                thresholds,
                evaluator: AlertEvaluator::default(),
            }
        }

        fn record(&mut self, input: EventInput) -> Vec<AutomationAlert> {
            let event = AutomationEvent::from_input(input);
            self.log.append(event.clone());
            MetricsAggregator::new().apply(&mut self.metrics, &event, Some(&self.thresholds));
            self.evaluator
                .evaluate(&event, &self.metrics, &self.log, &self.thresholds)
        }
    }

    fn input(kind: EventKind, status: EventStatus) -> EventInput {
        EventInput::new("sync-a", kind, status, "test")
    }

    #[test]
    fn test_consecutive_failures_raise_high_alert() {
        let mut harness = Harness::new(MonitoringThresholds::default());

        assert!(harness.record(input(EventKind::Failed, EventStatus::Failure)).is_empty());
        assert!(harness.record(input(EventKind::Failed, EventStatus::Failure)).is_empty());
        let alerts = harness.record(input(EventKind::Failed, EventStatus::Failure));

        let failure = alerts
            .iter()
            .find(|alert| alert.alert_type == AlertType::Failure)
            .expect("failure alert");
        assert_eq!(failure.severity, AlertSeverity::High);
        assert!(!failure.is_resolved);
        let metadata = failure.metadata.as_ref().unwrap();
        assert_eq!(metadata["consecutive_failures"], 3);
        assert_eq!(metadata["threshold"], 3);
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let mut harness = Harness::new(MonitoringThresholds::default());

        harness.record(input(EventKind::Failed, EventStatus::Failure));
        harness.record(input(EventKind::Failed, EventStatus::Failure));
        harness.record(input(EventKind::Completed, EventStatus::Success));
        let alerts = harness.record(input(EventKind::Failed, EventStatus::Failure));

        assert!(alerts.iter().all(|alert| alert.alert_type != AlertType::Failure));
        assert_eq!(harness.evaluator.consecutive_failures(&harness.log), 1);
    }

    #[test]
    fn test_non_terminal_events_do_not_break_streak() {
        let mut harness = Harness::new(MonitoringThresholds::default());

        harness.record(input(EventKind::Failed, EventStatus::Failure));
        harness.record(input(EventKind::Started, EventStatus::Info));
        harness.record(input(EventKind::Failed, EventStatus::Failure));
        harness.record(input(EventKind::Started, EventStatus::Info));
        let alerts = harness.record(input(EventKind::Completed, EventStatus::Failure));

        assert!(alerts.iter().any(|alert| alert.alert_type == AlertType::Failure));
    }

    #[test]
    fn test_failure_window_is_bounded() {
        let mut harness = Harness::new(MonitoringThresholds {
            alert_on_consecutive_failures: 11,
            ..Default::default()
        });
        for _ in 0..15 {
            harness.record(input(EventKind::Failed, EventStatus::Failure));
        }
        assert_eq!(harness.evaluator.consecutive_failures(&harness.log), 10);
    }

    #[test]
    fn test_execution_time_exceeded() {
        let mut harness = Harness::new(MonitoringThresholds {
            max_execution_time_ms: 1000,
            ..Default::default()
        });

        let alerts =
            harness.record(input(EventKind::Completed, EventStatus::Success).with_duration(2500));
        let slow = alerts
            .iter()
            .find(|alert| alert.alert_type == AlertType::Performance)
            .expect("performance alert");
        assert_eq!(slow.severity, AlertSeverity::Medium);
        let metadata = slow.metadata.as_ref().unwrap();
        assert_eq!(metadata["execution_time_ms"], 2500);
        assert_eq!(metadata["threshold_ms"], 1000);

        assert!(harness
            .record(input(EventKind::Completed, EventStatus::Success).with_duration(1000))
            .is_empty());
    }

    #[test]
    fn test_low_success_rate_needs_minimum_executions() {
        let mut harness = Harness::new(MonitoringThresholds {
            min_success_rate: 95.0,
            ..Default::default()
        });

        let mut last = Vec::new();
        for _ in 0..9 {
            last = harness.record(input(EventKind::Completed, EventStatus::Success));
            assert!(last.is_empty());
        }
        last.extend(harness.record(input(EventKind::Completed, EventStatus::Failure)));

        let low_rate = last
            .iter()
            .find(|alert| alert.title == "Low success rate")
            .expect("low success rate alert");
        assert_eq!(low_rate.severity, AlertSeverity::High);
        assert_eq!(low_rate.alert_type, AlertType::Performance);
        assert_eq!(low_rate.metadata.as_ref().unwrap()["success_rate"], 90.0);
    }

    #[test]
    fn test_timeout_event_raises_timeout_alert() {
        let mut harness = Harness::new(MonitoringThresholds::default());
        let alerts = harness.record(
            input(EventKind::Timeout, EventStatus::Warning).with_error("gateway did not respond"),
        );

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Timeout);
        assert_eq!(alerts[0].description, "gateway did not respond");
    }

    #[test]
    fn test_performance_sample_breaches() {
        let evaluator = AlertEvaluator::default();
        let thresholds = MonitoringThresholds::default();

        let within = AutomationPerformanceDataPoint::from_sample(
            PerformanceSample::new("sync-a", 100)
                .with_memory_usage(100.0)
                .with_cpu_usage(10.0),
        );
        assert!(evaluator.evaluate_performance(&within, &thresholds).is_none());

        let over = AutomationPerformanceDataPoint::from_sample(
            PerformanceSample::new("sync-a", 100)
                .with_memory_usage(1024.0)
                .with_network_latency(9000.0),
        );
        let alert = evaluator
            .evaluate_performance(&over, &thresholds)
            .expect("resource alert");
        assert_eq!(alert.alert_type, AlertType::Resource);
        let metadata = alert.metadata.unwrap();
        assert_eq!(metadata["memory_usage"]["observed"], 1024.0);
        assert!(metadata.get("network_latency").is_some());
        assert!(metadata.get("cpu_usage").is_none());
    }
}
