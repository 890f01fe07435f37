//! # Metrics Aggregator
//!
//! Folds each stored event into the automation's running statistics and
//! derives its health from the configured thresholds.

use crate::constants::CRITICAL_SUCCESS_RATE_MARGIN;
use crate::models::{
    AutomationEvent, AutomationMetrics, AutomationStatus, EventKind, EventStatus, HealthState,
    MonitoringThresholds,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsAggregator;

impl MetricsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Apply one event to `metrics`. `thresholds` is `None` when the
    /// automation has none configured, which leaves health `Unknown`.
    pub fn apply(
        &self,
        metrics: &mut AutomationMetrics,
        event: &AutomationEvent,
        thresholds: Option<&MonitoringThresholds>,
    ) {
        metrics.total_executions += 1;
        metrics.last_executed = Some(event.timestamp);

        if event.is_successful_completion() {
            metrics.successful_executions += 1;
            metrics.last_success = Some(event.timestamp);
            if let Some(duration) = event.duration_ms {
                metrics.total_execution_time_ms =
                    metrics.total_execution_time_ms.saturating_add(duration);
            }
        } else if event.is_failed_execution() {
            metrics.failed_executions += 1;
            metrics.last_failure = Some(event.timestamp);
            if event.kind == EventKind::Failed {
                metrics.error_count += 1;
            }
        }

        if event.status == EventStatus::Warning {
            metrics.warning_count += 1;
        }

        if let Some(retries) = event.retry_count.filter(|count| *count > 0) {
            metrics.retry_count += u64::from(retries);
        }

        metrics.status = status_after(event.kind);
        metrics.average_execution_time_ms =
            ratio(metrics.total_execution_time_ms as f64, metrics.total_executions);
        metrics.success_rate = success_rate(metrics.successful_executions, metrics.total_executions);
        metrics.uptime_percentage = success_rate(
            metrics.total_executions - metrics.failed_executions,
            metrics.total_executions,
        );
        metrics.health = derive_health(metrics, thresholds);
    }
}

/// `100 * part / total`, or 0 when there are no executions
pub fn success_rate(part: u64, total: u64) -> f64 {
    ratio(part as f64 * 100.0, total)
}

fn ratio(numerator: f64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        numerator / total as f64
    }
}

fn status_after(kind: EventKind) -> AutomationStatus {
    match kind {
        EventKind::Started | EventKind::Resumed | EventKind::Retry => AutomationStatus::Active,
        EventKind::Paused => AutomationStatus::Paused,
        EventKind::Failed | EventKind::Timeout => AutomationStatus::Failed,
        EventKind::Completed => AutomationStatus::Idle,
    }
}

/// Health from success rate and error count
pub fn derive_health(
    metrics: &AutomationMetrics,
    thresholds: Option<&MonitoringThresholds>,
) -> HealthState {
    let Some(thresholds) = thresholds else {
        return HealthState::Unknown;
    };

    if metrics.success_rate < thresholds.min_success_rate - CRITICAL_SUCCESS_RATE_MARGIN {
        HealthState::Critical
    } else if metrics.success_rate < thresholds.min_success_rate
        || metrics.error_count > 2 * u64::from(thresholds.max_retry_count)
    {
        HealthState::Degraded
    } else {
        HealthState::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventInput;

    fn event(kind: EventKind, status: EventStatus) -> AutomationEvent {
        AutomationEvent::from_input(EventInput::new("sync-a", kind, status, "test"))
    }

    #[test]
    fn test_successful_completion_updates_counters() {
        let aggregator = MetricsAggregator::new();
        let thresholds = MonitoringThresholds::default();
        let mut metrics = AutomationMetrics::new("sync-a");

        let completed = AutomationEvent::from_input(
            EventInput::new("sync-a", EventKind::Completed, EventStatus::Success, "ok")
                .with_duration(400),
        );
        aggregator.apply(&mut metrics, &completed, Some(&thresholds));

        assert_eq!(metrics.total_executions, 1);
        assert_eq!(metrics.successful_executions, 1);
        assert_eq!(metrics.total_execution_time_ms, 400);
        assert_eq!(metrics.average_execution_time_ms, 400.0);
        assert_eq!(metrics.success_rate, 100.0);
        assert_eq!(metrics.last_success, Some(completed.timestamp));
        assert_eq!(metrics.status, AutomationStatus::Idle);
        assert_eq!(metrics.health, HealthState::Healthy);
    }

    #[test]
    fn test_failed_event_counts_error() {
        let aggregator = MetricsAggregator::new();
        let mut metrics = AutomationMetrics::new("sync-a");

        aggregator.apply(&mut metrics, &event(EventKind::Failed, EventStatus::Failure), None);
        aggregator.apply(
            &mut metrics,
            &event(EventKind::Completed, EventStatus::Failure),
            None,
        );

        assert_eq!(metrics.failed_executions, 2);
        assert_eq!(metrics.error_count, 1);
        assert!(metrics.last_failure.is_some());
        assert_eq!(metrics.uptime_percentage, 0.0);
        assert_eq!(metrics.health, HealthState::Unknown);
    }

    #[test]
    fn test_warning_and_retry_counters() {
        let aggregator = MetricsAggregator::new();
        let mut metrics = AutomationMetrics::new("sync-a");

        let retry = AutomationEvent::from_input(
            EventInput::new("sync-a", EventKind::Retry, EventStatus::Warning, "retrying")
                .with_retry_count(2),
        );
        aggregator.apply(&mut metrics, &retry, None);

        assert_eq!(metrics.warning_count, 1);
        assert_eq!(metrics.retry_count, 2);
        assert_eq!(metrics.status, AutomationStatus::Active);
        assert_eq!(metrics.success_rate, 0.0);
    }

    #[test]
    fn test_average_uses_total_executions() {
        let aggregator = MetricsAggregator::new();
        let mut metrics = AutomationMetrics::new("sync-a");

        aggregator.apply(&mut metrics, &event(EventKind::Started, EventStatus::Info), None);
        let completed = AutomationEvent::from_input(
            EventInput::new("sync-a", EventKind::Completed, EventStatus::Success, "ok")
                .with_duration(1000),
        );
        aggregator.apply(&mut metrics, &completed, None);

        assert_eq!(metrics.total_executions, 2);
        assert_eq!(metrics.average_execution_time_ms, 500.0);
        assert_eq!(metrics.success_rate, 50.0);
    }

    #[test]
    fn test_huge_durations_saturate_cumulative_time() {
        let aggregator = MetricsAggregator::new();
        let mut metrics = AutomationMetrics::new("sync-a");

        for _ in 0..2 {
            let completed = AutomationEvent::from_input(
                EventInput::new("sync-a", EventKind::Completed, EventStatus::Success, "ok")
                    .with_duration(u64::MAX / 2 + 1),
            );
            aggregator.apply(&mut metrics, &completed, None);
        }

        assert_eq!(metrics.total_executions, 2);
        assert_eq!(metrics.successful_executions, 2);
        assert_eq!(metrics.total_execution_time_ms, u64::MAX);
        assert_eq!(metrics.average_execution_time_ms, u64::MAX as f64 / 2.0);
        assert_eq!(metrics.success_rate, 100.0);
    }

    #[test]
    fn test_health_derivation_bands() {
        let thresholds = MonitoringThresholds {
            min_success_rate: 95.0,
            max_retry_count: 3,
            ..Default::default()
        };
        let mut metrics = AutomationMetrics::new("sync-a");

        metrics.success_rate = 100.0;
        assert_eq!(derive_health(&metrics, Some(&thresholds)), HealthState::Healthy);

        metrics.success_rate = 90.0;
        assert_eq!(derive_health(&metrics, Some(&thresholds)), HealthState::Degraded);

        metrics.success_rate = 74.9;
        assert_eq!(derive_health(&metrics, Some(&thresholds)), HealthState::Critical);

        metrics.success_rate = 100.0;
        metrics.error_count = 7;
        assert_eq!(derive_health(&metrics, Some(&thresholds)), HealthState::Degraded);

        assert_eq!(derive_health(&metrics, None), HealthState::Unknown);
    }
}
