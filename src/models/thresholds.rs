//! Per-automation alerting thresholds.

use serde::{Deserialize, Serialize};

use crate::constants::default_thresholds as defaults;
use crate::error::{MonitorError, Result};

/// Resource usage limits checked against performance samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceThresholds {
    /// Megabytes
    pub max_memory_usage: f64,
    /// Percent
    pub max_cpu_usage: f64,
    /// Milliseconds
    pub max_network_latency: f64,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            max_memory_usage: defaults::MAX_MEMORY_USAGE_MB,
            max_cpu_usage: defaults::MAX_CPU_USAGE,
            max_network_latency: defaults::MAX_NETWORK_LATENCY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringThresholds {
    pub max_execution_time_ms: u64,
    /// Percent, 0-100
    pub min_success_rate: f64,
    /// Percent, 0-100
    pub max_error_rate: f64,
    pub max_retry_count: u32,
    pub alert_on_consecutive_failures: u32,
    pub performance: PerformanceThresholds,
}

impl Default for MonitoringThresholds {
    fn default() -> Self {
        Self {
            max_execution_time_ms: defaults::MAX_EXECUTION_TIME_MS,
            min_success_rate: defaults::MIN_SUCCESS_RATE,
            max_error_rate: defaults::MAX_ERROR_RATE,
            max_retry_count: defaults::MAX_RETRY_COUNT,
            alert_on_consecutive_failures: defaults::ALERT_ON_CONSECUTIVE_FAILURES,
            performance: PerformanceThresholds::default(),
        }
    }
}

impl MonitoringThresholds {
    pub fn validate(&self) -> Result<()> {
        check_percentage("min_success_rate", self.min_success_rate)?;
        check_percentage("max_error_rate", self.max_error_rate)?;
        check_percentage("performance.max_cpu_usage", self.performance.max_cpu_usage)?;

        if self.max_execution_time_ms == 0 {
            return Err(MonitorError::invalid_threshold(
                "max_execution_time_ms",
                "must be greater than zero",
            ));
        }
        if self.alert_on_consecutive_failures == 0 {
            return Err(MonitorError::invalid_threshold(
                "alert_on_consecutive_failures",
                "must be greater than zero",
            ));
        }
        if !(self.performance.max_memory_usage.is_finite()
            && self.performance.max_memory_usage >= 0.0)
        {
            return Err(MonitorError::invalid_threshold(
                "performance.max_memory_usage",
                "must be a non-negative number",
            ));
        }
        if !(self.performance.max_network_latency.is_finite()
            && self.performance.max_network_latency >= 0.0)
        {
            return Err(MonitorError::invalid_threshold(
                "performance.max_network_latency",
                "must be a non-negative number",
            ));
        }
        Ok(())
    }

    /// Overlay a partial update, returning the merged thresholds
    pub fn merged(&self, update: &ThresholdsUpdate) -> Self {
        let mut merged = self.clone();
        if let Some(value) = update.max_execution_time_ms {
            merged.max_execution_time_ms = value;
        }
        if let Some(value) = update.min_success_rate {
            merged.min_success_rate = value;
        }
        if let Some(value) = update.max_error_rate {
            merged.max_error_rate = value;
        }
        if let Some(value) = update.max_retry_count {
            merged.max_retry_count = value;
        }
        if let Some(value) = update.alert_on_consecutive_failures {
            merged.alert_on_consecutive_failures = value;
        }
        if let Some(performance) = &update.performance {
            if let Some(value) = performance.max_memory_usage {
                merged.performance.max_memory_usage = value;
            }
            if let Some(value) = performance.max_cpu_usage {
                merged.performance.max_cpu_usage = value;
            }
            if let Some(value) = performance.max_network_latency {
                merged.performance.max_network_latency = value;
            }
        }
        merged
    }
}

fn check_percentage(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(MonitorError::invalid_threshold(
            field,
            format!("{value} is outside 0-100"),
        ))
    }
}

/// Partial threshold update accepted by `set_thresholds`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsUpdate {
    pub max_execution_time_ms: Option<u64>,
    pub min_success_rate: Option<f64>,
    pub max_error_rate: Option<f64>,
    pub max_retry_count: Option<u32>,
    pub alert_on_consecutive_failures: Option<u32>,
    pub performance: Option<PerformanceThresholdsUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceThresholdsUpdate {
    pub max_memory_usage: Option<f64>,
    pub max_cpu_usage: Option<f64>,
    pub max_network_latency: Option<f64>,
}

impl ThresholdsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_execution_time_ms(mut self, value: u64) -> Self {
        self.max_execution_time_ms = Some(value);
        self
    }

    pub fn min_success_rate(mut self, value: f64) -> Self {
        self.min_success_rate = Some(value);
        self
    }

    pub fn max_error_rate(mut self, value: f64) -> Self {
        self.max_error_rate = Some(value);
        self
    }

    pub fn max_retry_count(mut self, value: u32) -> Self {
        self.max_retry_count = Some(value);
        self
    }

    pub fn alert_on_consecutive_failures(mut self, value: u32) -> Self {
        self.alert_on_consecutive_failures = Some(value);
        self
    }

    pub fn performance(mut self, value: PerformanceThresholdsUpdate) -> Self {
        self.performance = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_valid() {
        let thresholds = MonitoringThresholds::default();
        assert!(thresholds.validate().is_ok());
        assert_eq!(thresholds.max_execution_time_ms, 30_000);
        assert_eq!(thresholds.min_success_rate, 95.0);
        assert_eq!(thresholds.alert_on_consecutive_failures, 3);
    }

    #[test]
    fn test_partial_merge_keeps_unset_fields() {
        let base = MonitoringThresholds::default();
        let update = ThresholdsUpdate::new()
            .min_success_rate(80.0)
            .performance(PerformanceThresholdsUpdate {
                max_cpu_usage: Some(50.0),
                ..Default::default()
            });

        let merged = base.merged(&update);
        assert_eq!(merged.min_success_rate, 80.0);
        assert_eq!(merged.max_execution_time_ms, base.max_execution_time_ms);
        assert_eq!(merged.performance.max_cpu_usage, 50.0);
        assert_eq!(
            merged.performance.max_memory_usage,
            base.performance.max_memory_usage
        );
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        let bad_rate = MonitoringThresholds::default().merged(&ThresholdsUpdate::new().min_success_rate(120.0));
        assert!(matches!(
            bad_rate.validate(),
            Err(MonitorError::InvalidThreshold { field, .. }) if field == "min_success_rate"
        ));

        let zero_trigger = MonitoringThresholds::default()
            .merged(&ThresholdsUpdate::new().alert_on_consecutive_failures(0));
        assert!(zero_trigger.validate().is_err());

        let nan_rate =
            MonitoringThresholds::default().merged(&ThresholdsUpdate::new().max_error_rate(f64::NAN));
        assert!(nan_rate.validate().is_err());
    }
}
