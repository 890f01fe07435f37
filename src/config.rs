//! # Monitor Configuration
//!
//! Layered configuration for the monitoring engine. Values are resolved from,
//! in increasing priority:
//!
//! 1. Built-in defaults ([`MonitorConfig::default`])
//! 2. An optional configuration file (format chosen by extension: toml, yaml, json)
//! 3. Environment variables prefixed `AUTOMATION_MONITOR__`, using `__` to
//!    address nested keys (e.g. `AUTOMATION_MONITOR__DEFAULT_THRESHOLDS__MIN_SUCCESS_RATE`)
//!
//! ```rust,no_run
//! use automation_monitor::config::MonitorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::load(Some("config/monitor.toml".as_ref()))?;
//! println!("health checks every {:?}", config.health_check_interval());
//! # Ok(())
//! # }
//! ```

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::constants::{self, env};
use crate::error::{MonitorError, Result};
use crate::models::MonitoringThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interval between scheduled health check ticks
    pub health_check_interval_seconds: u64,
    /// Event log bound per automation; older events are evicted
    pub max_events_per_automation: usize,
    /// Performance sample bound per automation
    pub max_performance_points: usize,
    /// Newest events inspected by the consecutive-failure rule
    pub consecutive_failure_window: usize,
    /// Executions required before the low-success-rate rule fires
    pub low_success_rate_min_executions: u64,
    /// Urgent alerts included in the dashboard roll-up
    pub dashboard_alert_limit: usize,
    pub dashboard_poll_interval_seconds: u64,
    /// Per-subscriber queue depth
    pub subscriber_buffer_size: usize,
    /// Upper bound on a single subscriber callback
    pub subscriber_timeout_ms: u64,
    /// Capacity of the all-automation event and alert streams
    pub broadcast_capacity: usize,
    /// Store `default_thresholds` for automations on first use
    pub auto_default_thresholds: bool,
    /// Raise resource alerts from performance samples
    pub resource_alerts_enabled: bool,
    pub default_thresholds: MonitoringThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            health_check_interval_seconds: constants::DEFAULT_HEALTH_CHECK_INTERVAL_SECONDS,
            max_events_per_automation: constants::DEFAULT_MAX_EVENTS_PER_AUTOMATION,
            max_performance_points: constants::DEFAULT_MAX_PERFORMANCE_POINTS,
            consecutive_failure_window: constants::DEFAULT_CONSECUTIVE_FAILURE_WINDOW,
            low_success_rate_min_executions: constants::DEFAULT_LOW_SUCCESS_RATE_MIN_EXECUTIONS,
            dashboard_alert_limit: constants::DEFAULT_DASHBOARD_ALERT_LIMIT,
            dashboard_poll_interval_seconds: constants::DEFAULT_DASHBOARD_POLL_INTERVAL_SECONDS,
            subscriber_buffer_size: constants::DEFAULT_SUBSCRIBER_BUFFER_SIZE,
            subscriber_timeout_ms: constants::DEFAULT_SUBSCRIBER_TIMEOUT_MS,
            broadcast_capacity: constants::DEFAULT_BROADCAST_CAPACITY,
            auto_default_thresholds: true,
            resource_alerts_enabled: true,
            default_thresholds: MonitoringThresholds::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&MonitorConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading monitor configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: MonitorConfig = builder
            .add_source(
                Environment::with_prefix(env::CONFIG_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load using the path in `AUTOMATION_MONITOR_CONFIG`, if set
    pub fn from_env() -> Result<Self> {
        match std::env::var(env::CONFIG_PATH) {
            Ok(path) => Self::load(Some(Path::new(&path))),
            Err(_) => Self::load(None),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let non_zero = [
            (
                "health_check_interval_seconds",
                self.health_check_interval_seconds as usize,
            ),
            (
                "dashboard_poll_interval_seconds",
                self.dashboard_poll_interval_seconds as usize,
            ),
            ("max_events_per_automation", self.max_events_per_automation),
            ("max_performance_points", self.max_performance_points),
            ("consecutive_failure_window", self.consecutive_failure_window),
            ("subscriber_buffer_size", self.subscriber_buffer_size),
            ("subscriber_timeout_ms", self.subscriber_timeout_ms as usize),
            ("broadcast_capacity", self.broadcast_capacity),
        ];
        for (field, value) in non_zero {
            if value == 0 {
                return Err(MonitorError::Configuration(format!(
                    "{field} must be greater than zero"
                )));
            }
        }

        self.default_thresholds
            .validate()
            .map_err(|e| MonitorError::Configuration(format!("default_thresholds: {e}")))
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_seconds)
    }

    pub fn subscriber_timeout(&self) -> Duration {
        Duration::from_millis(self.subscriber_timeout_ms)
    }

    pub fn dashboard_poll_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_poll_interval_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.health_check_interval(), Duration::from_secs(300));
        assert_eq!(config.max_events_per_automation, 1000);
        assert_eq!(config.dashboard_alert_limit, 5);
        assert!(config.auto_default_thresholds);
    }

    #[test]
    fn test_validation_rejects_zero_sizes() {
        let config = MonitorConfig {
            subscriber_buffer_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MonitorError::Configuration(msg)) if msg.contains("subscriber_buffer_size")
        ));
    }

    #[test]
    fn test_validation_checks_default_thresholds() {
        let mut config = MonitorConfig::default();
        config.default_thresholds.min_success_rate = 150.0;
        assert!(config.validate().is_err());
    }
}
