//! # Monitoring Constants
//!
//! Fixed limits and defaults that define the operational boundaries of the
//! monitoring engine. Most of these are the defaults behind [`crate::config::MonitorConfig`].

/// Health check scheduler interval (5 minutes)
pub const DEFAULT_HEALTH_CHECK_INTERVAL_SECONDS: u64 = 300;

/// Maximum number of events retained per automation
pub const DEFAULT_MAX_EVENTS_PER_AUTOMATION: usize = 1000;

/// Maximum number of performance samples retained per automation
pub const DEFAULT_MAX_PERFORMANCE_POINTS: usize = 1000;

/// Number of newest events scanned by the consecutive-failure rule
pub const DEFAULT_CONSECUTIVE_FAILURE_WINDOW: usize = 10;

/// Executions required before the low-success-rate rule may fire
pub const DEFAULT_LOW_SUCCESS_RATE_MIN_EXECUTIONS: u64 = 10;

/// Number of high/critical alerts surfaced on the dashboard
pub const DEFAULT_DASHBOARD_ALERT_LIMIT: usize = 5;

/// Suggested UI polling interval for the dashboard roll-up
pub const DEFAULT_DASHBOARD_POLL_INTERVAL_SECONDS: u64 = 30;

pub const DEFAULT_SUBSCRIBER_BUFFER_SIZE: usize = 256;
pub const DEFAULT_SUBSCRIBER_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_BROADCAST_CAPACITY: usize = 1024;

/// Time allowed for the health check scheduler to wind down on stop
pub const SCHEDULER_SHUTDOWN_TIMEOUT_SECONDS: u64 = 10;

/// Success-rate margin below the minimum at which health becomes critical
pub const CRITICAL_SUCCESS_RATE_MARGIN: f64 = 20.0;

/// Number of boolean sub-checks in a health check
pub const HEALTH_CHECK_COUNT: u32 = 5;

/// Score bands for the overall health of a health check
pub const HEALTHY_SCORE: u8 = 80;
pub const DEGRADED_SCORE: u8 = 60;

/// Default threshold values applied when an automation has none configured
pub mod default_thresholds {
    pub const MAX_EXECUTION_TIME_MS: u64 = 30_000;
    pub const MIN_SUCCESS_RATE: f64 = 95.0;
    pub const MAX_ERROR_RATE: f64 = 5.0;
    pub const MAX_RETRY_COUNT: u32 = 3;
    pub const ALERT_ON_CONSECUTIVE_FAILURES: u32 = 3;
    pub const MAX_MEMORY_USAGE_MB: f64 = 512.0;
    pub const MAX_CPU_USAGE: f64 = 80.0;
    pub const MAX_NETWORK_LATENCY_MS: f64 = 5000.0;
}

/// Health check recommendations, in the order they are emitted
pub mod recommendations {
    pub const OPTIMIZE_PERFORMANCE: &str = "Optimize execution performance";
    pub const FIX_RECURRING_ERRORS: &str = "Investigate and fix recurring errors";
    pub const CHECK_DEPENDENCIES: &str = "Check external service dependencies";
    pub const REVIEW_RESOURCES: &str = "Review resource usage against configured limits";
}

/// Environment variable names
pub mod env {
    pub const CONFIG_PATH: &str = "AUTOMATION_MONITOR_CONFIG";
    pub const ENVIRONMENT: &str = "AUTOMATION_MONITOR_ENV";
    pub const CONFIG_PREFIX: &str = "AUTOMATION_MONITOR";
}
