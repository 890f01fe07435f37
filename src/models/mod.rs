pub mod alert;
pub mod event;
pub mod health_check;
pub mod metrics;
pub mod performance;
pub mod thresholds;

// Re-export core models for easy access
pub use alert::{AlertSeverity, AlertType, AutomationAlert};
pub use event::{AutomationEvent, EventInput, EventKind, EventStatus};
pub use health_check::{AutomationHealthCheckResult, HealthChecks};
pub use metrics::{AutomationMetrics, AutomationStatus, HealthState};
pub use performance::{AutomationPerformanceDataPoint, PerformanceSample};
pub use thresholds::{
    MonitoringThresholds, PerformanceThresholds, PerformanceThresholdsUpdate, ThresholdsUpdate,
};
