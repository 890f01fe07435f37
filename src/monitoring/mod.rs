//! # Monitoring Engine
//!
//! Components of the monitoring engine, leaf first:
//!
//! - [`event_store`] - bounded per-automation event log
//! - [`metrics_aggregator`] - running statistics and health derivation
//! - [`alert_evaluator`] - threshold rules evaluated after every event
//! - [`alert_store`] - alert history with acknowledge/resolve
//! - [`health_check`] - periodic composite health scoring
//! - [`notification_bus`] - per-automation subscriber fan-out
//! - [`dashboard`] - on-demand roll-up across automations
//! - [`monitor`] - the [`AutomationMonitor`] service tying them together

pub mod alert_evaluator;
pub mod alert_store;
pub mod dashboard;
pub mod event_store;
pub mod health_check;
pub mod metrics_aggregator;
pub mod monitor;
pub mod notification_bus;

// Re-export key types for convenience
pub use alert_evaluator::AlertEvaluator;
pub use alert_store::AlertStore;
pub use dashboard::{DashboardData, HealthSummary};
pub use event_store::EventLog;
pub use health_check::{HealthCheckScheduler, HealthChecker, HealthProbe, StaticHealthProbe};
pub use metrics_aggregator::MetricsAggregator;
pub use monitor::AutomationMonitor;
pub use notification_bus::{
    EventSubscriber, FnSubscriber, NotificationBus, NotificationBusConfig, SubscriberError,
    Subscription, SubscriptionStats,
};
