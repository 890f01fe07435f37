#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Automation Monitor
//!
//! In-process monitoring and alerting engine for independently running
//! automations (rule executions, syncs, scheduled jobs).
//!
//! ## Overview
//!
//! Automations report lifecycle events and performance samples. The engine
//! keeps a bounded event log and rolling metrics per automation, evaluates
//! alert thresholds after every event, recomputes a composite health score on
//! a fixed interval and republishes each event to live subscribers.
//!
//! ## Module Organization
//!
//! - [`models`] - events, metrics, alerts, thresholds and health results
//! - [`monitoring`] - the engine components and the [`AutomationMonitor`] service
//! - [`config`] - layered configuration
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup
//! - [`constants`] - limits and defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use automation_monitor::{AutomationMonitor, EventInput, EventKind, EventStatus, MonitorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let monitor = AutomationMonitor::new(MonitorConfig::load(None)?);
//! monitor.start()?;
//!
//! let subscription = monitor.subscribe_fn("invoice-sync", "console", |event| {
//!     println!("{} {}", event.kind, event.message);
//!     Ok(())
//! })?;
//!
//! monitor.record_event(EventInput::new(
//!     "invoice-sync",
//!     EventKind::Failed,
//!     EventStatus::Failure,
//!     "upstream returned 503",
//! ));
//!
//! for alert in monitor.alerts(Some("invoice-sync"), true) {
//!     println!("[{}] {}", alert.severity, alert.title);
//! }
//!
//! subscription.unsubscribe();
//! monitor.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! History is held in memory only and is lost when the process exits.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod monitoring;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use models::{
    AlertSeverity, AlertType, AutomationAlert, AutomationEvent, AutomationHealthCheckResult,
    AutomationMetrics, AutomationPerformanceDataPoint, AutomationStatus, EventInput, EventKind,
    EventStatus, HealthChecks, HealthState, MonitoringThresholds, PerformanceSample,
    PerformanceThresholds, PerformanceThresholdsUpdate, ThresholdsUpdate,
};
pub use monitoring::{
    AutomationMonitor, DashboardData, EventSubscriber, HealthProbe, HealthSummary,
    StaticHealthProbe, SubscriberError, Subscription, SubscriptionStats,
};
