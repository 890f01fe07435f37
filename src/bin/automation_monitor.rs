//! # Automation Monitor Service
//!
//! Runs the monitoring engine as a standalone process and logs the dashboard
//! roll-up on every poll interval until Ctrl-C.
//!
//! Configuration path: the first command-line argument, else
//! `AUTOMATION_MONITOR_CONFIG`, else built-in defaults plus environment
//! overrides.

use anyhow::Context;
use automation_monitor::constants::env;
use automation_monitor::logging::init_structured_logging;
use automation_monitor::{AutomationMonitor, MonitorConfig};
use std::path::PathBuf;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(env::CONFIG_PATH).ok())
        .map(PathBuf::from);

    let config = MonitorConfig::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to load configuration".to_string(),
    })?;

    let monitor = AutomationMonitor::new(config);
    monitor.start().context("failed to start automation monitor")?;

    let mut poll = tokio::time::interval(monitor.config().dashboard_poll_interval());
    loop {
        tokio::select! {
            _ = poll.tick() => {
                match serde_json::to_string(&monitor.dashboard_data()) {
                    Ok(dashboard) => info!(dashboard = %dashboard, "Dashboard roll-up"),
                    Err(e) => error!(error = %e, "Failed to serialize dashboard roll-up"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!(error = %e, "Failed to listen for shutdown signal");
                }
                break;
            }
        }
    }

    monitor.stop().await.context("failed to stop automation monitor")?;
    Ok(())
}
