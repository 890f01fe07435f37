//! Error types for the automation monitor.
//!
//! Ingestion (`record_event`, `record_performance_data`) never returns an error.
//! Queries return `Option`/empty collections for unknown automations. Only
//! command-style operations surface a [`MonitorError`].

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid threshold {field}: {reason}")]
    InvalidThreshold { field: String, reason: String },
    #[error("Alert {0} not found")]
    AlertNotFound(Uuid),
    #[error("Runtime unavailable: {0}")]
    RuntimeUnavailable(String),
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl MonitorError {
    pub fn invalid_threshold(field: &str, reason: impl Into<String>) -> Self {
        MonitorError::InvalidThreshold {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<::config::ConfigError> for MonitorError {
    fn from(error: ::config::ConfigError) -> Self {
        MonitorError::Configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MonitorError::invalid_threshold("min_success_rate", "must be within 0-100");
        assert_eq!(
            err.to_string(),
            "Invalid threshold min_success_rate: must be within 0-100"
        );

        let id = Uuid::new_v4();
        assert_eq!(
            MonitorError::AlertNotFound(id).to_string(),
            format!("Alert {id} not found")
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: MonitorError = ::config::ConfigError::Message("bad value".to_string()).into();
        assert!(matches!(err, MonitorError::Configuration(msg) if msg.contains("bad value")));
    }
}
