#![allow(dead_code)]

use automation_monitor::{
    AutomationEvent, EventInput, EventKind, EventStatus, EventSubscriber, MonitorConfig,
    SubscriberError,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub const SETTLE: Duration = Duration::from_millis(100);

pub fn started(automation_id: &str) -> EventInput {
    EventInput::new(automation_id, EventKind::Started, EventStatus::Info, "started")
}

pub fn succeeded(automation_id: &str) -> EventInput {
    EventInput::new(automation_id, EventKind::Completed, EventStatus::Success, "completed")
}

pub fn completed_with_failure(automation_id: &str) -> EventInput {
    EventInput::new(automation_id, EventKind::Completed, EventStatus::Failure, "completed with errors")
}

pub fn failed(automation_id: &str) -> EventInput {
    EventInput::new(automation_id, EventKind::Failed, EventStatus::Failure, "failed")
        .with_error("connector returned 503")
}

/// Config with a short subscriber timeout so slow-path tests stay fast
pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        subscriber_timeout_ms: 500,
        ..Default::default()
    }
}

/// Subscriber that records every event message it receives
#[derive(Debug, Default)]
pub struct RecordingSubscriber {
    received: Mutex<Vec<String>>,
}

impl RecordingSubscriber {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.received.lock().clone()
    }
}

#[async_trait::async_trait]
impl EventSubscriber for RecordingSubscriber {
    async fn handle_event(&self, event: &AutomationEvent) -> Result<(), SubscriberError> {
        self.received.lock().push(event.message.clone());
        Ok(())
    }

    fn subscriber_name(&self) -> &str {
        "recording_subscriber"
    }
}
