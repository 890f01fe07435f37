//! # Event Store
//!
//! Bounded per-automation append log. Appending past capacity evicts the
//! oldest entry, so a log never holds more than `capacity` events.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;

use crate::models::AutomationEvent;

#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<AutomationEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
        }
    }

    /// Append an event, evicting the oldest entries beyond capacity
    pub fn append(&mut self, event: AutomationEvent) {
        self.events.push_back(event);
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    /// The newest `limit` events (all when `None`), oldest first
    pub fn latest(&self, limit: Option<usize>) -> Vec<AutomationEvent> {
        let skip = limit
            .map(|limit| self.events.len().saturating_sub(limit))
            .unwrap_or(0);
        self.events.iter().skip(skip).cloned().collect()
    }

    /// Events at or after `cutoff`, oldest first
    pub fn since(&self, cutoff: DateTime<Utc>) -> Vec<AutomationEvent> {
        self.events
            .iter()
            .filter(|event| event.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    /// Events within the last `window_minutes` of `now`. A window reaching
    /// past the representable range returns every event.
    pub fn within_minutes(&self, now: DateTime<Utc>, window_minutes: i64) -> Vec<AutomationEvent> {
        match window_start(now, TimeDelta::try_minutes(window_minutes)) {
            Some(cutoff) => self.since(cutoff),
            None => self.latest(None),
        }
    }

    /// Iterate newest to oldest
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &AutomationEvent> {
        self.events.iter().rev()
    }
}

/// `now - window`, or `None` when either step overflows
pub fn window_start(now: DateTime<Utc>, window: Option<TimeDelta>) -> Option<DateTime<Utc>> {
    window.and_then(|window| now.checked_sub_signed(window))
}
