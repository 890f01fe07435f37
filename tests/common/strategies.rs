#![allow(dead_code)]

use automation_monitor::{EventInput, EventKind, EventStatus};
use proptest::prelude::*;

/// Strategy for automation identifiers
pub fn automation_id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,23}"
}

pub fn event_kind_strategy() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Started),
        Just(EventKind::Completed),
        Just(EventKind::Failed),
        Just(EventKind::Paused),
        Just(EventKind::Resumed),
        Just(EventKind::Timeout),
        Just(EventKind::Retry),
    ]
}

pub fn event_status_strategy() -> impl Strategy<Value = EventStatus> {
    prop_oneof![
        Just(EventStatus::Success),
        Just(EventStatus::Failure),
        Just(EventStatus::Warning),
        Just(EventStatus::Info),
    ]
}

/// Strategy for event inputs of a fixed automation
pub fn event_input_strategy(automation_id: String) -> impl Strategy<Value = EventInput> {
    (
        event_kind_strategy(),
        event_status_strategy(),
        prop::option::of(0u64..120_000),
        prop::option::of(0u32..5),
    )
        .prop_map(move |(kind, status, duration, retries)| {
            let mut input = EventInput::new(automation_id.clone(), kind, status, "generated");
            input.duration_ms = duration;
            input.retry_count = retries;
            input
        })
}

/// Strategy for a non-empty event sequence of one automation
pub fn event_sequence_strategy(max_len: usize) -> impl Strategy<Value = (String, Vec<EventInput>)> {
    automation_id_strategy().prop_flat_map(move |automation_id| {
        (
            Just(automation_id.clone()),
            prop::collection::vec(event_input_strategy(automation_id), 1..max_len),
        )
    })
}
