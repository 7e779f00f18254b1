// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn scheduler_events_categorize_as_scheduler() {
    let ev = TelemetryEvent::SchedulerQueued { history_id: HistoryId::new() };
    assert_eq!(ev.category(), TelemetryCategory::Scheduler);
}

#[test]
fn bridge_events_categorize_as_bridge() {
    let ev = TelemetryEvent::BridgeCrash { exit_code: Some(1), stderr_tail: String::new() };
    assert_eq!(ev.category(), TelemetryCategory::Bridge);
}

#[test]
fn only_scheduler_complete_carries_latency() {
    let complete = TelemetryEvent::SchedulerComplete { history_id: HistoryId::new(), duration_ms: 42 };
    assert_eq!(complete.latency_ms(), Some(42));

    let queued = TelemetryEvent::SchedulerQueued { history_id: HistoryId::new() };
    assert_eq!(queued.latency_ms(), None);
}

#[test]
fn wire_tag_is_namespaced() {
    let ev = TelemetryEvent::BridgeSpawn { pid: 123 };
    let json = serde_json::to_value(&ev).unwrap();
    assert_eq!(json["type"], "bridge:spawn");
}
