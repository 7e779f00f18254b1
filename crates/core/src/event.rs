// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry event shape: a closed enum with a namespaced `category:name`
//! wire tag (`#[serde(tag = "type")]`) in place of a stringly-typed
//! category field.

use crate::history::HistoryId;
use serde::{Deserialize, Serialize};

/// The category a [`TelemetryEvent`] belongs to — used for per-category
/// ring buffers and subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryCategory {
    Scheduler,
    Bridge,
    /// Retained as an opaque category — LLM provider chain is out of scope
    /// for this component, but the category still exists so the bus's
    /// `all` firehose and per-category counters stay faithful to the
    /// surrounding system's event taxonomy.
    Llm,
    /// Retained as an opaque category — plan apply/rollback operations are
    /// out of scope for this component.
    Ops,
}

impl TelemetryCategory {
    pub const ALL: [TelemetryCategory; 4] =
        [Self::Scheduler, Self::Bridge, Self::Llm, Self::Ops];
}

crate::simple_display! {
    TelemetryCategory {
        Scheduler => "scheduler",
        Bridge => "bridge",
        Llm => "llm",
        Ops => "ops",
    }
}

/// A telemetry event, routed to its category's ring buffer and the `all`
/// firehose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TelemetryEvent {
    #[serde(rename = "scheduler:queued")]
    SchedulerQueued { history_id: HistoryId },

    #[serde(rename = "scheduler:started")]
    SchedulerStarted { history_id: HistoryId },

    #[serde(rename = "scheduler:complete")]
    SchedulerComplete { history_id: HistoryId, duration_ms: u64 },

    #[serde(rename = "scheduler:failed")]
    SchedulerFailed { history_id: HistoryId, error: String },

    #[serde(rename = "scheduler:progress")]
    SchedulerProgress {
        history_id: HistoryId,
        stage: crate::session_state::Stage,
        percent: u8,
    },

    #[serde(rename = "bridge:spawn")]
    BridgeSpawn { pid: u32 },

    #[serde(rename = "bridge:crash")]
    BridgeCrash { exit_code: Option<i32>, stderr_tail: String },

    #[serde(rename = "bridge:health")]
    BridgeHealth { state: crate::bridge_state::BridgeState },

    /// Opaque passthrough for the out-of-scope LLM provider chain.
    #[serde(rename = "llm:event")]
    Llm { payload: serde_json::Value },

    /// Opaque passthrough for the out-of-scope plan apply/rollback system.
    #[serde(rename = "ops:event")]
    Ops { payload: serde_json::Value },
}

impl TelemetryEvent {
    pub fn category(&self) -> TelemetryCategory {
        match self {
            Self::SchedulerQueued { .. }
            | Self::SchedulerStarted { .. }
            | Self::SchedulerComplete { .. }
            | Self::SchedulerFailed { .. }
            | Self::SchedulerProgress { .. } => TelemetryCategory::Scheduler,
            Self::BridgeSpawn { .. } | Self::BridgeCrash { .. } | Self::BridgeHealth { .. } => {
                TelemetryCategory::Bridge
            }
            Self::Llm { .. } => TelemetryCategory::Llm,
            Self::Ops { .. } => TelemetryCategory::Ops,
        }
    }

    /// Duration to fold into the category's latency window, if this event
    /// carries one.
    pub fn latency_ms(&self) -> Option<u64> {
        match self {
            Self::SchedulerComplete { duration_ms, .. } => Some(*duration_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
