// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HistoryEntry — the durable record of one generation attempt, whether or
//! not it reached an asset.

use crate::asset::AssetId;
use crate::kind::{GenerationKind, HistoryStatus};
use crate::project::ProjectId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a history entry.
    pub struct HistoryId;
}

/// Maximum byte length of a prompt string.
pub const PROMPT_MAX_BYTES: usize = 8 * 1024;

/// Error message synthesized for rows left in `processing` by a prior crash.
pub const ORPHANED_ERROR_MESSAGE: &str = "orphaned by host restart";

/// Error message used when a queued job's in-memory payload did not survive
/// a host restart (it was queued but never reached `processing`).
pub const LOST_PAYLOAD_ERROR_MESSAGE: &str = "host restart before execution";

/// Error message used when a queued job is cancelled before it starts.
pub const CANCELLED_ERROR_MESSAGE: &str = "cancelled";

/// Error message used when the bridge's worker process dies mid-generation.
pub const BRIDGE_CRASH_ERROR_MESSAGE: &str = "bridge crashed mid-generation";

/// One generation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub asset_id: Option<AssetId>,
    pub project_id: Option<ProjectId>,
    pub kind: GenerationKind,
    pub prompt: Option<String>,
    pub status: HistoryStatus,
    pub generation_time_seconds: Option<f64>,
    pub vram_usage_mb: Option<f64>,
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at_ms: i64,
    pub completed_at_ms: Option<i64>,
}

impl HistoryEntry {
    pub fn validate_prompt(prompt: &str) -> Result<(), crate::Error> {
        if prompt.len() > PROMPT_MAX_BYTES {
            return Err(crate::Error::InvalidArgument(format!(
                "prompt exceeds {} bytes",
                PROMPT_MAX_BYTES
            )));
        }
        Ok(())
    }

    /// True iff `completed_at_ms` is consistent with `status`: present iff
    /// terminal.
    pub fn completion_timestamp_is_consistent(&self) -> bool {
        self.status.is_terminal() == self.completed_at_ms.is_some()
    }
}

/// Filters accepted by `list_history` (`GET /history`).
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub project_id: Option<ProjectId>,
    pub status: Option<HistoryStatus>,
    pub kind: Option<GenerationKind>,
    pub limit: Option<u32>,
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
