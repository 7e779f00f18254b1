// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shape of `GET /queue`.

use forge3d_store::Stats;
use serde::Serialize;

/// Snapshot of the scheduler's admission gate plus aggregate history
/// counts, as returned by `GET /queue`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct QueueState {
    pub paused: bool,
    pub queued: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
}

impl QueueState {
    pub fn from_stats(paused: bool, stats: Stats) -> Self {
        Self {
            paused,
            queued: stats.queued,
            processing: stats.processing,
            completed: stats.complete,
            failed: stats.failed,
        }
    }
}
