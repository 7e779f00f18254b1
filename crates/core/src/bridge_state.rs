// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! InferenceBridge state machine.
//!
//! ```text
//!  stopped --spawn--> starting --ready--> running
//!     ^                   |                  |
//!     |                   |fail/timeout      |
//!     |                   v                  |
//!     +----restart---- crashed <--health fails
//!                          |
//!                          +--budget exhausted--> broken
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeState {
    Stopped,
    Starting,
    Running,
    Crashed,
    Broken,
}

crate::simple_display! {
    BridgeState {
        Stopped => "stopped",
        Starting => "starting",
        Running => "running",
        Crashed => "crashed",
        Broken => "broken",
    }
}

impl BridgeState {
    /// Whether a request may be forwarded to the worker right now.
    pub fn accepts_requests(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether the scheduler may dequeue work while the bridge is in this
    /// state ("no jobs are started while the bridge is starting, crashed,
    /// or broken").
    pub fn allows_dequeue(self) -> bool {
        matches!(self, Self::Running)
    }
}

#[cfg(test)]
#[path = "bridge_state_tests.rs"]
mod tests;
