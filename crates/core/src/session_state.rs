// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session finite-state machine, and the progress-reporting types
//! that ride alongside it.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for a [`SessionState`] run. Not persisted — sessions are
    /// transient, in-memory only.
    pub struct SessionId;
}

/// State of one Session's run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    GeneratingImage,
    GeneratingMesh,
    Complete,
    Failed { error: String },
}

/// Tag-only variant of [`SessionState`] for summaries (strips the error
/// payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStateKind {
    Idle,
    GeneratingImage,
    GeneratingMesh,
    Complete,
    Failed,
}

impl From<&SessionState> for SessionStateKind {
    fn from(s: &SessionState) -> Self {
        match s {
            SessionState::Idle => Self::Idle,
            SessionState::GeneratingImage => Self::GeneratingImage,
            SessionState::GeneratingMesh => Self::GeneratingMesh,
            SessionState::Complete => Self::Complete,
            SessionState::Failed { .. } => Self::Failed,
        }
    }
}

crate::simple_display! {
    SessionStateKind {
        Idle => "idle",
        GeneratingImage => "generating_image",
        GeneratingMesh => "generating_mesh",
        Complete => "complete",
        Failed => "failed",
    }
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::GeneratingImage | Self::GeneratingMesh)
    }
}

/// Which pipeline stage a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Image,
    Mesh,
}

crate::simple_display! {
    Stage {
        Image => "image",
        Mesh => "mesh",
    }
}

/// A single progress report emitted by a running Session.
///
/// `percent` is monotone non-decreasing within a stage, reset to 0 when a
/// new stage begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub stage: Stage,
    pub percent: u8,
}

#[cfg(test)]
#[path = "session_state_tests.rs"]
mod tests;
