// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The validated, already-payload-bearing request a Session drives to
//! completion. Built by the scheduler at dequeue time from a HistoryEntry
//! row plus (for `mesh`) the in-memory payload it owned until then.

use bytes::Bytes;
use forge3d_core::GenerationKind;
use serde_json::Value;

/// One generation request, closed over its payload. Replaces a
/// stringly-typed `{type, ...}` dictionary with a tagged variant per
/// kind.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Mesh { image_bytes: Bytes, options: Option<Value> },
    Image { prompt: String, options: Option<Value> },
    Full { prompt: String, options: Option<Value> },
}

impl GenerationRequest {
    pub fn kind(&self) -> GenerationKind {
        match self {
            Self::Mesh { .. } => GenerationKind::Mesh,
            Self::Image { .. } => GenerationKind::Image,
            Self::Full { .. } => GenerationKind::Full,
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            Self::Image { prompt, .. } | Self::Full { prompt, .. } => Some(prompt),
            Self::Mesh { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
