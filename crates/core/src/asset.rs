// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Asset entity — a persisted generation output belonging to a project.

use crate::kind::GenerationKind;
use crate::project::ProjectId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an asset.
    pub struct AssetId;
}

/// Maximum size, in bytes, of an asset's opaque metadata blob.
pub const ASSET_METADATA_MAX_BYTES: usize = 64 * 1024;

/// A persisted generation output.
///
/// Invariant: whenever this row exists in the store, `file_path` exists on
/// disk (AssetStore and Store create row+file atomically together).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub project_id: ProjectId,
    pub name: String,
    pub kind: GenerationKind,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
    pub file_size: u64,
    pub metadata: serde_json::Value,
    pub created_at_ms: i64,
}

impl Asset {
    pub fn validate_metadata(metadata: &serde_json::Value) -> Result<(), crate::Error> {
        let size = serde_json::to_vec(metadata).map(|v| v.len()).unwrap_or(0);
        if size > ASSET_METADATA_MAX_BYTES {
            return Err(crate::Error::InvalidArgument(format!(
                "asset metadata exceeds {} bytes",
                ASSET_METADATA_MAX_BYTES
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "asset_tests.rs"]
mod tests;
