// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project entity — a named container that exclusively owns its assets.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a project.
    pub struct ProjectId;
}

/// A named container for generation outputs.
///
/// `created_at`/`updated_at` are Unix milliseconds; `updated_at` advances
/// monotonically on every mutation (Store responsibility, not this struct's).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Maximum byte length of a project name.
pub const PROJECT_NAME_MAX_BYTES: usize = 256;

impl Project {
    /// Validate a project name per the data-model contract: non-empty UTF-8,
    /// at most 256 bytes.
    pub fn validate_name(name: &str) -> Result<(), crate::Error> {
        if name.is_empty() {
            return Err(crate::Error::InvalidArgument("project name must not be empty".into()));
        }
        if name.len() > PROJECT_NAME_MAX_BYTES {
            return Err(crate::Error::InvalidArgument(format!(
                "project name exceeds {} bytes",
                PROJECT_NAME_MAX_BYTES
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
