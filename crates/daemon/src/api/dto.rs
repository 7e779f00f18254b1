// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire DTOs: the domain types in `forge3d-core`/`forge3d-session` carry
//! Unix-millisecond timestamps for SQLite portability; these wrappers
//! re-expose them as RFC3339 strings for API responses, the same split the
//! teacher keeps between its internal event timestamps and the wire
//! protocol's human-readable ones.

use chrono::{TimeZone, Utc};
use forge3d_core::{Asset, HistoryEntry, Progress, Project, SessionStateKind};
use forge3d_session::SessionHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn rfc3339(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now).to_rfc3339()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Project> for ProjectDto {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            description: p.description.clone(),
            created_at: rfc3339(p.created_at_ms),
            updated_at: rfc3339(p.updated_at_ms),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectDetailDto {
    #[serde(flatten)]
    pub project: ProjectDto,
    pub assets: Vec<AssetDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssetDto {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub kind: String,
    pub file_size: u64,
    pub metadata: serde_json::Value,
    pub created_at: String,
}

impl From<&Asset> for AssetDto {
    fn from(a: &Asset) -> Self {
        Self {
            id: a.id.to_string(),
            project_id: a.project_id.to_string(),
            name: a.name.clone(),
            kind: a.kind.to_string(),
            file_size: a.file_size,
            metadata: a.metadata.clone(),
            created_at: rfc3339(a.created_at_ms),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryDto {
    pub id: String,
    pub asset_id: Option<String>,
    pub project_id: Option<String>,
    pub kind: String,
    pub prompt: Option<String>,
    pub status: String,
    pub generation_time_seconds: Option<f64>,
    pub vram_usage_mb: Option<f64>,
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<&HistoryEntry> for HistoryDto {
    fn from(h: &HistoryEntry) -> Self {
        Self {
            id: h.id.to_string(),
            asset_id: h.asset_id.map(|a| a.to_string()),
            project_id: h.project_id.map(|p| p.to_string()),
            kind: h.kind.to_string(),
            prompt: h.prompt.clone(),
            status: h.status.to_string(),
            generation_time_seconds: h.generation_time_seconds,
            vram_usage_mb: h.vram_usage_mb,
            error_message: h.error_message.clone(),
            metadata: h.metadata.clone(),
            created_at: rfc3339(h.created_at_ms),
            completed_at: h.completed_at_ms.map(rfc3339),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressDto {
    pub stage: &'static str,
    pub percent: u8,
}

impl From<Progress> for ProgressDto {
    fn from(p: Progress) -> Self {
        Self { stage: stage_tag(p.stage), percent: p.percent }
    }
}

fn stage_tag(stage: forge3d_core::Stage) -> &'static str {
    match stage {
        forge3d_core::Stage::Image => "image",
        forge3d_core::Stage::Mesh => "mesh",
    }
}

#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub id: String,
    pub history_id: String,
    pub project_id: Option<String>,
    pub kind: String,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub progress: ProgressDto,
    pub created_at: String,
}

impl From<&Arc<SessionHandle>> for SessionDto {
    fn from(h: &Arc<SessionHandle>) -> Self {
        let state = h.state();
        let error = match &state {
            forge3d_core::SessionState::Failed { error } => Some(error.clone()),
            _ => None,
        };
        Self {
            id: h.id().to_string(),
            history_id: h.history_id().to_string(),
            project_id: h.project_id().map(|p| p.to_string()),
            kind: h.kind().to_string(),
            state: state_tag(SessionStateKind::from(&state)),
            error,
            progress: h.progress().into(),
            created_at: rfc3339(h.created_at_ms()),
        }
    }
}

fn state_tag(kind: SessionStateKind) -> &'static str {
    match kind {
        SessionStateKind::Idle => "idle",
        SessionStateKind::GeneratingImage => "generating_image",
        SessionStateKind::GeneratingMesh => "generating_mesh",
        SessionStateKind::Complete => "complete",
        SessionStateKind::Failed => "failed",
    }
}

/// Builds a `SessionDto` directly from a `HistoryEntry`, for `/status` and
/// `/download` lookups that land outside the in-memory
/// [`forge3d_session::SessionRegistry`] — a still-`queued` job (no
/// `Session` exists until dequeue) or one whose `SessionHandle` has since
/// been evicted from the registry's bounded ring. `HistoryStatus` carries
/// less detail than `SessionState` (no distinction between the image and
/// mesh stages of `processing`), so this is necessarily an approximation:
/// `queued` reads as `idle`, `processing` as `generating_image`.
impl From<&HistoryEntry> for SessionDto {
    fn from(h: &HistoryEntry) -> Self {
        let state = match h.status {
            forge3d_core::HistoryStatus::Queued => "idle",
            forge3d_core::HistoryStatus::Processing => "generating_image",
            forge3d_core::HistoryStatus::Complete => "complete",
            forge3d_core::HistoryStatus::Failed => "failed",
        };
        Self {
            id: h.id.to_string(),
            history_id: h.id.to_string(),
            project_id: h.project_id.map(|p| p.to_string()),
            kind: h.kind.to_string(),
            state,
            error: h.error_message.clone(),
            progress: ProgressDto { stage: "image", percent: 0 },
            created_at: rfc3339(h.created_at_ms),
        }
    }
}
