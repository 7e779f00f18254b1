// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row <-> domain type mapping, kept separate from `store.rs` so the SQL
//! statements stay readable.

use forge3d_core::{
    Asset, AssetId, GenerationKind, HistoryEntry, HistoryId, HistoryStatus, Project, ProjectId,
};
use rusqlite::{Error as SqlError, Row};

pub(crate) fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: ProjectId::from_string(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        created_at_ms: row.get(3)?,
        updated_at_ms: row.get(4)?,
    })
}

pub(crate) fn asset_from_row(row: &Row) -> rusqlite::Result<Asset> {
    let kind_str: String = row.get(3)?;
    let metadata_str: String = row.get(7)?;
    Ok(Asset {
        id: AssetId::from_string(row.get::<_, String>(0)?),
        project_id: ProjectId::from_string(row.get::<_, String>(1)?),
        name: row.get(2)?,
        kind: parse_kind(&kind_str)?,
        file_path: row.get(4)?,
        thumbnail_path: row.get(5)?,
        file_size: row.get::<_, i64>(6)? as u64,
        metadata: parse_json(&metadata_str)?,
        created_at_ms: row.get(8)?,
    })
}

pub(crate) fn history_from_row(row: &Row) -> rusqlite::Result<HistoryEntry> {
    let kind_str: String = row.get(3)?;
    let status_str: String = row.get(5)?;
    let metadata_str: String = row.get(9)?;
    Ok(HistoryEntry {
        id: HistoryId::from_string(row.get::<_, String>(0)?),
        asset_id: row.get::<_, Option<String>>(1)?.map(AssetId::from_string),
        project_id: row.get::<_, Option<String>>(2)?.map(ProjectId::from_string),
        kind: parse_kind(&kind_str)?,
        prompt: row.get(4)?,
        status: parse_status(&status_str)?,
        generation_time_seconds: row.get(6)?,
        vram_usage_mb: row.get(7)?,
        error_message: row.get(8)?,
        metadata: parse_json(&metadata_str)?,
        created_at_ms: row.get(10)?,
        completed_at_ms: row.get(11)?,
    })
}

fn parse_kind(s: &str) -> rusqlite::Result<GenerationKind> {
    GenerationKind::from_str_loose(s)
        .ok_or_else(|| SqlError::InvalidColumnType(3, format!("bad kind {s:?}"), rusqlite::types::Type::Text))
}

fn parse_status(s: &str) -> rusqlite::Result<HistoryStatus> {
    HistoryStatus::from_str_loose(s)
        .ok_or_else(|| SqlError::InvalidColumnType(5, format!("bad status {s:?}"), rusqlite::types::Type::Text))
}

fn parse_json(s: &str) -> rusqlite::Result<serde_json::Value> {
    serde_json::from_str(s).map_err(|e| {
        SqlError::InvalidColumnType(0, format!("bad json: {e}"), rusqlite::types::Type::Text)
    })
}
