// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Store` handle.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use forge3d_core::{
    Asset, AssetId, Error, GenerationKind, HistoryEntry, HistoryFilter, HistoryId, HistoryStatus,
    Project, ProjectId, ORPHANED_ERROR_MESSAGE,
};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::rows::{asset_from_row, history_from_row, project_from_row};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Aggregate counters returned by `GET /stats`.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Stats {
    pub total_projects: i64,
    pub total_assets: i64,
    pub queued: i64,
    pub processing: i64,
    pub complete: i64,
    pub failed: i64,
}

/// Partial update applied to a `HistoryEntry` row by `update_history_status`.
#[derive(Debug, Clone, Default)]
pub struct HistoryUpdate {
    pub status: Option<HistoryStatus>,
    pub asset_id: Option<AssetId>,
    pub generation_time_seconds: Option<f64>,
    pub vram_usage_mb: Option<f64>,
    pub error_message: Option<String>,
    pub completed_at_ms: Option<i64>,
}

/// Durable relational store. Cheap to clone; internally synchronized with a
/// single connection guarded by a mutex (single-writer by construction —
/// concurrent callers serialize on the mutex rather than racing SQLite's own
/// busy handler, but the busy timeout still bounds how long a stuck writer
/// can block everyone else).
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

fn sql_err(context: &str, e: rusqlite::Error) -> Error {
    if matches!(e, rusqlite::Error::SqliteFailure(ref err, _) if err.code == rusqlite::ErrorCode::DatabaseBusy)
    {
        Error::Busy(format!("{context}: {e}"))
    } else {
        Error::Fatal(format!("{context}: {e}"))
    }
}

impl Store {
    /// Open (creating if absent) the SQLite database at `path`, enable WAL
    /// journal mode and the 5s busy timeout, enforce foreign keys, and apply
    /// any pending migrations.
    pub fn open(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Fatal(format!("failed to create store directory: {e}")))?;
        }
        let mut conn = Connection::open(path)
            .map_err(|e| Error::Fatal(format!("failed to open store at {}: {e}", path.display())))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| Error::Fatal(format!("failed to set busy_timeout: {e}")))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_row| Ok(()))
            .map_err(|e| Error::Fatal(format!("failed to enable WAL mode: {e}")))?;
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| Error::Fatal(format!("failed to enable foreign keys: {e}")))?;
        crate::migrations::apply(&mut conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// In-memory store, for tests.
    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self, Error> {
        let mut conn = Connection::open_in_memory()
            .map_err(|e| Error::Fatal(format!("failed to open in-memory store: {e}")))?;
        conn.pragma_update(None, "foreign_keys", true).ok();
        crate::migrations::apply(&mut conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    // ---- Projects ---------------------------------------------------

    pub fn create_project(&self, name: &str, description: &str, now_ms: i64) -> Result<Project, Error> {
        Project::validate_name(name)?;
        let project = Project {
            id: ProjectId::new(),
            name: name.to_string(),
            description: description.to_string(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO projects (id, name, description, created_at_ms, updated_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![project.id.as_str(), project.name, project.description, project.created_at_ms, project.updated_at_ms],
        )
        .map_err(|e| sql_err("create_project", e))?;
        Ok(project)
    }

    pub fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, Error> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, description, created_at_ms, updated_at_ms FROM projects WHERE id = ?1",
            params![id.as_str()],
            project_from_row,
        )
        .optional()
        .map_err(|e| sql_err("get_project", e))
    }

    /// Ordered by `created_at` descending.
    pub fn list_projects(&self) -> Result<Vec<Project>, Error> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, description, created_at_ms, updated_at_ms
                 FROM projects ORDER BY created_at_ms DESC",
            )
            .map_err(|e| sql_err("list_projects", e))?;
        let rows = stmt
            .query_map([], project_from_row)
            .map_err(|e| sql_err("list_projects", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(|e| sql_err("list_projects", e))
    }

    /// Cascades to assets (DB rows only — callers must remove the backing
    /// files via `AssetStore` *before* calling this, to avoid orphaning
    /// files on disk). History rows referencing this project or its assets have
    /// their references nulled rather than being deleted, via `ON DELETE
    /// SET NULL`. Idempotent: returns `false` if the project did not exist.
    pub fn delete_project(&self, id: &ProjectId) -> Result<bool, Error> {
        let conn = self.conn.lock();
        let changed = conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id.as_str()])
            .map_err(|e| sql_err("delete_project", e))?;
        Ok(changed > 0)
    }

    // ---- Assets -------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn create_asset(
        &self,
        project_id: &ProjectId,
        name: &str,
        kind: GenerationKind,
        file_path: &str,
        thumbnail_path: Option<&str>,
        file_size: u64,
        metadata: serde_json::Value,
        now_ms: i64,
    ) -> Result<Asset, Error> {
        Asset::validate_metadata(&metadata)?;
        let asset = Asset {
            id: AssetId::new(),
            project_id: *project_id,
            name: name.to_string(),
            kind,
            file_path: file_path.to_string(),
            thumbnail_path: thumbnail_path.map(|s| s.to_string()),
            file_size,
            metadata,
            created_at_ms: now_ms,
        };
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO assets (id, project_id, name, kind, file_path, thumbnail_path, file_size, metadata, created_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                asset.id.as_str(),
                asset.project_id.as_str(),
                asset.name,
                asset.kind.to_string(),
                asset.file_path,
                asset.thumbnail_path,
                asset.file_size as i64,
                serde_json::to_string(&asset.metadata).unwrap_or_else(|_| "{}".to_string()),
                asset.created_at_ms,
            ],
        )
        .map_err(|e| sql_err("create_asset", e))?;
        Ok(asset)
    }

    pub fn get_asset(&self, id: &AssetId) -> Result<Option<Asset>, Error> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, project_id, name, kind, file_path, thumbnail_path, file_size, metadata, created_at_ms
             FROM assets WHERE id = ?1",
            params![id.as_str()],
            asset_from_row,
        )
        .optional()
        .map_err(|e| sql_err("get_asset", e))
    }

    pub fn list_assets(&self, project_id: &ProjectId) -> Result<Vec<Asset>, Error> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, project_id, name, kind, file_path, thumbnail_path, file_size, metadata, created_at_ms
                 FROM assets WHERE project_id = ?1 ORDER BY created_at_ms DESC",
            )
            .map_err(|e| sql_err("list_assets", e))?;
        let rows = stmt
            .query_map(params![project_id.as_str()], asset_from_row)
            .map_err(|e| sql_err("list_assets", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(|e| sql_err("list_assets", e))
    }

    /// Idempotent: returns `false` if the asset did not exist.
    pub fn delete_asset(&self, id: &AssetId) -> Result<bool, Error> {
        let conn = self.conn.lock();
        let changed = conn
            .execute("DELETE FROM assets WHERE id = ?1", params![id.as_str()])
            .map_err(|e| sql_err("delete_asset", e))?;
        Ok(changed > 0)
    }

    // ---- History --------------------------------------------------------

    /// Insert a new history row, normally in `Queued` status (the scheduler
    /// admission linearization point — see `forge3d-scheduler`).
    pub fn record_history(&self, entry: &HistoryEntry) -> Result<(), Error> {
        HistoryEntry::validate_prompt(entry.prompt.as_deref().unwrap_or(""))?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO history
                (id, asset_id, project_id, kind, prompt, status, generation_time_seconds,
                 vram_usage_mb, error_message, metadata, created_at_ms, completed_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                entry.id.as_str(),
                entry.asset_id.as_ref().map(|a| a.as_str().to_string()),
                entry.project_id.as_ref().map(|p| p.as_str().to_string()),
                entry.kind.to_string(),
                entry.prompt,
                entry.status.to_string(),
                entry.generation_time_seconds,
                entry.vram_usage_mb,
                entry.error_message,
                serde_json::to_string(&entry.metadata).unwrap_or_else(|_| "{}".to_string()),
                entry.created_at_ms,
                entry.completed_at_ms,
            ],
        )
        .map_err(|e| sql_err("record_history", e))?;
        Ok(())
    }

    pub fn get_history(&self, id: &HistoryId) -> Result<Option<HistoryEntry>, Error> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, asset_id, project_id, kind, prompt, status, generation_time_seconds,
                    vram_usage_mb, error_message, metadata, created_at_ms, completed_at_ms
             FROM history WHERE id = ?1",
            params![id.as_str()],
            history_from_row,
        )
        .optional()
        .map_err(|e| sql_err("get_history", e))
    }

    /// The oldest row still in `queued` status, if any. This is the
    /// authoritative FIFO order the scheduler admits work in: the
    /// `created_at` ordering of `status = queued` rows.
    pub fn oldest_queued(&self) -> Result<Option<HistoryEntry>, Error> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, asset_id, project_id, kind, prompt, status, generation_time_seconds,
                    vram_usage_mb, error_message, metadata, created_at_ms, completed_at_ms
             FROM history WHERE status = 'queued'
             ORDER BY created_at_ms ASC, id ASC
             LIMIT 1",
            [],
            history_from_row,
        )
        .optional()
        .map_err(|e| sql_err("oldest_queued", e))
    }

    /// Apply a partial update to a history row. Validates that `status`
    /// (when present) is a legal transition from the row's current status
    /// and returns `Error::Conflict` otherwise.
    pub fn update_history_status(&self, id: &HistoryId, update: HistoryUpdate) -> Result<(), Error> {
        let conn = self.conn.lock();
        let current_status: String = conn
            .query_row("SELECT status FROM history WHERE id = ?1", params![id.as_str()], |r| r.get(0))
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    Error::NotFound(format!("history entry {id} not found"))
                }
                e => sql_err("update_history_status", e),
            })?;
        let current = HistoryStatus::from_str_loose(&current_status)
            .ok_or_else(|| Error::Fatal(format!("corrupt status value {current_status:?}")))?;

        if let Some(next) = update.status {
            if !current.can_transition_to(next) {
                return Err(Error::Conflict(format!(
                    "cannot transition history entry {id} from {current} to {next}"
                )));
            }
        }

        conn.execute(
            "UPDATE history SET
                status = COALESCE(?2, status),
                asset_id = COALESCE(?3, asset_id),
                generation_time_seconds = COALESCE(?4, generation_time_seconds),
                vram_usage_mb = COALESCE(?5, vram_usage_mb),
                error_message = COALESCE(?6, error_message),
                completed_at_ms = COALESCE(?7, completed_at_ms)
             WHERE id = ?1",
            params![
                id.as_str(),
                update.status.map(|s| s.to_string()),
                update.asset_id.map(|a| a.as_str().to_string()),
                update.generation_time_seconds,
                update.vram_usage_mb,
                update.error_message,
                update.completed_at_ms,
            ],
        )
        .map_err(|e| sql_err("update_history_status", e))?;
        Ok(())
    }

    pub fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>, Error> {
        let mut sql = String::from(
            "SELECT id, asset_id, project_id, kind, prompt, status, generation_time_seconds,
                    vram_usage_mb, error_message, metadata, created_at_ms, completed_at_ms
             FROM history WHERE 1 = 1",
        );
        if filter.project_id.is_some() {
            sql.push_str(" AND project_id = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.kind.is_some() {
            sql.push_str(" AND kind = ?");
        }
        sql.push_str(" ORDER BY created_at_ms DESC");
        let limit = filter.limit.unwrap_or(100).min(1000);
        sql.push_str(" LIMIT ?");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql).map_err(|e| sql_err("list_history", e))?;

        // Bind in the same order the clauses were appended above.
        let mut idx = 1;
        if let Some(p) = &filter.project_id {
            stmt.raw_bind_parameter(idx, p.as_str()).map_err(|e| sql_err("list_history", e))?;
            idx += 1;
        }
        if let Some(s) = filter.status {
            stmt.raw_bind_parameter(idx, s.to_string()).map_err(|e| sql_err("list_history", e))?;
            idx += 1;
        }
        if let Some(k) = filter.kind {
            stmt.raw_bind_parameter(idx, k.to_string()).map_err(|e| sql_err("list_history", e))?;
            idx += 1;
        }
        stmt.raw_bind_parameter(idx, limit as i64).map_err(|e| sql_err("list_history", e))?;

        let rows = stmt
            .raw_query()
            .mapped(|row| history_from_row(row))
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| sql_err("list_history", e))?;
        Ok(rows)
    }

    pub fn get_stats(&self) -> Result<Stats, Error> {
        let conn = self.conn.lock();
        let mut stats = Stats {
            total_projects: conn
                .query_row("SELECT COUNT(*) FROM projects", [], |r| r.get(0))
                .map_err(|e| sql_err("get_stats", e))?,
            total_assets: conn
                .query_row("SELECT COUNT(*) FROM assets", [], |r| r.get(0))
                .map_err(|e| sql_err("get_stats", e))?,
            ..Default::default()
        };
        let mut stmt = conn
            .prepare("SELECT status, COUNT(*) FROM history GROUP BY status")
            .map_err(|e| sql_err("get_stats", e))?;
        let counts = stmt
            .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))
            .map_err(|e| sql_err("get_stats", e))?;
        for row in counts {
            let (status, count) = row.map_err(|e| sql_err("get_stats", e))?;
            match HistoryStatus::from_str_loose(&status) {
                Some(HistoryStatus::Queued) => stats.queued = count,
                Some(HistoryStatus::Processing) => stats.processing = count,
                Some(HistoryStatus::Complete) => stats.complete = count,
                Some(HistoryStatus::Failed) => stats.failed = count,
                None => {}
            }
        }
        Ok(stats)
    }

    /// Crash-recovery step, run at startup before admitting new work:
    /// every row left in `processing` by a prior crash is demoted to
    /// `failed`. Must run exactly once at startup, before the scheduler
    /// admits new work. Returns the number of rows recovered.
    pub fn recover_orphans(&self, now_ms: i64) -> Result<u64, Error> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE history
                 SET status = 'failed', error_message = ?1, completed_at_ms = ?2
                 WHERE status = 'processing'",
                params![ORPHANED_ERROR_MESSAGE, now_ms],
            )
            .map_err(|e| sql_err("recover_orphans", e))?;
        Ok(changed as u64)
    }
}

#[cfg(test)]
#[path = "store_impl_tests.rs"]
mod store_impl_tests;
