// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded schema migrations, applied in order inside one write
//! transaction per `Store::open` call. Pending migrations with numbers
//! greater than the stored max are applied in order under a single write
//! transaction.

use forge3d_core::Error;
use rusqlite::Connection;

/// One migration: a monotonically increasing version number and the SQL
/// that moves the schema from `version - 1` to `version`.
struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: r#"
            CREATE TABLE projects (
                id             TEXT PRIMARY KEY,
                name           TEXT NOT NULL CHECK (length(name) > 0 AND length(name) <= 256),
                description    TEXT NOT NULL DEFAULT '',
                created_at_ms  INTEGER NOT NULL,
                updated_at_ms  INTEGER NOT NULL
            );

            CREATE TABLE assets (
                id              TEXT PRIMARY KEY,
                project_id      TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                name            TEXT NOT NULL,
                kind            TEXT NOT NULL CHECK (kind IN ('mesh', 'image', 'full')),
                file_path       TEXT NOT NULL,
                thumbnail_path  TEXT,
                file_size       INTEGER NOT NULL CHECK (file_size >= 0),
                metadata        TEXT NOT NULL DEFAULT '{}',
                created_at_ms   INTEGER NOT NULL
            );
            CREATE INDEX idx_assets_project ON assets(project_id);

            CREATE TABLE history (
                id                       TEXT PRIMARY KEY,
                asset_id                 TEXT REFERENCES assets(id) ON DELETE SET NULL,
                project_id               TEXT REFERENCES projects(id) ON DELETE SET NULL,
                kind                     TEXT NOT NULL CHECK (kind IN ('mesh', 'image', 'full')),
                prompt                   TEXT,
                status                   TEXT NOT NULL
                    CHECK (status IN ('queued', 'processing', 'complete', 'failed')),
                generation_time_seconds  REAL,
                vram_usage_mb            REAL,
                error_message            TEXT,
                metadata                 TEXT NOT NULL DEFAULT '{}',
                created_at_ms            INTEGER NOT NULL,
                completed_at_ms          INTEGER
            );
            CREATE INDEX idx_history_status_created ON history(status, created_at_ms);
            CREATE INDEX idx_history_project ON history(project_id);
        "#,
    },
];

/// Apply every migration whose version exceeds the stored maximum, inside a
/// single write transaction. Safe to call on every `Store::open`.
pub(crate) fn apply(conn: &mut Connection) -> Result<(), Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);
         INSERT INTO schema_version (version)
             SELECT 0 WHERE NOT EXISTS (SELECT 1 FROM schema_version);",
    )
    .map_err(|e| Error::Fatal(format!("failed to prepare schema_version table: {e}")))?;

    let current: i64 = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .map_err(|e| Error::Fatal(format!("failed to read schema_version: {e}")))?;

    let pending: Vec<&Migration> =
        MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .map_err(|e| Error::Fatal(format!("failed to start migration transaction: {e}")))?;
    for migration in &pending {
        tx.execute_batch(migration.sql).map_err(|e| {
            Error::Fatal(format!("migration {} failed: {e}", migration.version))
        })?;
    }
    let latest = pending.last().map(|m| m.version).unwrap_or(current);
    tx.execute("UPDATE schema_version SET version = ?1", [latest])
        .map_err(|e| Error::Fatal(format!("failed to record schema_version: {e}")))?;
    tx.commit().map_err(|e| Error::Fatal(format!("failed to commit migrations: {e}")))?;
    Ok(())
}
