// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two on-disk failure artifacts: `errors.jsonl` (an append-only line
//! per error, for *every* `Fatal`-class failure, including ones the
//! process recovers from) and `crash-report-<ts>.json` (written only on
//! the fatal paths that actually abort the process).

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorLine<'a> {
    timestamp_ms: u64,
    message: &'a str,
}

/// Append one line to `<state_dir>/errors.jsonl`. Best-effort: a failure to
/// write the error log is itself only logged via `tracing`, never
/// propagated, since the process is already in a degraded path when this
/// is called.
pub fn append_error_line(state_dir: &Path, epoch_ms: u64, message: &str) {
    let path = state_dir.join("errors.jsonl");
    let line = ErrorLine { timestamp_ms: epoch_ms, message };
    let serialized = match serde_json::to_string(&line) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize error log line");
            return;
        }
    };
    let result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| writeln!(file, "{serialized}"));
    if let Err(e) = result {
        tracing::error!(error = %e, path = %path.display(), "failed to append to errors.jsonl");
    }
}

#[derive(Debug, Serialize)]
struct CrashReport<'a> {
    timestamp_ms: u64,
    reason: &'a str,
    version: &'static str,
}

/// Write `crash-report-<epoch_ms>.json` to `state_dir`, for the handful of
/// fatal startup failures (exit code 1 — store unopenable, asset root
/// unwritable, port unbindable) where `main` is about to abort. Returns
/// the path written, for inclusion in the exit-time log line.
pub fn write_crash_report(state_dir: &Path, epoch_ms: u64, reason: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(state_dir)?;
    let path = state_dir.join(format!("crash-report-{epoch_ms}.json"));
    let report = CrashReport { timestamp_ms: epoch_ms, reason, version: env!("CARGO_PKG_VERSION") };
    let body = serde_json::to_string_pretty(&report)
        .unwrap_or_else(|_| format!("{{\"reason\":{reason:?}}}"));
    std::fs::write(&path, body)?;
    Ok(path)
}

#[cfg(test)]
#[path = "crash_report_tests.rs"]
mod tests;
