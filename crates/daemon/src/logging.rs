// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging setup: `tracing` + `tracing-subscriber` with an
//! `EnvFilter` (`RUST_LOG`, defaulting to `info`), writing to stderr and,
//! if a log path is given, also to a daily-rotating file via
//! `tracing-appender`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. Returns a guard that must be kept
/// alive for the lifetime of the process when a file appender is in use —
/// dropping it early truncates buffered log lines.
///
/// `log_dir` is the daemon's state directory; the file sink writes
/// `forge3d-orchestrator.log` there, rotated daily.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "forge3d-orchestrator.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let writer = std::io::stderr.and(file_writer);
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}
