// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `forge3d-orchestrator`: process entry point. Everything interesting
//! lives in the library (`forge3d_daemon`) — this binary only wires
//! logging, runs the startup sequence, waits for a shutdown signal, and
//! translates failures into exit codes (0 clean, 1 fatal initialization
//! failure).

use forge3d_core::{Clock, SystemClock};
use forge3d_daemon::lifecycle;
use tokio::signal::unix::{signal, SignalKind};

#[tokio::main]
async fn main() {
    let state_dir = forge3d_daemon::env::state_dir().ok();
    let _log_guard = forge3d_daemon::logging::init(state_dir.as_deref());

    let startup = match lifecycle::startup().await {
        Ok(startup) => startup,
        Err(e) => {
            fatal_exit(&e);
        }
    };

    tracing::info!(port = startup.listener.local_addr().map(|a| a.port()).unwrap_or_default(), "forge3d-orchestrator listening");

    let shutdown = startup.shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("shutdown signal received, draining in-flight work");
        shutdown.cancel();
    });

    if let Err(e) = lifecycle::run(startup).await {
        fatal_exit(&e);
    }

    tracing::info!("forge3d-orchestrator exited cleanly");
}

/// Waits for either Ctrl-C or SIGTERM — whichever arrives first triggers
/// the drain-stop sequence in `lifecycle::run`.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let sigterm = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm => {}
    }
}

/// Log, write the two on-disk failure artifacts ("errors.jsonl",
/// "crash-report-<ts>.json"), and exit with code 1 — the only class of
/// failure this process ever aborts for.
fn fatal_exit(e: &forge3d_daemon::LifecycleError) -> ! {
    let epoch_ms = SystemClock.epoch_ms();
    tracing::error!(error = %e, "fatal initialization failure");
    if let Ok(state_dir) = forge3d_daemon::env::state_dir() {
        forge3d_daemon::crash_report::append_error_line(&state_dir, epoch_ms, &e.to_string());
        match forge3d_daemon::crash_report::write_crash_report(&state_dir, epoch_ms, &e.to_string()) {
            Ok(path) => tracing::error!(path = %path.display(), "wrote crash report"),
            Err(write_err) => tracing::error!(error = %write_err, "failed to write crash report"),
        }
    }
    std::process::exit(1);
}
