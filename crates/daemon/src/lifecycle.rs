// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup, serve loop, and drain-stop shutdown — a single linear
//! sequence so crash recovery always runs before any request can reach
//! the scheduler, cut down to what this orchestrator actually needs (one
//! TCP listener and no WAL/snapshot state of its own — that durability
//! lives entirely in the `Store`).
//!
//! Startup order:
//! 1. Resolve paths, acquire the exclusive lock file.
//! 2. Open the `Store` (applies migrations) and run `recover_orphans`.
//! 3. Open the `AssetStore`.
//! 4. Wire `TelemetryHub` / `InferenceBridge` / `Scheduler` / `SessionRegistry`.
//! 5. Bind the HTTP listener.
//! 6. Only then does `run` spawn the bridge, the scheduler loop, and start
//!    serving — no enqueue request can reach the scheduler before step 2
//!    has run to completion.

use std::fs::File;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fs2::FileExt;
use forge3d_assets::AssetStore;
use forge3d_bridge::InferenceBridge;
use forge3d_core::{Clock, SystemClock};
use forge3d_scheduler::{Scheduler, SchedulerDeps};
use forge3d_session::SessionRegistry;
use forge3d_store::Store;
use forge3d_telemetry::TelemetryHub;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::app::AppState;
use crate::config::Config;
use crate::error::LifecycleError;

/// Filesystem locations derived from the state directory, resolved once at
/// the start of `startup` before anything is opened or bound.
#[derive(Debug, Clone)]
pub struct Paths {
    pub state_dir: PathBuf,
    pub lock_path: PathBuf,
    pub config_path: PathBuf,
}

impl Paths {
    pub fn resolve() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        let config_path = crate::env::config_path()?;
        Ok(Self { lock_path: state_dir.join("orchestrator.lock"), state_dir, config_path })
    }
}

/// Everything `main` needs to start serving: the wired [`AppState`], a
/// bound listener, the resolved config (for the bridge health-probe
/// interval), and a shutdown token shared with the scheduler's run loop.
pub struct Startup {
    pub state: AppState,
    pub listener: TcpListener,
    pub config: Config,
    pub shutdown: CancellationToken,
    paths: Paths,
    /// Held for the daemon's lifetime — dropping it releases the lock.
    #[allow(dead_code)]
    lock_file: File,
}

/// Run the ordered startup sequence. On failure, cleans up any files this
/// attempt created — unless the failure was a lock conflict, in which case
/// those files belong to the daemon already holding the lock.
pub async fn startup() -> Result<Startup, LifecycleError> {
    match startup_inner().await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !e.is_lock_conflict() {
                if let Ok(paths) = Paths::resolve() {
                    cleanup_on_failure(&paths);
                }
            }
            Err(e)
        }
    }
}

async fn startup_inner() -> Result<Startup, LifecycleError> {
    let paths = Paths::resolve()?;
    std::fs::create_dir_all(&paths.state_dir)?;

    // Acquire the lock before touching anything else — a second daemon
    // instance must fail fast rather than race the first for the store.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|e| LifecycleError::LockFailed(paths.lock_path.clone(), e))?;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    let config = Config::load(&paths.config_path)?;
    let store_path = config.resolved_store_path(&paths.state_dir);
    let asset_root = config.resolved_asset_root(&paths.state_dir);

    // Step 2: open the store (migrations run inside `Store::open`) and
    // recover orphaned `processing` rows *before* anything else can admit
    // new work.
    let store = Store::open(&store_path)?;
    let recovered = store.recover_orphans(SystemClock.epoch_ms() as i64)?;
    if recovered > 0 {
        tracing::warn!(count = recovered, "recovered rows orphaned by a prior crash");
    }

    let assets = AssetStore::open(&asset_root).await?;

    let telemetry = TelemetryHub::new(config.telemetry.ring_size, config.telemetry.latency_window);
    let bridge = Arc::new(InferenceBridge::new(config.bridge.clone().into(), telemetry.clone()));
    let sessions = Arc::new(SessionRegistry::with_default_capacity());
    let clock = SystemClock;
    let scheduler = Scheduler::new(SchedulerDeps {
        store: store.clone(),
        assets: assets.clone(),
        bridge: bridge.clone(),
        telemetry: telemetry.clone(),
        sessions: sessions.clone(),
        clock,
    });

    let listener = TcpListener::bind(("127.0.0.1", config.port))
        .await
        .map_err(|e| LifecycleError::BindFailed(format!("127.0.0.1:{}", config.port), e))?;

    let state = AppState { store, assets, bridge, telemetry, scheduler, sessions, clock };

    Ok(Startup { state, listener, config, shutdown: CancellationToken::new(), paths, lock_file })
}

/// Serve until `startup.shutdown` is cancelled (by `main`'s signal
/// handler), then drain-stop: the scheduler loop and the HTTP acceptor
/// both observe the same token, so no new request is admitted and no new
/// job is dequeued once shutdown begins, while whatever Session is already
/// `processing` is allowed to run to its terminal state (or its own
/// per-call timeout) before the bridge is stopped.
pub async fn run(startup: Startup) -> Result<(), LifecycleError> {
    let Startup { state, listener, config, shutdown, paths, lock_file } = startup;

    if let Err(e) = state.bridge.spawn().await {
        tracing::warn!(error = %e, "inference worker did not start cleanly at boot; scheduler will wait for it");
    }

    let health_task = tokio::spawn(health_probe_loop(
        state.bridge.clone(),
        config.bridge.health_interval_s,
        shutdown.clone(),
    ));
    let scheduler_task = tokio::spawn(state.scheduler.clone().spawn(shutdown.clone()));

    let router = crate::app::build_router(state.clone());
    let shutdown_signal = shutdown.clone();
    let serve_result = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal.cancelled().await;
        })
        .await;
    if let Err(e) = serve_result {
        tracing::error!(error = %e, "HTTP server exited with an error");
    }

    // The HTTP server only returns once the shutdown signal fired (or it
    // errored outright) — make sure the scheduler and bridge see the same
    // signal even in the error case.
    shutdown.cancel();
    let _ = scheduler_task.await;
    health_task.abort();
    state.bridge.stop().await;

    drop(lock_file);
    cleanup_on_shutdown(&paths);
    Ok(())
}

/// One health probe tick per `bridge.health_interval_s`, as long as the
/// bridge is `running` (`probe_health` itself is a no-op otherwise).
async fn health_probe_loop(bridge: Arc<InferenceBridge>, interval_s: u64, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_s.max(1)));
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = interval.tick() => bridge.probe_health().await,
        }
    }
}

fn cleanup_on_failure(paths: &Paths) {
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

fn cleanup_on_shutdown(paths: &Paths) {
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
