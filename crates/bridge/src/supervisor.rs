// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervision for the inference worker: spawn, a reaper task,
//! and a readiness poll loop, plus health-probe/restart bookkeeping
//! (consecutive failures, rolling restart budget).

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use forge3d_core::{BridgeState, TelemetryEvent};
use forge3d_telemetry::TelemetryHub;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tokio::sync::watch;

use crate::client::WorkerClient;
use crate::port;
use crate::types::BridgeConfig;

/// Tracks consecutive health failures and the rolling 60s restart window
/// used to decide `crashed -> broken`.
struct RestartBudget {
    restarts: VecDeque<Instant>,
    budget: u32,
}

impl RestartBudget {
    fn new(budget: u32) -> Self {
        Self { restarts: VecDeque::new(), budget }
    }

    /// Record a restart attempt now; returns true if the budget (restarts
    /// within the trailing 60s) is exhausted.
    fn record_and_check_exhausted(&mut self) -> bool {
        let now = Instant::now();
        self.restarts.push_back(now);
        while let Some(&front) = self.restarts.front() {
            if now.duration_since(front) > Duration::from_secs(60) {
                self.restarts.pop_front();
            } else {
                break;
            }
        }
        self.restarts.len() as u32 >= self.budget
    }
}

struct Worker {
    client: WorkerClient,
    port: u16,
    pid: u32,
}

/// Owns exactly one external inference worker process.
pub struct InferenceBridge {
    config: BridgeConfig,
    telemetry: TelemetryHub,
    state_tx: watch::Sender<BridgeState>,
    state_rx: watch::Receiver<BridgeState>,
    worker: Mutex<Option<Worker>>,
    restart_budget: Mutex<RestartBudget>,
    consecutive_health_failures: Mutex<u32>,
    stderr_tail: Mutex<String>,
    /// Set while `stop()` is tearing the worker down deliberately, so the
    /// reaper task for that child doesn't also report it as an unexpected
    /// crash once the signalled process exits.
    stopping: AtomicBool,
}

impl InferenceBridge {
    pub fn new(config: BridgeConfig, telemetry: TelemetryHub) -> Self {
        let (state_tx, state_rx) = watch::channel(BridgeState::Stopped);
        Self {
            restart_budget: Mutex::new(RestartBudget::new(config.restart_budget)),
            config,
            telemetry,
            state_tx,
            state_rx,
            worker: Mutex::new(None),
            consecutive_health_failures: Mutex::new(0),
            stderr_tail: Mutex::new(String::new()),
            stopping: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> BridgeState {
        *self.state_rx.borrow()
    }

    /// A `watch::Receiver` for observing state transitions without
    /// polling a mutex (scheduler and the `/bridge` endpoint both hold
    /// their own clone).
    pub fn watch(&self) -> watch::Receiver<BridgeState> {
        self.state_rx.clone()
    }

    fn set_state(&self, state: BridgeState) {
        let _ = self.state_tx.send(state);
        self.telemetry.emit(TelemetryEvent::BridgeHealth { state });
    }

    /// Spawn the worker process and wait for it to report healthy, or
    /// fail the spawn. On timeout the bridge transitions to `crashed`
    /// rather than `stopped` since a restart is still warranted.
    ///
    /// Takes `self: &Arc<Self>` because the reaper task needs to call back
    /// into `on_crash` when the child exits on its own.
    pub async fn spawn(self: &Arc<Self>) -> Result<(), forge3d_core::Error> {
        self.stopping.store(false, Ordering::SeqCst);
        self.set_state(BridgeState::Starting);
        let (lo, hi) = self.config.port_range;
        let Some(port) = port::acquire(lo, hi) else {
            self.set_state(BridgeState::Crashed);
            return Err(forge3d_core::Error::BridgeUnavailable(
                "no free port in configured range".to_string(),
            ));
        };

        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .arg("--port")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.set_state(BridgeState::Crashed);
                return Err(forge3d_core::Error::BridgeUnavailable(format!(
                    "failed to spawn worker: {e}"
                )));
            }
        };
        let Some(pid) = child.id() else {
            self.set_state(BridgeState::Crashed);
            return Err(forge3d_core::Error::BridgeUnavailable(
                "worker exited before pid was observed".to_string(),
            ));
        };

        self.spawn_reaper(child, pid);
        self.telemetry.emit(TelemetryEvent::BridgeSpawn { pid });
        tracing::info!(pid, port, "inference worker spawned");

        let client = WorkerClient::new(port);
        if self.wait_for_ready(&client).await {
            *self.worker.lock() = Some(Worker { client, port, pid });
            *self.consecutive_health_failures.lock() = 0;
            self.set_state(BridgeState::Running);
            Ok(())
        } else {
            self.set_state(BridgeState::Crashed);
            Err(forge3d_core::Error::BridgeUnavailable(format!(
                "worker did not become healthy within {}s",
                self.config.startup_timeout_s
            )))
        }
    }

    /// Await the child's exit and, unless it died because `stop()` asked it
    /// to, feed the exit into `on_crash` so an unexpected process death
    /// still drives the bridge to `crashed`.
    fn spawn_reaper(self: &Arc<Self>, child: Child, pid: u32) {
        let bridge = Arc::clone(self);
        tokio::spawn(async move {
            let (exit_code, stderr_tail) = match child.wait_with_output().await {
                Ok(output) => {
                    let stderr_tail = tail(&output.stderr, 4096);
                    tracing::warn!(
                        exit_status = %output.status,
                        stderr = %stderr_tail,
                        "inference worker process exited"
                    );
                    (output.status.code(), stderr_tail)
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to wait on inference worker process");
                    (None, String::new())
                }
            };

            // Only report a crash if this reaper's child is still the
            // bridge's attached worker and the exit wasn't requested by
            // `stop()` — a graceful stop already set `Stopped` and doesn't
            // want this exit reinterpreted as a crash.
            let still_attached = bridge.worker.lock().as_ref().map(|w| w.pid) == Some(pid);
            if still_attached && !bridge.stopping.load(Ordering::SeqCst) {
                bridge.on_crash(exit_code, stderr_tail).await;
            }
        });
    }

    async fn wait_for_ready(&self, client: &WorkerClient) -> bool {
        let deadline = Instant::now() + Duration::from_secs(self.config.startup_timeout_s);
        let mut first = true;
        while Instant::now() < deadline {
            if !first {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            first = false;
            if client.health().await.is_ok() {
                return true;
            }
        }
        false
    }

    /// One health probe tick. Call on a 10s interval (`bridge.health_interval_s`)
    /// from the daemon's supervisory task while `running`.
    pub async fn probe_health(self: &Arc<Self>) {
        if self.state() != BridgeState::Running {
            return;
        }
        let client = { self.worker.lock().as_ref().map(|w| w.client.clone()) };
        let Some(client) = client else { return };
        if client.health().await.is_ok() {
            *self.consecutive_health_failures.lock() = 0;
            return;
        }
        let failures = {
            let mut failures = self.consecutive_health_failures.lock();
            *failures += 1;
            *failures
        };
        if failures >= self.config.health_failures_to_crash {
            self.on_crash(None, "health probe failed 3 consecutive times".to_string()).await;
        }
    }

    /// Transition to `crashed`, emit the crash event, and either schedule an
    /// automatic restart after the 5s cool-down or give up to `broken` once
    /// the rolling restart budget is exhausted.
    async fn on_crash(self: &Arc<Self>, exit_code: Option<i32>, stderr_tail: String) {
        *self.stderr_tail.lock() = stderr_tail.clone();
        *self.worker.lock() = None;
        self.set_state(BridgeState::Crashed);
        self.telemetry.emit(TelemetryEvent::BridgeCrash { exit_code, stderr_tail });

        let exhausted = self.restart_budget.lock().record_and_check_exhausted();
        if exhausted {
            self.set_state(BridgeState::Broken);
            return;
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        if let Err(e) = self.spawn().await {
            tracing::error!(error = %e, "automatic worker restart failed");
        }
    }

    /// Current worker HTTP client, if the bridge is in a state that can
    /// serve requests.
    pub fn client(&self) -> Result<WorkerClient, forge3d_core::Error> {
        if !self.state().accepts_requests() {
            return Err(forge3d_core::Error::BridgeUnavailable(format!(
                "bridge is {}",
                self.state()
            )));
        }
        self.worker
            .lock()
            .as_ref()
            .map(|w| w.client.clone())
            .ok_or_else(|| forge3d_core::Error::BridgeUnavailable("worker not attached".to_string()))
    }

    /// Listen port of the currently attached worker, if any.
    pub fn worker_port(&self) -> Option<u16> {
        self.worker.lock().as_ref().map(|w| w.port)
    }

    pub fn single_stage_timeout(&self) -> Duration {
        Duration::from_secs(self.config.single_stage_timeout_s)
    }

    pub fn full_timeout(&self) -> Duration {
        Duration::from_secs(self.config.full_timeout_s)
    }

    /// Graceful stop: SIGTERM, wait up to 5s, then SIGKILL.
    pub async fn stop(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        let pid = self.worker.lock().as_ref().map(|w| w.pid);
        let Some(pid) = pid else {
            self.set_state(BridgeState::Stopped);
            return;
        };
        let nix_pid = Pid::from_raw(pid as i32);
        let _ = signal::kill(nix_pid, Signal::SIGTERM);

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if signal::kill(nix_pid, None).is_err() {
                break; // process is gone
            }
            if Instant::now() >= deadline {
                let _ = signal::kill(nix_pid, Signal::SIGKILL);
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        *self.worker.lock() = None;
        self.set_state(BridgeState::Stopped);
    }
}

fn tail(bytes: &[u8], max_bytes: usize) -> String {
    let start = bytes.len().saturating_sub(max_bytes);
    String::from_utf8_lossy(&bytes[start..]).into_owned()
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
