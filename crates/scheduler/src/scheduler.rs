// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Scheduler`: FIFO admission against the `Store`'s `queued` rows,
//! single-in-flight execution against the `InferenceBridge` via a
//! [`forge3d_session::Session`], pause/resume, cancel-if-queued, and
//! startup recovery of orphaned in-flight jobs.
//!
//! The dequeue-and-start step is serialized by construction: the run loop
//! is a single task, and it `.await`s one Session to its terminal state
//! before looking at the queue again. The store's `queued -> processing`
//! update inside [`Scheduler::dequeue_and_run`] is the linearization
//! point; a crash after that point is cleaned up by `recover_orphans` at
//! next startup, never by this loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use forge3d_assets::AssetStore;
use forge3d_bridge::InferenceBridge;
use forge3d_core::{
    Clock, Error, GenerationKind, HistoryEntry, HistoryId, HistoryStatus, ProjectId,
    TelemetryEvent, BRIDGE_CRASH_ERROR_MESSAGE, CANCELLED_ERROR_MESSAGE,
    LOST_PAYLOAD_ERROR_MESSAGE,
};
use forge3d_session::{GenerationRequest, SessionDeps, SessionHandle, SessionRegistry};
use forge3d_store::{HistoryUpdate, Store};
use forge3d_telemetry::TelemetryHub;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::payloads::PayloadMap;
use crate::queue_state::QueueState;

/// Handles shared with a `Scheduler` at construction. Cheap to clone —
/// every field is itself a cheaply-cloneable handle, mirroring
/// `forge3d_session::SessionDeps`.
#[derive(Clone)]
pub struct SchedulerDeps<C: Clock> {
    pub store: Store,
    pub assets: AssetStore,
    pub bridge: Arc<InferenceBridge>,
    pub telemetry: TelemetryHub,
    pub sessions: Arc<SessionRegistry>,
    pub clock: C,
}

/// Result of a successful `enqueue`: the row persisted to the Store.
pub type EnqueueOutcome = HistoryEntry;

/// Owns the admission gate (`paused`), the one currently-processing
/// session (`current`), and the in-memory payload map. Everything else
/// durable lives in the `Store` it was constructed with.
pub struct Scheduler<C: Clock> {
    deps: SchedulerDeps<C>,
    payloads: PayloadMap,
    paused: AtomicBool,
    notify: Notify,
    current: Mutex<Option<Arc<SessionHandle>>>,
}

impl<C: Clock + 'static> Scheduler<C> {
    pub fn new(deps: SchedulerDeps<C>) -> Arc<Self> {
        Arc::new(Self {
            deps,
            payloads: PayloadMap::new(),
            paused: AtomicBool::new(false),
            notify: Notify::new(),
            current: Mutex::new(None),
        })
    }

    /// Startup recovery step: demote every row left in `processing` by a
    /// prior crash to `failed`. Must be called exactly once, before
    /// `spawn`, and before any `enqueue` call is admitted.
    pub fn recover_orphans(&self) -> Result<u64, Error> {
        self.deps.store.recover_orphans(self.deps.clock.epoch_ms() as i64)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Clears the pause gate and wakes the run loop. Does not affect
    /// work already in `processing` — it always runs to terminal.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn queue_state(&self) -> Result<QueueState, Error> {
        let stats = self.deps.store.get_stats()?;
        Ok(QueueState::from_stats(self.is_paused(), stats))
    }

    /// Admit one generation request: validates, persists a `queued`
    /// history row, and (for `mesh`) stashes the uploaded image bytes in
    /// the in-memory payload map. Never touches the bridge.
    pub fn enqueue(
        &self,
        kind: GenerationKind,
        project_id: Option<ProjectId>,
        prompt: Option<String>,
        image_bytes: Option<Bytes>,
        options: Option<Value>,
    ) -> Result<EnqueueOutcome, Error> {
        if matches!(kind, GenerationKind::Mesh) && image_bytes.is_none() {
            return Err(Error::InvalidArgument("mesh generation requires image bytes".to_string()));
        }
        if !matches!(kind, GenerationKind::Mesh) && prompt.as_deref().unwrap_or("").is_empty() {
            return Err(Error::InvalidArgument("prompt must not be empty".to_string()));
        }

        let now = self.deps.clock.epoch_ms() as i64;
        let entry = HistoryEntry {
            id: HistoryId::new(),
            asset_id: None,
            project_id,
            kind,
            prompt,
            status: HistoryStatus::Queued,
            generation_time_seconds: None,
            vram_usage_mb: None,
            error_message: None,
            metadata: options.unwrap_or(Value::Null),
            created_at_ms: now,
            completed_at_ms: None,
        };
        self.deps.store.record_history(&entry)?;
        if let Some(bytes) = image_bytes {
            self.payloads.insert(entry.id, bytes);
        }
        self.deps.telemetry.emit(TelemetryEvent::SchedulerQueued { history_id: entry.id });
        self.notify.notify_one();
        Ok(entry)
    }

    /// `cancel(job_id)`: idempotent, and never blocks on the bridge.
    ///
    /// - `queued`: atomic store transition to `failed(error="cancelled")`,
    ///   payload discarded.
    /// - `processing`: cooperative cancel of the owning Session, if it is
    ///   still the current one (handled asynchronously by the run loop).
    /// - terminal: no-op, reports success.
    pub fn cancel(&self, id: &HistoryId) -> Result<(), Error> {
        let entry = self
            .deps
            .store
            .get_history(id)?
            .ok_or_else(|| Error::NotFound(format!("history entry {id} not found")))?;

        match entry.status {
            HistoryStatus::Queued => {
                let now = self.deps.clock.epoch_ms() as i64;
                self.deps.store.update_history_status(
                    id,
                    HistoryUpdate {
                        status: Some(HistoryStatus::Failed),
                        error_message: Some(CANCELLED_ERROR_MESSAGE.to_string()),
                        completed_at_ms: Some(now),
                        ..Default::default()
                    },
                )?;
                self.payloads.discard(id);
                Ok(())
            }
            HistoryStatus::Processing => {
                if let Some(handle) = self.current.lock().clone() {
                    if handle.history_id() == id {
                        handle.cancel();
                    }
                }
                Ok(())
            }
            HistoryStatus::Complete | HistoryStatus::Failed => Ok(()),
        }
    }

    /// Run the admission loop until `shutdown` is cancelled. Intended to
    /// be `tokio::spawn`ed once from `main`; also spawns the bridge-crash
    /// watcher that fails the current session when the bridge reports a
    /// crash mid-generation.
    pub async fn spawn(self: Arc<Self>, shutdown: CancellationToken) {
        let crash_watcher = tokio::spawn(watch_for_bridge_crash(self.clone(), shutdown.clone()));
        self.run_loop(shutdown).await;
        crash_watcher.abort();
    }

    async fn run_loop(self: &Arc<Self>, shutdown: CancellationToken) {
        let mut bridge_watch = self.deps.bridge.watch();
        loop {
            if shutdown.is_cancelled() {
                return;
            }
            if self.is_paused() || !self.deps.bridge.state().allows_dequeue() {
                tokio::select! {
                    _ = shutdown.cancelled() => return,
                    _ = self.notify.notified() => {}
                    _ = bridge_watch.changed() => {}
                }
                continue;
            }

            match self.deps.store.oldest_queued() {
                Ok(Some(row)) => self.dequeue_and_run(row).await,
                Ok(None) => {
                    tokio::select! {
                        _ = shutdown.cancelled() => return,
                        _ = self.notify.notified() => {}
                        _ = bridge_watch.changed() => {}
                    }
                }
                Err(Error::Busy(msg)) => {
                    tracing::warn!(error = %msg, "store busy while polling queue, retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "fatal error reading queue, stopping scheduler loop");
                    return;
                }
            }
        }
    }

    /// Transition the oldest queued row to `processing` (the
    /// linearization point), build its `GenerationRequest`, and drive the
    /// Session to terminal before returning — enforcing "exactly one job
    /// occupies `processing` at a time".
    async fn dequeue_and_run(self: &Arc<Self>, row: HistoryEntry) {
        if let Err(e) = self.deps.store.update_history_status(
            &row.id,
            HistoryUpdate { status: Some(HistoryStatus::Processing), ..Default::default() },
        ) {
            tracing::error!(error = %e, history_id = %row.id, "failed to admit queued row to processing");
            return;
        }

        let request = match self.build_request(&row) {
            Ok(request) => request,
            Err(error) => {
                self.fail_without_session(&row.id, error).await;
                return;
            }
        };

        let handle = SessionHandle::new(row.id, row.project_id, row.kind, self.deps.clock.epoch_ms() as i64);
        self.deps.sessions.insert(handle.clone());
        *self.current.lock() = Some(handle.clone());
        self.deps.telemetry.emit(TelemetryEvent::SchedulerStarted { history_id: row.id });

        let deps = SessionDeps {
            bridge: self.deps.bridge.clone(),
            store: self.deps.store.clone(),
            assets: self.deps.assets.clone(),
            telemetry: self.deps.telemetry.clone(),
            clock: self.deps.clock.clone(),
        };
        forge3d_session::run(handle, request, deps).await;
        *self.current.lock() = None;
    }

    /// Build the tagged `GenerationRequest` for a freshly-admitted row.
    /// For `mesh`, the payload must still be in the in-memory map — if it
    /// is gone (e.g. the host restarted between `queued` and
    /// `processing`), this is the "payload is gone" case and the job is
    /// lost.
    fn build_request(&self, row: &HistoryEntry) -> Result<GenerationRequest, String> {
        let options = match &row.metadata {
            Value::Null => None,
            other => Some(other.clone()),
        };
        match row.kind {
            GenerationKind::Mesh => match self.payloads.take(&row.id) {
                Some(image_bytes) => Ok(GenerationRequest::Mesh { image_bytes, options }),
                None => Err(LOST_PAYLOAD_ERROR_MESSAGE.to_string()),
            },
            GenerationKind::Image => {
                Ok(GenerationRequest::Image { prompt: row.prompt.clone().unwrap_or_default(), options })
            }
            GenerationKind::Full => {
                Ok(GenerationRequest::Full { prompt: row.prompt.clone().unwrap_or_default(), options })
            }
        }
    }

    /// Fail a `processing` row directly, without ever creating a Session
    /// — used for the lost-payload case, which never reaches the bridge.
    async fn fail_without_session(&self, id: &HistoryId, error: String) {
        let now = self.deps.clock.epoch_ms() as i64;
        if let Err(e) = self.deps.store.update_history_status(
            id,
            HistoryUpdate {
                status: Some(HistoryStatus::Failed),
                error_message: Some(error.clone()),
                completed_at_ms: Some(now),
                ..Default::default()
            },
        ) {
            tracing::error!(error = %e, history_id = %id, "failed to record lost-payload history entry");
        }
        self.deps.telemetry.emit(TelemetryEvent::SchedulerFailed { history_id: *id, error });
    }

    /// The current `processing` Session's handle, if any — used by the
    /// `/status`-adjacent endpoints that want to look a job up by
    /// `HistoryId` without scanning the session registry.
    pub fn current_session(&self) -> Option<Arc<SessionHandle>> {
        self.current.lock().clone()
    }
}

/// Background task: on every bridge `crash` event, fail the current
/// Session (if any) with the "bridge crashed mid-generation" message.
/// Future dequeues wait for `running` via the scheduler loop's own
/// `bridge.state().allows_dequeue()` check — this task only handles the
/// in-flight Session, not admission.
async fn watch_for_bridge_crash<C: Clock + 'static>(scheduler: Arc<Scheduler<C>>, shutdown: CancellationToken) {
    let mut sub = scheduler.deps.telemetry.subscribe(forge3d_core::TelemetryCategory::Bridge);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            event = sub.recv() => {
                let Some(event) = event else { return };
                if matches!(event, TelemetryEvent::BridgeCrash { .. }) {
                    if let Some(handle) = scheduler.current_session() {
                        if handle.state().is_running() {
                            tracing::warn!(history_id = %handle.history_id(), "{}", BRIDGE_CRASH_ERROR_MESSAGE);
                            handle.fail_due_to_bridge_crash();
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
