// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared, `Arc`-held record of one Session's run. The scheduler
//! creates one per dequeued job and keeps it in the
//! [`crate::SessionRegistry`]; the API surface reads it directly for the
//! `/status`, `/download`, and `/sessions` endpoints without ever
//! touching the scheduler's own lock.

use std::sync::Arc;

use bytes::Bytes;
use forge3d_core::{GenerationKind, HistoryId, Progress, ProjectId, SessionId, SessionState, SessionStateKind, Stage};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub struct SessionHandle {
    id: SessionId,
    history_id: HistoryId,
    project_id: Option<ProjectId>,
    kind: GenerationKind,
    created_at_ms: i64,
    state_tx: watch::Sender<SessionState>,
    state_rx: watch::Receiver<SessionState>,
    progress_tx: watch::Sender<Progress>,
    progress_rx: watch::Receiver<Progress>,
    cancel: CancellationToken,
    /// Why `cancel` was set: an explicit `cancel(job_id)` call vs. the
    /// bridge having crashed out from under this session. Read by the run
    /// loop to decide the `Failed` error message.
    cancel_reason: Mutex<Option<String>>,
    /// Set on `Complete` only when the originating request carried no
    /// `project_id` — the bytes live here instead of AssetStore, for
    /// direct download, until this handle is evicted from the registry.
    in_memory_result: Mutex<Option<Bytes>>,
}

impl SessionHandle {
    pub fn new(
        history_id: HistoryId,
        project_id: Option<ProjectId>,
        kind: GenerationKind,
        created_at_ms: i64,
    ) -> Arc<Self> {
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let (progress_tx, progress_rx) = watch::channel(Progress { stage: Stage::Image, percent: 0 });
        Arc::new(Self {
            id: SessionId::new(),
            history_id,
            project_id,
            kind,
            created_at_ms,
            state_tx,
            state_rx,
            progress_tx,
            progress_rx,
            cancel: CancellationToken::new(),
            cancel_reason: Mutex::new(None),
            in_memory_result: Mutex::new(None),
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn history_id(&self) -> &HistoryId {
        &self.history_id
    }

    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    pub fn kind(&self) -> GenerationKind {
        self.kind
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    pub fn state_kind(&self) -> SessionStateKind {
        SessionStateKind::from(&self.state())
    }

    pub fn progress(&self) -> Progress {
        *self.progress_rx.borrow()
    }

    /// Request cooperative cancellation on behalf of an explicit
    /// `DELETE /queue/{id}` call. A no-op once the session is already
    /// terminal — the run loop only checks this while `running`.
    pub fn cancel(&self) {
        self.cancel_with_reason(forge3d_core::CANCELLED_ERROR_MESSAGE);
    }

    /// Request cancellation because the bridge crashed out from under
    /// this session's in-flight call.
    pub fn fail_due_to_bridge_crash(&self) {
        self.cancel_with_reason(forge3d_core::BRIDGE_CRASH_ERROR_MESSAGE);
    }

    fn cancel_with_reason(&self, reason: &str) {
        let mut current = self.cancel_reason.lock();
        if current.is_none() {
            *current = Some(reason.to_string());
        }
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The message the run loop should fail with if it observes
    /// cancellation; falls back to "cancelled" if cancelled without a
    /// reason having been recorded (shouldn't happen in practice, since
    /// every cancellation path goes through `cancel_with_reason`).
    pub(crate) fn cancel_reason(&self) -> String {
        self.cancel_reason
            .lock()
            .clone()
            .unwrap_or_else(|| forge3d_core::CANCELLED_ERROR_MESSAGE.to_string())
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        let _ = self.state_tx.send(state);
    }

    pub(crate) fn set_progress(&self, progress: Progress) {
        let _ = self.progress_tx.send(progress);
    }

    /// Bytes of the terminal result, for requests that carried no
    /// `project_id`. `None` for requests that were persisted to an Asset,
    /// or that never completed.
    pub fn in_memory_result(&self) -> Option<Bytes> {
        self.in_memory_result.lock().clone()
    }

    pub(crate) fn store_in_memory_result(&self, bytes: Bytes) {
        *self.in_memory_result.lock() = Some(bytes);
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
