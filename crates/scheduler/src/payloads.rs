// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory holding pen for the one kind of job payload that is never
//! persisted: the uploaded image bytes of a `mesh` generation, carried
//! from `enqueue` to dequeue. `image`/`full` jobs need nothing here —
//! their prompt lives in the `HistoryEntry` row itself.
//!
//! A process restart drops this map entirely, by construction (it is never
//! written to disk), which is what gives the scheduler's "payload is gone"
//! check its meaning: if a `mesh` row is still `queued` after a restart,
//! its bytes are gone too, and dequeue must fail it rather than proceed.

use std::collections::HashMap;

use bytes::Bytes;
use forge3d_core::HistoryId;
use parking_lot::Mutex;

/// Owns the uploaded-image-bytes payload for queued `mesh` jobs. Cheap to
/// clone — an `Arc`-free `Mutex<HashMap<..>>` wrapped directly, since every
/// holder of a `Scheduler` already shares one `Arc<Scheduler>`.
#[derive(Default)]
pub struct PayloadMap {
    inner: Mutex<HashMap<HistoryId, Bytes>>,
}

impl PayloadMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: HistoryId, bytes: Bytes) {
        self.inner.lock().insert(id, bytes);
    }

    /// Move ownership of the payload out to the caller (the Session about
    /// to run), or `None` if it was never recorded or already taken — the
    /// "payload is gone" case the scheduler must treat as a lost job.
    pub fn take(&self, id: &HistoryId) -> Option<Bytes> {
        self.inner.lock().remove(id)
    }

    /// Drop a payload without using it — called on `cancel(id)` while
    /// queued, so a cancelled upload's bytes don't linger.
    pub fn discard(&self, id: &HistoryId) {
        self.inner.lock().remove(id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "payloads_tests.rs"]
mod tests;
