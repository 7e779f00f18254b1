// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded in-memory record of recently-run sessions. The summary endpoint
//! returns the last 20 sessions; this registry keeps a deeper ring than
//! that so `/status` and `/download` stay answerable for a while after a
//! session drops off the summary list, substituting a capacity bound for
//! an unspecified time-based retention window.

use std::collections::VecDeque;
use std::sync::Arc;

use forge3d_core::{HistoryId, SessionId};
use parking_lot::Mutex;

use crate::handle::SessionHandle;

/// Number of sessions returned by the summary endpoint.
pub const SUMMARY_LIMIT: usize = 20;

/// Total sessions retained for by-id lookup before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 256;

pub struct SessionRegistry {
    capacity: usize,
    order: Mutex<VecDeque<Arc<SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, order: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Record a freshly-created session. Evicts the oldest entry once the
    /// registry exceeds `capacity`, dropping its `Arc` (and with it any
    /// in-memory result bytes it still held).
    pub fn insert(&self, handle: Arc<SessionHandle>) {
        let mut order = self.order.lock();
        order.push_back(handle);
        while order.len() > self.capacity {
            order.pop_front();
        }
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.order.lock().iter().find(|h| h.id() == id).cloned()
    }

    /// Look a session up by the `HistoryId` of the job it is running —
    /// the id the HTTP API addresses jobs by, as opposed to the
    /// transient `SessionId` this registry otherwise indexes on.
    pub fn get_by_history_id(&self, id: &HistoryId) -> Option<Arc<SessionHandle>> {
        self.order.lock().iter().find(|h| h.history_id() == id).cloned()
    }

    /// Most recently inserted sessions first, capped at [`SUMMARY_LIMIT`].
    pub fn recent(&self) -> Vec<Arc<SessionHandle>> {
        self.order.lock().iter().rev().take(SUMMARY_LIMIT).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.order.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
