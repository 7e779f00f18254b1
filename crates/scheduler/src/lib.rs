// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge3d-scheduler: persistent FIFO admission of generation requests,
//! at-most-one concurrent execution against the `InferenceBridge`, and
//! recovery of orphaned in-flight jobs at startup.
//!
//! The queue itself is the `Store`'s `status = queued` history rows —
//! there is no separate in-memory queue data structure to keep in sync.
//! The only state this crate owns beyond the Store is the payload map for
//! uploaded `mesh`-job image bytes (never persisted; see [`PayloadMap`])
//! and the one currently-processing `SessionHandle`, tracked so
//! `cancel(id)` and a bridge-crash event can reach it.

mod payloads;
mod queue_state;
mod scheduler;

pub use payloads::PayloadMap;
pub use queue_state::QueueState;
pub use scheduler::{EnqueueOutcome, Scheduler, SchedulerDeps};

pub type Result<T> = std::result::Result<T, forge3d_core::Error>;
