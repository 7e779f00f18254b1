// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge3d-store: the durable relational store.
//!
//! Backed by `rusqlite` in WAL journal mode with a 5s busy timeout, which
//! gives "concurrent readers, single writer, bounded busy-wait then `Busy`"
//! for free instead of a hand-rolled retry loop. A single `schema_version`
//! table tracks applied migrations so `Store::open` can be called on an
//! existing database and only apply what's missing.

mod migrations;
mod rows;
mod store;

pub use store::{HistoryUpdate, Stats, Store};

pub type Result<T> = std::result::Result<T, forge3d_core::Error>;
