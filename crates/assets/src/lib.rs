// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge3d-assets: sandboxed filesystem persistence for generation outputs.
//!
//! Path-safety validation is kept as a pure, I/O-free function
//! ([`sanitize_component`] / [`resolve`]) so it can be exhaustively unit
//! tested without touching the filesystem, then wrapped by the async
//! `AssetStore::write` for the actual atomic write-then-rename.

mod path_safety;
mod store;

pub use path_safety::sanitize_component;
pub use store::{AssetStore, WrittenAsset};

pub type Result<T> = std::result::Result<T, forge3d_core::Error>;
