// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn small_metadata_is_accepted() {
    let v = serde_json::json!({"seed": 42});
    assert!(Asset::validate_metadata(&v).is_ok());
}

#[test]
fn oversized_metadata_is_rejected() {
    let big = "x".repeat(ASSET_METADATA_MAX_BYTES + 1);
    let v = serde_json::json!({"blob": big});
    assert!(Asset::validate_metadata(&v).is_err());
}
