// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test id type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_is_twelve_hex_chars() {
    let id = TestId::new();
    assert_eq!(id.as_str().len(), ID_LEN);
    assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn define_id_new_ids_are_unique() {
    assert_ne!(TestId::new(), TestId::new());
}

#[test]
fn define_id_hash_map_lookup() {
    let id = TestId::from_string("abcd1234ef00");
    let mut map = HashMap::new();
    map.insert(id, 42);
    assert_eq!(map.get(&TestId::from_string("abcd1234ef00")), Some(&42));
}

#[test]
fn define_id_roundtrips_through_serde() {
    let id = TestId::from_string("0123456789ab");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"0123456789ab\"");
    let back: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn define_id_pads_short_input() {
    let id = TestId::from_string("ab");
    assert_eq!(id.as_str().len(), ID_LEN);
    assert!(id.as_str().starts_with("ab"));
}

#[test]
fn define_id_truncates_long_input() {
    let id = TestId::from_string("0123456789abcdef");
    assert_eq!(id.as_str(), "0123456789ab");
}
