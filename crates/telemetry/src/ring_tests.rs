// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn push_past_capacity_drops_oldest() {
    let mut ring: Ring<u32> = Ring::new(3);
    for i in 0..5 {
        ring.push(i);
    }
    assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
}

#[test]
fn capacity_zero_still_holds_one_item() {
    let mut ring: Ring<u32> = Ring::new(0);
    ring.push(1);
    ring.push(2);
    assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![2]);
}
