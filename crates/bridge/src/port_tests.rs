// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::net::TcpListener;

#[test]
fn acquires_first_free_port_in_range() {
    let port = acquire(18001, 18010).expect("a free port");
    assert!((18001..=18010).contains(&port));
}

#[test]
fn skips_a_port_already_bound() {
    let held = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral");
    let held_port = held.local_addr().expect("local addr").port();
    let port = acquire(held_port, held_port + 5).expect("a free port");
    assert_ne!(port, held_port);
}

#[test]
fn returns_none_when_range_is_exhausted() {
    let held = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral");
    let held_port = held.local_addr().expect("local addr").port();
    assert!(acquire(held_port, held_port).is_none());
}
