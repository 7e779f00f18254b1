// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn base_url_targets_localhost_on_the_given_port() {
    let client = WorkerClient::new(8004);
    assert_eq!(client.base_url, "http://127.0.0.1:8004");
}

#[tokio::test]
async fn health_against_an_unbound_port_reports_bridge_unavailable() {
    let client = WorkerClient::new(1); // port 1 is never a listening worker in tests
    let err = client.health().await.expect_err("nothing is listening");
    assert!(matches!(err, forge3d_core::Error::BridgeUnavailable(_)));
}
