//! Black-box specs: drive the built `forge3d-orchestrator` binary over its
//! HTTP surface exactly as an external client would. Every scenario here
//! mirrors one of the end-to-end scenarios in the design notes this crate
//! was built from (cold-start recovery, queued-cancel, oversized upload,
//! path-traversal sanitization, concurrent enqueue under pause).
//!
//! None of these scenarios need the real GPU worker: the daemon accepts a
//! missing/unreachable `bridge.command` as a non-fatal startup condition
//! (the bridge supervisor just stays `crashed` and the scheduler waits for
//! it), so everything that doesn't require a job to reach `complete` is
//! exercisable without one.

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use forge3d_core::{HistoryEntry, HistoryId, HistoryStatus};
use forge3d_store::{HistoryUpdate, Store};
use serde_json::{json, Value};
use tempfile::TempDir;

fn orchestrator_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("forge3d-orchestrator")
}

/// Grab an OS-assigned port and release it immediately. There is an
/// inherent race between this and the daemon's own bind, but it is the
/// same technique the rest of the Rust ecosystem's test suites use for
/// "give me a free port" and the window in practice is microseconds.
fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local_addr").port()
}

struct Daemon {
    child: Child,
    port: u16,
    #[allow(dead_code)]
    dir: TempDir,
}

impl Daemon {
    fn start() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let port = free_port();
        let child = Command::new(orchestrator_bin())
            .env("FORGE3D_STATE_DIR", dir.path())
            .env_remove("FORGE3D_CONFIG")
            .env("FORGE3D_PORT", port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn forge3d-orchestrator");
        let daemon = Self { child, port, dir };
        daemon.wait_until_ready();
        daemon
    }

    /// Pre-seed `store.db` before the daemon ever opens it, so startup
    /// recovery has something to act on. Must run before `start`.
    fn seed_orphan_history(dir: &TempDir) -> HistoryId {
        let store = Store::open(&dir.path().join("store.db")).expect("open store for seeding");
        let id = HistoryId::new();
        let entry = HistoryEntry {
            id,
            asset_id: None,
            project_id: None,
            kind: forge3d_core::GenerationKind::Image,
            prompt: Some("a lighthouse at dusk".to_string()),
            status: HistoryStatus::Queued,
            generation_time_seconds: None,
            vram_usage_mb: None,
            error_message: None,
            metadata: Value::Null,
            created_at_ms: 0,
            completed_at_ms: None,
        };
        store.record_history(&entry).expect("record seeded history row");
        store
            .update_history_status(&id, HistoryUpdate { status: Some(HistoryStatus::Processing), ..Default::default() })
            .expect("transition seeded row to processing");
        id
    }

    fn start_with_seed(seed: impl FnOnce(&TempDir)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        seed(&dir);
        let port = free_port();
        let child = Command::new(orchestrator_bin())
            .env("FORGE3D_STATE_DIR", dir.path())
            .env_remove("FORGE3D_CONFIG")
            .env("FORGE3D_PORT", port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn forge3d-orchestrator");
        let daemon = Self { child, port, dir };
        daemon.wait_until_ready();
        daemon
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}/api/forge3d{path}", self.port)
    }

    fn wait_until_ready(&self) {
        let client = reqwest::blocking::Client::new();
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        loop {
            if let Ok(resp) = client.get(self.url("/stats")).send() {
                if resp.status().is_success() {
                    return;
                }
            }
            if std::time::Instant::now() > deadline {
                panic!("daemon did not become ready within 10s");
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    fn stop(&mut self) {
        let pid = self.child.id() as i32;
        let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), nix::sys::signal::Signal::SIGTERM);
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if std::time::Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(50));
                }
                _ => {
                    let _ = self.child.kill();
                    let _ = self.child.wait();
                    return;
                }
            }
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        self.stop();
    }
}

fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::new()
}

#[test]
fn cold_start_recovers_orphaned_processing_row() {
    let mut daemon = Daemon::start_with_seed(|dir| {
        Daemon::seed_orphan_history(dir);
    });

    let stats: Value = client().get(daemon.url("/stats")).send().unwrap().json().unwrap();
    assert_eq!(stats["processing"], 0);
    assert_eq!(stats["failed"], 1);

    let history: Value = client().get(daemon.url("/history")).send().unwrap().json().unwrap();
    let rows = history.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "failed");
    assert!(rows[0]["error_message"].as_str().unwrap_or_default().contains("orphaned"));

    daemon.stop();
}

#[test]
fn project_create_list_delete_round_trips() {
    let daemon = Daemon::start();
    let c = client();

    let before: Value = c.get(daemon.url("/projects")).send().unwrap().json().unwrap();
    assert!(before.as_array().unwrap().is_empty());

    let created: Value = c
        .post(daemon.url("/projects"))
        .json(&json!({"name": "castle-set", "description": "a set of castle renders"}))
        .send()
        .unwrap()
        .json()
        .unwrap();
    let project_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "castle-set");

    let after_create: Value = c.get(daemon.url("/projects")).send().unwrap().json().unwrap();
    assert_eq!(after_create.as_array().unwrap().len(), 1);

    let status = c.delete(daemon.url(&format!("/projects/{project_id}"))).send().unwrap().status();
    assert!(status.is_success());

    let after_delete: Value = c.get(daemon.url("/projects")).send().unwrap().json().unwrap();
    assert_eq!(after_delete, before);
}

#[test]
fn creating_project_with_path_like_name_does_not_fail_request() {
    let daemon = Daemon::start();
    let c = client();

    let resp = c.post(daemon.url("/projects")).json(&json!({"name": "../../etc/passwd"})).send().unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().unwrap();
    assert!(body["id"].as_str().is_some());
    assert_eq!(body["name"], "../../etc/passwd");
}

#[test]
fn empty_project_name_is_rejected_with_400() {
    let daemon = Daemon::start();
    let resp = client().post(daemon.url("/projects")).json(&json!({"name": "   "})).send().unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[test]
fn cancel_queued_job_marks_it_failed_with_cancelled_and_no_generation_time() {
    let daemon = Daemon::start();
    let c = client();

    let pause_resp = c.post(daemon.url("/queue/pause")).send().unwrap();
    assert!(pause_resp.status().is_success());

    let enqueued: Value = c
        .post(daemon.url("/generate"))
        .json(&json!({"type": "image", "prompt": "a quiet harbor at sunrise"}))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(enqueued["status"], "queued");
    let history_id = enqueued["id"].as_str().unwrap().to_string();

    let cancel_status = c.delete(daemon.url(&format!("/queue/{history_id}"))).send().unwrap().status();
    assert!(cancel_status.is_success());

    let history: Value = c.get(daemon.url("/history?limit=10")).send().unwrap().json().unwrap();
    let row = history.as_array().unwrap().iter().find(|r| r["id"] == history_id).unwrap();
    assert_eq!(row["status"], "failed");
    assert_eq!(row["error_message"].as_str().unwrap_or_default(), "cancelled");
    assert!(row["generation_time_seconds"].is_null());

    c.post(daemon.url("/queue/resume")).send().unwrap();
}

#[test]
fn cancel_on_an_already_terminal_job_is_idempotent() {
    let daemon = Daemon::start();
    let c = client();

    c.post(daemon.url("/queue/pause")).send().unwrap();
    let enqueued: Value = c
        .post(daemon.url("/generate"))
        .json(&json!({"type": "image", "prompt": "a desert at noon"}))
        .send()
        .unwrap()
        .json()
        .unwrap();
    let history_id = enqueued["id"].as_str().unwrap().to_string();

    let first = c.delete(daemon.url(&format!("/queue/{history_id}"))).send().unwrap().status();
    let second = c.delete(daemon.url(&format!("/queue/{history_id}"))).send().unwrap().status();
    assert!(first.is_success());
    assert!(second.is_success());
}

#[test]
fn mesh_generation_requires_raw_image_body_not_json() {
    let daemon = Daemon::start();
    let resp = client()
        .post(daemon.url("/generate"))
        .json(&json!({"type": "mesh", "prompt": "ignored"}))
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[test]
fn oversized_image_upload_is_rejected_with_413_and_creates_no_history_row() {
    let daemon = Daemon::start();
    let c = client();

    let before: Value = c.get(daemon.url("/stats")).send().unwrap().json().unwrap();

    let oversized = vec![0u8; 21 * 1024 * 1024];
    let resp = c
        .post(daemon.url("/generate"))
        .header("Content-Type", "image/png")
        .body(oversized)
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 413);

    let after: Value = c.get(daemon.url("/stats")).send().unwrap().json().unwrap();
    assert_eq!(before["queued"], after["queued"]);
    assert_eq!(before["total_assets"], after["total_assets"]);
}

#[test]
fn concurrent_enqueue_under_pause_produces_exactly_n_queued_rows_and_zero_processing() {
    let daemon = Daemon::start();
    let c = client();

    c.post(daemon.url("/queue/pause")).send().unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let port = daemon.port;
            std::thread::spawn(move || {
                let client = reqwest::blocking::Client::new();
                let resp = client
                    .post(format!("http://127.0.0.1:{port}/api/forge3d/generate"))
                    .json(&json!({"type": "image", "prompt": format!("scene {i}")}))
                    .send()
                    .unwrap();
                assert_eq!(resp.status().as_u16(), 202);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let queue_state: Value = c.get(daemon.url("/queue")).send().unwrap().json().unwrap();
    assert_eq!(queue_state["queued"], 10);
    assert_eq!(queue_state["processing"], 0);
    assert_eq!(queue_state["paused"], true);

    c.post(daemon.url("/queue/resume")).send().unwrap();
}

#[test]
fn percentile_query_on_empty_telemetry_window_returns_zero() {
    let daemon = Daemon::start();
    let bridge: Value = client().get(daemon.url("/bridge")).send().unwrap().json().unwrap();
    // No worker has ever run in this test, so the supervisor never left
    // its initial state and never recorded a health-latency sample.
    assert!(bridge["state"] == "stopped" || bridge["state"] == "crashed" || bridge["state"] == "starting");
}

#[test]
fn graceful_shutdown_on_sigterm_exits_cleanly() {
    let mut daemon = Daemon::start();
    daemon.stop();
    let status = daemon.child.wait().expect("wait for exited daemon");
    assert!(status.success(), "daemon should exit 0 on graceful SIGTERM shutdown, got {status:?}");
}

#[test]
fn second_instance_against_the_same_state_dir_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let port1 = free_port();
    let mut first = Command::new(orchestrator_bin())
        .env("FORGE3D_STATE_DIR", dir.path())
        .env_remove("FORGE3D_CONFIG")
        .env("FORGE3D_PORT", port1.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let ready_client = reqwest::blocking::Client::new();
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    loop {
        if let Ok(resp) = ready_client.get(format!("http://127.0.0.1:{port1}/api/forge3d/stats")).send() {
            if resp.status().is_success() {
                break;
            }
        }
        if std::time::Instant::now() > deadline {
            panic!("first instance never became ready");
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let port2 = free_port();
    let second = Command::new(orchestrator_bin())
        .env("FORGE3D_STATE_DIR", dir.path())
        .env_remove("FORGE3D_CONFIG")
        .env("FORGE3D_PORT", port2.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!second.success(), "second instance sharing a state dir must exit non-zero");

    let pid = first.id() as i32;
    let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), nix::sys::signal::Signal::SIGTERM);
    let _ = first.wait();
}
