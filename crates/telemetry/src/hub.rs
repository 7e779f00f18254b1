// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`TelemetryHub`]: ring buffers + aggregate counters + latency
//! percentiles + subscriber fan-out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use forge3d_core::{TelemetryCategory, TelemetryEvent};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::percentile::{self, Percentiles};
use crate::ring::Ring;

/// Capacity of the `broadcast` channel backing every subscription. Chosen
/// generously above the 100-event ring buffer capacity so a subscriber only
/// lags (and drops) under genuine sustained backpressure, not routine
/// scheduling jitter.
const CHANNEL_CAPACITY: usize = 512;

struct CategoryState {
    ring: Ring<TelemetryEvent>,
    latency: Ring<u64>,
    emitted: u64,
}

impl CategoryState {
    fn new(ring_size: usize, latency_window: usize) -> Self {
        Self { ring: Ring::new(ring_size), latency: Ring::new(latency_window), emitted: 0 }
    }
}

struct Inner {
    ring_size: usize,
    latency_window: usize,
    state: Mutex<HashMap<TelemetryCategory, CategoryState>>,
    channels: Mutex<HashMap<TelemetryCategory, broadcast::Sender<TelemetryEvent>>>,
    all_tx: broadcast::Sender<TelemetryEvent>,
    dropped: HashMap<TelemetryCategory, AtomicU64>,
    dropped_all: AtomicU64,
}

/// Per-category snapshot returned by [`TelemetryHub::stats`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub emitted: u64,
    pub dropped: u64,
    pub latency: Percentiles,
}

/// In-process telemetry bus. Cheap to clone (an `Arc` internally); every
/// clone observes the same ring buffers, counters, and subscriptions.
#[derive(Clone)]
pub struct TelemetryHub {
    inner: Arc<Inner>,
}

impl TelemetryHub {
    /// `ring_size` and `latency_window` come from the `telemetry.ring_size`
    /// / `telemetry.latency_window` config knobs; the defaults are 100 and
    /// 1000 respectively.
    pub fn new(ring_size: usize, latency_window: usize) -> Self {
        let mut state = HashMap::new();
        let mut channels = HashMap::new();
        let mut dropped = HashMap::new();
        for category in TelemetryCategory::ALL {
            state.insert(category, CategoryState::new(ring_size, latency_window));
            channels.insert(category, broadcast::channel(CHANNEL_CAPACITY).0);
            dropped.insert(category, AtomicU64::new(0));
        }
        let (all_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                ring_size,
                latency_window,
                state: Mutex::new(state),
                channels: Mutex::new(channels),
                all_tx,
                dropped,
                dropped_all: AtomicU64::new(0),
            }),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(100, 1000)
    }

    /// Record an event: push to its category's ring buffer, fold its
    /// latency (if any) into the sliding window, bump the emitted counter,
    /// and fan out to subscribers. Fan-out is best-effort — `send` only
    /// errors when there are zero receivers, which is not a drop.
    pub fn emit(&self, event: TelemetryEvent) {
        let category = event.category();
        {
            let mut state = self.inner.state.lock();
            let entry =
                state.entry(category).or_insert_with(|| CategoryState::new(self.inner.ring_size, self.inner.latency_window));
            if let Some(latency_ms) = event.latency_ms() {
                entry.latency.push(latency_ms);
            }
            entry.ring.push(event.clone());
            entry.emitted += 1;
        }
        if let Some(tx) = self.inner.channels.lock().get(&category) {
            let _ = tx.send(event.clone());
        }
        let _ = self.inner.all_tx.send(event);
    }

    /// Most recent events in a category's ring buffer, oldest first.
    pub fn recent(&self, category: TelemetryCategory) -> Vec<TelemetryEvent> {
        self.inner
            .state
            .lock()
            .get(&category)
            .map(|s| s.ring.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn percentiles(&self, category: TelemetryCategory) -> Percentiles {
        self.inner
            .state
            .lock()
            .get(&category)
            .map(|s| percentile::compute(&s.latency.iter().copied().collect::<Vec<_>>()))
            .unwrap_or_default()
    }

    pub fn emitted_count(&self, category: TelemetryCategory) -> u64 {
        self.inner.state.lock().get(&category).map(|s| s.emitted).unwrap_or(0)
    }

    pub fn dropped_count(&self, category: TelemetryCategory) -> u64 {
        self.inner.dropped.get(&category).map(|c| c.load(Ordering::Relaxed)).unwrap_or(0)
    }

    pub fn dropped_all(&self) -> u64 {
        self.inner.dropped_all.load(Ordering::Relaxed)
    }

    pub fn stats(&self, category: TelemetryCategory) -> Stats {
        Stats {
            emitted: self.emitted_count(category),
            dropped: self.dropped_count(category),
            latency: self.percentiles(category),
        }
    }

    /// Subscribe to one category's events.
    pub fn subscribe(&self, category: TelemetryCategory) -> Subscription {
        let rx = self.inner.channels.lock().get(&category).map(|tx| tx.subscribe()).unwrap_or_else(|| {
            // Lazily create a channel for a category added after construction.
            let (tx, rx) = broadcast::channel(CHANNEL_CAPACITY);
            self.inner.channels.lock().insert(category, tx);
            rx
        });
        Subscription { rx, dropped: self.inner.dropped.get(&category).map(|_| category), hub: self.clone() }
    }

    /// Subscribe to the `all` firehose (every category).
    pub fn subscribe_all(&self) -> Subscription {
        Subscription { rx: self.inner.all_tx.subscribe(), dropped: None, hub: self.clone() }
    }

    fn record_drop(&self, category: Option<TelemetryCategory>, n: u64) {
        match category {
            Some(category) => {
                if let Some(counter) = self.inner.dropped.get(&category) {
                    counter.fetch_add(n, Ordering::Relaxed);
                }
            }
            None => {
                self.inner.dropped_all.fetch_add(n, Ordering::Relaxed);
            }
        }
    }
}

/// A live subscription to the telemetry bus. `recv` transparently skips
/// over lagged gaps, folding each gap into the hub's per-category (or
/// `all`) dropped-event counter — every drop is itself counted.
pub struct Subscription {
    rx: broadcast::Receiver<TelemetryEvent>,
    dropped: Option<TelemetryCategory>,
    hub: TelemetryHub,
}

impl Subscription {
    /// Await the next event. Returns `None` only once the hub itself (and
    /// every sender clone) has been dropped, which does not happen in
    /// practice since `TelemetryHub` keeps its own sender alive.
    pub async fn recv(&mut self) -> Option<TelemetryEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    self.hub.record_drop(self.dropped, n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
