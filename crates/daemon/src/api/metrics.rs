// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /metrics/stream` — Server-Sent Events firehose over the telemetry
//! bus's `all` channel. One event per line, JSON-encoded, until the client
//! disconnects.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use forge3d_core::TelemetryEvent;
use forge3d_telemetry::Subscription;
use tokio_stream::Stream;

use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics/stream", get(stream))
}

async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.telemetry.subscribe_all();
    Sse::new(TelemetryStream { state: StreamState::Idle(Some(subscription)) }).keep_alive(KeepAlive::default())
}

type RecvFuture = Pin<Box<dyn Future<Output = (Subscription, Option<TelemetryEvent>)> + Send>>;

enum StreamState {
    Idle(Option<Subscription>),
    Pending(RecvFuture),
}

/// Adapts [`Subscription::recv`] (an `&mut self` async method) into a
/// `Stream` by round-tripping ownership of the subscription through each
/// pending future — there's no borrowed-self stream API on `Subscription`.
struct TelemetryStream {
    state: StreamState,
}

impl Stream for TelemetryStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match &mut self.state {
                StreamState::Idle(slot) => match slot.take() {
                    Some(mut subscription) => {
                        self.state = StreamState::Pending(Box::pin(async move {
                            let event = subscription.recv().await;
                            (subscription, event)
                        }));
                    }
                    None => return Poll::Ready(None),
                },
                StreamState::Pending(fut) => match fut.as_mut().poll(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready((subscription, Some(event))) => {
                        self.state = StreamState::Idle(Some(subscription));
                        let payload = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
                        return Poll::Ready(Some(Ok(Event::default().data(payload))));
                    }
                    Poll::Ready((_, None)) => return Poll::Ready(None),
                },
            }
        }
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
