use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use crate::constants::SSE_KEEPALIVE_SECS;
use crate::extractors::LearnerId;
use crate::response::AppError;
use crate::state::AppState;

struct SseGuard(Arc<AtomicUsize>);

impl Drop for SseGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(sse_handler))
}

fn sse_event<T: Serialize>(name: &str, payload: &T) -> Option<Event> {
    match Event::default().event(name).json_data(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(event = name, error = %e, "Failed to encode SSE payload");
            None
        }
    }
}

/// Streams a `snapshot` event on connect, then one `ledger` event per change
/// to this learner's ledger.
pub async fn sse_handler(
    learner: LearnerId,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let max_sse = state.config().limits.max_sse_connections;
    let connections = state.sse_connections().clone();
    let current = connections.fetch_add(1, Ordering::SeqCst);
    if current >= max_sse {
        connections.fetch_sub(1, Ordering::SeqCst);
        return Err(AppError::too_many_requests("Too many SSE connections"));
    }
    let guard = SseGuard(connections);

    let mut events = state.engine().subscribe();
    let mut shutdown_rx = state.shutdown_rx();
    let initial = state.engine().current_event(learner.as_str()).await?;
    let learner_id = learner.0;

    let stream = async_stream::stream! {
        let _guard = guard;

        if let Some(event) = sse_event("snapshot", &initial) {
            yield Ok(event);
        }

        loop {
            tokio::select! {
                received = events.recv() => {
                    match received {
                        Ok(change) if change.learner_id == learner_id => {
                            if let Some(event) = sse_event("ledger", &change) {
                                yield Ok(event);
                            }
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(learner_id = %learner_id, skipped, "SSE subscriber lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEPALIVE_SECS))
            .text("keepalive"),
    ))
}
