// crates/server/src/routes/progress.rs
//! Batch progress endpoints.
//!
//! - GET /progress — current snapshot
//! - GET /progress/stream — SSE stream of progress updates

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};

use crate::progress::BatchProgress;
use crate::state::AppState;

/// GET /api/progress — Where the current (or last) batch stands.
async fn get_progress(State(state): State<Arc<AppState>>) -> Json<BatchProgress> {
    Json(state.progress.snapshot())
}

/// GET /api/progress/stream — SSE stream of batch progress.
///
/// The first event is the current snapshot so late subscribers are not
/// left blank until the next image starts.
async fn stream_progress(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.progress.subscribe();
    let initial = state.progress.snapshot();

    let stream = async_stream::stream! {
        let json = serde_json::to_string(&initial).unwrap_or_default();
        yield Ok(Event::default().event("progress").data(json));

        let mut rx = rx;
        loop {
            match rx.recv().await {
                Ok(progress) => {
                    let json = serde_json::to_string(&progress).unwrap_or_default();
                    yield Ok(Event::default().event("progress").data(json));
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Progress subscriber lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Build the progress router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/progress", get(get_progress))
        .route("/progress/stream", get(stream_progress))
}
