//! Server-sent change feed.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::{unfold, Stream};
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;

/// Streams deduplicated change notifications as server-sent events. Each
/// connection gets its own broadcast subscription; a slow consumer that
/// lags behind skips the overwritten entries and keeps receiving.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    summary = "Subscribe to the change feed",
    responses(
        (status = 200, description = "SSE stream of change notifications")
    ),
    tag = "feed"
)]
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.feed.subscribe();
    let stream = unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(entry) => match SseEvent::default().json_data(&entry) {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(_) => continue,
                },
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
