// crates/server/src/routes/stream.rs
//! Server-sent change events.
//!
//! | Frame                             | When                            |
//! |-----------------------------------|---------------------------------|
//! | `data: {"type":"connected"}`      | Immediately on connect          |
//! | `data: {"type":"file-change"}`    | A watched state file changed    |
//! | `data: {"type":"session-change"}` | An agent session dir changed    |
//! | `: heartbeat`                     | Every keepalive interval        |

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
    Router,
};
use tokio_stream::{Stream, StreamExt};

use crate::notifier::{event_stream, Push};
use crate::state::AppState;

/// GET /api/sse - Change events for as long as the client stays connected.
pub async fn sse_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.notifier.subscribe().await;
    let stream = event_stream(subscription, state.keepalive).map(|push| {
        Ok(match push {
            Push::Event(event) => Event::default().data(event.to_json()),
            Push::Keepalive => Event::default().comment("heartbeat"),
        })
    });
    Sse::new(stream)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/sse", get(sse_stream))
}
