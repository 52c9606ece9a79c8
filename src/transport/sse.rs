//! HTTP/SSE transport
//!
//! `GET /sse` opens the event stream: the first event is an `endpoint`
//! event naming the message path, then responses flow back as `message`
//! events. `POST /messages` carries client-to-server JSON-RPC. One client
//! at a time; a new stream replaces the previous one. A POST with no open
//! stream has nowhere to answer, so it is discarded with a 500.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::Router;
use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::handle_message;
use crate::handlers::ServerState;

const MESSAGE_PATH: &str = "/messages";

#[derive(Clone)]
struct SseState {
    server: Arc<ServerState>,
    /// Sender half of the currently open event stream, if any.
    outbound: Arc<Mutex<Option<mpsc::Sender<Event>>>>,
}

pub fn router(server: Arc<ServerState>) -> Router {
    let state = SseState {
        server,
        outbound: Arc::new(Mutex::new(None)),
    };
    Router::new()
        .route("/sse", get(open_stream))
        .route(MESSAGE_PATH, post(receive_message))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(server: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let app = router(server);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("SSE transport listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn open_stream(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Event>(64);

    // Advertise the message endpoint before anything else on the stream.
    let endpoint = Event::default().event("endpoint").data(MESSAGE_PATH);
    let _ = tx.try_send(endpoint);

    let replaced = {
        let mut slot = state.outbound.lock().unwrap_or_else(|e| e.into_inner());
        slot.replace(tx).is_some()
    };
    if replaced {
        info!("new SSE stream replaces previous connection");
    } else {
        info!("SSE stream opened");
    }

    Sse::new(ReceiverStream::new(rx).map(Ok)).keep_alive(KeepAlive::default())
}

async fn receive_message(State(state): State<SseState>, body: String) -> StatusCode {
    let Some(tx) = state
        .outbound
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    else {
        warn!("message received with no open SSE stream, discarding");
        return StatusCode::INTERNAL_SERVER_ERROR;
    };

    if let Some(response) = handle_message(&state.server, &body).await {
        let encoded = match serde_json::to_string(&response) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("response encoding failed: {}", e);
                return StatusCode::INTERNAL_SERVER_ERROR;
            }
        };
        let event = Event::default().event("message").data(encoded);
        if tx.send(event).await.is_err() {
            warn!("SSE stream gone, clearing connection");
            clear_if_same(&state.outbound, &tx);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    }

    StatusCode::ACCEPTED
}

/// Clear the outbound slot only if it still holds the sender that failed.
/// The sender was cloned before the dispatch awaited; a new `GET /sse` may
/// have replaced the slot in the meantime, and that fresh connection must
/// stay routable.
fn clear_if_same(outbound: &Mutex<Option<mpsc::Sender<Event>>>, stale: &mpsc::Sender<Event>) {
    let mut slot = outbound.lock().unwrap_or_else(|e| e.into_inner());
    if slot
        .as_ref()
        .is_some_and(|current| current.same_channel(stale))
    {
        slot.take();
    }
}
