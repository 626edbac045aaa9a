//! WebSocket transport
//!
//! One task per connection. The socket is split: a writer task drains the
//! connection's outbound channel into the sink, while the read loop decodes
//! one JSON frame at a time and dispatches it inline, which preserves
//! per-connection arrival order. Disconnects of any kind unregister the
//! connection but leave the session's logs intact.

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use codesage::InboundEvent;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::handlers;
use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws/:interview_id", get(upgrade))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn upgrade(
    ws: WebSocketUpgrade,
    Path(interview_id): Path<String>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection(socket, state, interview_id))
}

async fn connection(socket: WebSocket, state: SharedState, interview_id: String) {
    let (connection_id, mut outbound) = state.connections.register(&interview_id).await;
    state.registry.ensure(&interview_id).await;
    info!(%interview_id, connection_id, "connection open");

    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            match serde_json::to_string(&event) {
                Ok(frame) => {
                    if sink.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "failed to encode outbound event"),
            }
        }
        let _ = sink.close().await;
    });

    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                debug!(%interview_id, connection_id, error = %e, "transport error");
                break;
            }
        };

        match message {
            Message::Text(text) => match serde_json::from_str::<InboundEvent>(&text) {
                Ok(event) => {
                    handlers::dispatch(&state, &interview_id, connection_id, event).await;
                }
                Err(e) => warn!(%interview_id, connection_id, error = %e, "ignoring malformed event"),
            },
            Message::Close(_) => break,
            // Pings are answered by the transport layer
            _ => {}
        }
    }

    state.connections.unregister(&interview_id, connection_id).await;
    writer.abort();
    info!(%interview_id, connection_id, "connection closed");
}
