//! Manages the WebSocket connection lifecycle for a chat session.

use super::{
    cycle::handle_chat_turn,
    protocol::{ClientMessage, ServerMessage},
};
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use edugpt_core::Syllabus;
use futures_util::{Sink, SinkExt, StreamExt};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tracing::{error, info, instrument, warn};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main loop for an individual WebSocket connection.
///
/// All connections share the process-wide teaching session.
#[instrument(name = "ws_session", skip_all, fields(connection_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
    tracing::Span::current().record("connection_id", connection_id);
    info!("New WebSocket connection.");

    let (mut socket_tx, mut socket_rx) = socket.split();

    while let Some(msg_result) = socket_rx.next().await {
        let ws_msg = match msg_result {
            Ok(ws_msg) => ws_msg,
            Err(e) => {
                error!("Error receiving from client WebSocket: {:?}", e);
                break;
            }
        };
        let outcome = match ws_msg {
            Message::Text(text) => handle_text(&state, text.as_str(), &mut socket_tx).await,
            Message::Close(_) => {
                info!("Client sent close frame. Shutting down session.");
                break;
            }
            Message::Binary(_) => {
                warn!("Ignoring binary message.");
                Ok(())
            }
            Message::Ping(_) | Message::Pong(_) => Ok(()),
        };
        if let Err(e) = outcome {
            error!(error = ?e, "Failed to write to client WebSocket.");
            break;
        }
    }

    info!("WebSocket connection closed.");
}

async fn handle_text<S>(state: &AppState, text: &str, sink: &mut S) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::UserMessage { text }) => handle_chat_turn(state, &text, sink).await,
        Ok(ClientMessage::Seed { syllabus, task }) => {
            state
                .session
                .lock()
                .await
                .seed(Syllabus::new(syllabus), task);
            info!("Teaching session seeded over WebSocket.");
            send_msg(sink, ServerMessage::Seeded).await
        }
        Err(e) => {
            warn!("Rejecting malformed client message: {}", e);
            send_msg(
                sink,
                ServerMessage::Error {
                    message: format!("Invalid message: {e}"),
                },
            )
            .await
        }
    }
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg<S>(sink: &mut S, msg: ServerMessage) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let serialized = serde_json::to_string(&msg)?;
    sink.send(Message::Text(serialized.into())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CannedLlm, test_state};

    #[tokio::test]
    async fn test_seed_message_replaces_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(Arc::new(CannedLlm::default()), &dir.path().join("p.json"));
        state.session.lock().await.human_step("old turn");
        let mut sent: Vec<Message> = Vec::new();

        handle_text(
            &state,
            r#"{"type": "seed", "syllabus": "1. Limits", "task": "teach calculus"}"#,
            &mut sent,
        )
        .await
        .unwrap();

        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_text().unwrap(), r#"{"type":"seeded"}"#);
        let session = state.session.lock().await;
        assert_eq!(session.syllabus().as_str(), "1. Limits");
        assert_eq!(session.task(), "teach calculus");
        assert!(session.conversation_history().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_message_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(CannedLlm::default());
        let state = test_state(llm.clone(), &dir.path().join("p.json"));
        let mut sent: Vec<Message> = Vec::new();

        handle_text(&state, "not json", &mut sent).await.unwrap();

        assert_eq!(sent.len(), 1);
        assert!(sent[0].to_text().unwrap().contains(r#""type":"error""#));
        assert_eq!(llm.call_count(), 0);
    }
}
