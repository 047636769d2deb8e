//! Runs one learner/instructor turn and streams the reply character by character.

use crate::{
    state::AppState,
    ws::{protocol::ServerMessage, session::send_msg},
};
use anyhow::Result;
use axum::extract::ws::Message;
use futures_util::Sink;
use std::time::Duration;
use tracing::{debug, warn};

/// Records the learner's text, asks the instructor for a reply and streams it.
///
/// An upstream failure is reported to the client as an `Error` message and
/// the connection stays usable. Only a failed send ends the turn with an error.
pub async fn handle_chat_turn<S>(state: &AppState, user_text: &str, sink: &mut S) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let reply = {
        let mut session = state.session.lock().await;
        session.human_step(user_text);
        session.instructor_step().await
    };

    match reply {
        Ok(reply) => stream_reply(sink, &reply, state.typing_delay).await,
        Err(e) => {
            warn!("Instructor turn failed: {}", e);
            send_msg(
                sink,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            )
            .await
        }
    }
}

async fn stream_reply<S>(sink: &mut S, reply: &str, typing_delay: Duration) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    debug!(chars = reply.chars().count(), "Streaming instructor reply");
    send_msg(sink, ServerMessage::ResponseStart).await?;
    for ch in reply.chars() {
        send_msg(
            sink,
            ServerMessage::ResponseChunk {
                chunk: ch.to_string(),
            },
        )
        .await?;
        if !typing_delay.is_zero() {
            tokio::time::sleep(typing_delay).await;
        }
    }
    send_msg(sink, ServerMessage::ResponseEnd).await
}
