//! Defines the WebSocket message protocol between the browser client and the API server.

use serde::{Deserialize, Serialize};

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Replaces the teaching session with a syllabus and task.
    Seed { syllabus: String, task: String },
    /// A text message from the learner to the instructor.
    UserMessage { text: String },
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms that the session was seeded.
    Seeded,
    /// Reports an error to the client. The connection stays open.
    Error { message: String },
    /// Signals the beginning of a streamed instructor reply.
    ResponseStart,
    /// A chunk of a streamed instructor reply.
    ResponseChunk { chunk: String },
    /// Signals the end of a streamed instructor reply.
    ResponseEnd,
}
