//! WebSocket Chat
//!
//! Streams instructor replies to the browser the way a person types them.
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `session`: Manages the WebSocket connection lifecycle, from handshake to termination.
//! - `cycle`: Runs one learner/instructor turn and streams the reply.

mod cycle;
pub mod protocol;
pub mod session;

pub use session::ws_handler;
