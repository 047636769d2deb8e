//! Scripted Dialogue Agent
//!
//! The smallest conversational unit in the system: a fixed system instruction
//! plus an append-only transcript. Every higher-level flow (the negotiation
//! protocol, the content generators) is built by stepping one or more of these.

use crate::{
    error::UpstreamError,
    llm_client::ModelHandle,
    message::{Message, Role},
};
use tracing::debug;

/// An agent that answers each input in the context of everything it has seen.
pub struct DiscussAgent {
    system_message: Message,
    model: ModelHandle,
    stored_messages: Vec<Message>,
}

impl DiscussAgent {
    /// Creates an agent whose transcript holds only `system_message`.
    pub fn new(system_message: Message, model: ModelHandle) -> Self {
        debug_assert_eq!(system_message.role(), Role::System);
        let stored_messages = vec![system_message.clone()];
        Self {
            system_message,
            model,
            stored_messages,
        }
    }

    /// Discards everything except the system message.
    pub fn reset(&mut self) {
        self.stored_messages.clear();
        self.stored_messages.push(self.system_message.clone());
    }

    pub fn transcript(&self) -> &[Message] {
        &self.stored_messages
    }

    pub fn system_message(&self) -> &Message {
        &self.system_message
    }

    /// Appends `input`, sends the whole transcript, appends and returns the reply.
    ///
    /// On failure the input is taken back out so the transcript only ever holds
    /// answered inputs.
    pub async fn step(&mut self, input: Message) -> Result<Message, UpstreamError> {
        self.stored_messages.push(input);
        match self.model.complete(&self.stored_messages).await {
            Ok(reply) => {
                debug!(
                    transcript_len = self.stored_messages.len() + 1,
                    reply_len = reply.content().len(),
                    "Agent stepped"
                );
                self.stored_messages.push(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                self.stored_messages.pop();
                Err(e)
            }
        }
    }
}
