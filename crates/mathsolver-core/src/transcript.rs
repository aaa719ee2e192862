//! Session Transcript
//!
//! Ordered, append-only record of one session's conversation. Only `user`
//! and `assistant` messages can be appended; a fresh transcript always
//! starts with the assistant greeting.

use serde::{Deserialize, Serialize};

use crate::message::{Message, Role};

/// Greeting every new transcript starts with
pub const GREETING: &str = "Hi, I'm a Math chatbot who can answer all your math questions";

/// One rendered transcript entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub role: Role,
    pub content: String,
}

/// Append-only conversation history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// Create a transcript seeded with the greeting
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
        }
    }

    /// Append a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append an assistant message
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Role/content view of every message, in order
    pub fn render(&self) -> Vec<RenderedMessage> {
        self.messages
            .iter()
            .map(|m| RenderedMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    /// Flatten the history into the question handed to the decision loop.
    ///
    /// The whole conversation is the input, one `role: content` line per
    /// message, so earlier turns stay visible to the model.
    pub fn to_agent_input(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true for a transcript built with `new`
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
