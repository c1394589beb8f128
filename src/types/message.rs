use serde::{Deserialize, Serialize};

use crate::types::Role;

/// A single role-tagged message in a conversation.
///
/// Messages are immutable once created. The caller appends one with
/// [`Message::user`] when submitting a query and one with
/// [`Message::assistant`] when the full response has been received; the
/// only way a message leaves a conversation is an explicit clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the message.
    pub role: Role,

    /// The message text.
    pub content: String,
}

impl Message {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
