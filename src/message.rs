//! # Message
//! A conversation is an ordered list of role-tagged messages. A [Message] has no identity
//! beyond its position in the list and is not modified once appended; history management
//! (truncation to a token budget) lives in [crate::utils::token::tiktoken].

use std::fmt;
use std::fmt::Formatter;

use serde::{Deserialize, Serialize};

/// Role tag of a [Message].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Steers the model's behavior, conventionally first in a conversation.
    System,
    /// User-authored content.
    Human,
    /// Model-generated content.
    Ai,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::Human => "human",
            Self::Ai => "ai",
        })
    }
}

/// A role tag paired with text content. An ordered `Vec<Message>` is a conversation history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Shorthand for a [Role::System] message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Shorthand for a [Role::Human] message.
    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    /// Shorthand for a [Role::Ai] message.
    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.content)
    }
}

#[cfg(test)]
mod test_message {
    use super::{Message, Role};

    #[test]
    fn test_role_serde_names() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::Human).unwrap(), "\"human\"");
        assert_eq!(serde_json::to_string(&Role::Ai).unwrap(), "\"ai\"");
        let role: Role = serde_json::from_str("\"ai\"").unwrap();
        assert_eq!(role, Role::Ai);
    }

    #[test]
    fn test_message_display() {
        let msg = Message::human("What is 81 divided by 9?");
        assert_eq!(msg.to_string(), "human: What is 81 divided by 9?");
    }

    #[test]
    fn test_message_roundtrip() {
        let msg = Message::system("You are a helpful AI assistant.");
        let encoded = serde_json::to_string(&msg).unwrap();
        let decoded: Message = serde_json::from_str(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }
}
