//! Types for conversation management.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters shown in a conversation title.
pub const TITLE_MAX_CHARS: usize = 30;

/// Title shown for a conversation without any user message.
pub const PLACEHOLDER_TITLE: &str = "New chat";

/// Prefix of generated conversation identifiers.
const ID_PREFIX: &str = "chat_";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person at the keyboard.
    User,
    /// Returned by the model.
    Assistant,
}

impl Role {
    /// Lowercase wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Shorthand for a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Shorthand for an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Author of the message.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Message text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Identifier of a conversation within one session (`chat_<index>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Identifier for the conversation allocated at `index`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(format!("{ID_PREFIX}{index}"))
    }

    /// Borrow the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An ordered, append-only list of messages.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: ConversationId,
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation.
    #[must_use]
    pub const fn new(id: ConversationId) -> Self {
        Self {
            id,
            messages: Vec::new(),
        }
    }

    /// Conversation identifier.
    #[must_use]
    pub const fn id(&self) -> &ConversationId {
        &self.id
    }

    /// Messages in append order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message at the end.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Display title: the first user message cut to [`TITLE_MAX_CHARS`]
    /// characters, or [`PLACEHOLDER_TITLE`].
    #[must_use]
    pub fn title(&self) -> String {
        self.messages
            .iter()
            .find(|m| m.role() == Role::User)
            .map(|m| m.content().chars().take(TITLE_MAX_CHARS).collect::<String>())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string())
    }
}

/// Entry of the conversation selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTitle {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Derived display title.
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        assert_eq!(ConversationId::from_index(0).as_str(), "chat_0");
        assert_eq!(ConversationId::from_index(12).to_string(), "chat_12");
    }

    #[test]
    fn test_title_truncates_to_30_chars() {
        let mut conversation = Conversation::new(ConversationId::from_index(0));
        let text = "Hello world, how are you today please";
        assert_eq!(text.chars().count(), 37);
        conversation.push(Message::user(text));

        let title = conversation.title();
        assert_eq!(title.chars().count(), 30);
        assert_eq!(title, "Hello world, how are you today");
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let mut conversation = Conversation::new(ConversationId::from_index(0));
        conversation.push(Message::user("請".repeat(40)));
        assert_eq!(conversation.title(), "請".repeat(30));
    }

    #[test]
    fn test_title_placeholder_without_user_message() {
        let mut conversation = Conversation::new(ConversationId::from_index(3));
        assert_eq!(conversation.title(), PLACEHOLDER_TITLE);

        conversation.push(Message::assistant("Hi, how can I help?"));
        assert_eq!(conversation.title(), PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_title_uses_first_user_message() {
        let mut conversation = Conversation::new(ConversationId::from_index(0));
        conversation.push(Message::assistant("Welcome"));
        conversation.push(Message::user("first"));
        conversation.push(Message::user("second"));
        assert_eq!(conversation.title(), "first");
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&Role::Assistant).unwrap_or_default();
        assert_eq!(json, "\"assistant\"");
    }
}
