//! In-memory conversation store scoped to one session.
//!
//! Conversations are kept in insertion order. `append_message` requires the
//! target conversation to exist; callers that want a conversation on demand
//! go through [`ConversationStore::ensure_current`].

use tracing::debug;

use super::error::{ChatError, ChatResult};
use super::types::{Conversation, ConversationId, ConversationTitle, Message, Role};

/// Conversations of one session plus the selected one.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    current: Option<ConversationId>,
    next_index: usize,
}

impl ConversationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next `chat_<n>` conversation, optionally seeded with one
    /// message, and make it current.
    pub fn create_conversation(&mut self, initial_message: Option<Message>) -> ConversationId {
        let id = ConversationId::from_index(self.next_index);
        self.next_index += 1;

        let mut conversation = Conversation::new(id.clone());
        if let Some(message) = initial_message {
            conversation.push(message);
        }
        self.conversations.push(conversation);
        self.current = Some(id.clone());

        debug!(conversation = %id, "Created conversation");
        id
    }

    /// Append a message to an existing conversation.
    ///
    /// # Errors
    /// Returns [`ChatError::UnknownConversation`] if `id` is not in the store;
    /// nothing is modified in that case.
    pub fn append_message(
        &mut self,
        id: &ConversationId,
        role: Role,
        content: impl Into<String>,
    ) -> ChatResult<()> {
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| ChatError::UnknownConversation(id.clone()))?;
        conversation.push(Message::new(role, content));
        Ok(())
    }

    /// Titles of all conversations in creation order.
    #[must_use]
    pub fn list_titles(&self) -> Vec<ConversationTitle> {
        self.conversations
            .iter()
            .map(|c| ConversationTitle {
                id: c.id().clone(),
                title: c.title(),
            })
            .collect()
    }

    /// Make `id` the current conversation.
    ///
    /// # Errors
    /// Returns [`ChatError::UnknownConversation`] if `id` is not in the store;
    /// the current selection is left unchanged.
    pub fn select(&mut self, id: &ConversationId) -> ChatResult<()> {
        if !self.contains(id) {
            return Err(ChatError::UnknownConversation(id.clone()));
        }
        self.current = Some(id.clone());
        Ok(())
    }

    /// Messages of the current conversation, empty when none is selected.
    #[must_use]
    pub fn current_messages(&self) -> &[Message] {
        self.current
            .as_ref()
            .and_then(|id| self.get(id))
            .map(Conversation::messages)
            .unwrap_or_default()
    }

    /// Identifier of the current conversation.
    #[must_use]
    pub const fn current_id(&self) -> Option<&ConversationId> {
        self.current.as_ref()
    }

    /// Current conversation id, creating an empty conversation if none is
    /// selected.
    pub fn ensure_current(&mut self) -> ConversationId {
        self.current
            .clone()
            .unwrap_or_else(|| self.create_conversation(None))
    }

    /// Look up a conversation.
    #[must_use]
    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == id)
    }

    /// Whether `id` exists.
    #[must_use]
    pub fn contains(&self, id: &ConversationId) -> bool {
        self.get(id).is_some()
    }

    /// Number of conversations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Whether the store holds no conversation.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::types::PLACEHOLDER_TITLE;

    #[test]
    fn test_create_allocates_sequential_ids() {
        let mut store = ConversationStore::new();
        let first = store.create_conversation(None);
        let second = store.create_conversation(Some(Message::user("hi")));

        assert_eq!(first.as_str(), "chat_0");
        assert_eq!(second.as_str(), "chat_1");
        assert_eq!(store.current_id(), Some(&second));
        assert_eq!(store.current_messages().len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = ConversationStore::new();
        let id = store.create_conversation(None);
        let texts = ["one", "two", "three", "four"];
        for (i, text) in texts.iter().enumerate() {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert!(store.append_message(&id, role, *text).is_ok());
        }

        let contents: Vec<&str> = store.current_messages().iter().map(Message::content).collect();
        assert_eq!(contents, texts);
        assert_eq!(store.current_messages()[1].role(), Role::Assistant);
    }

    #[test]
    fn test_append_to_unknown_conversation_fails() {
        let mut store = ConversationStore::new();
        let missing = ConversationId::from("chat_9");
        let result = store.append_message(&missing, Role::User, "hello");

        assert!(matches!(result, Err(ChatError::UnknownConversation(id)) if id == missing));
        assert!(store.is_empty());
    }

    #[test]
    fn test_select_unknown_keeps_current() {
        let mut store = ConversationStore::new();
        let first = store.create_conversation(None);
        let second = store.create_conversation(None);

        assert!(store.select(&first).is_ok());
        assert_eq!(store.current_id(), Some(&first));

        assert!(store.select(&ConversationId::from("nope")).is_err());
        assert_eq!(store.current_id(), Some(&first));
        assert!(store.contains(&second));
    }

    #[test]
    fn test_current_messages_empty_without_selection() {
        let store = ConversationStore::new();
        assert!(store.current_messages().is_empty());
        assert!(store.current_id().is_none());
    }

    #[test]
    fn test_list_titles_in_insertion_order() {
        let mut store = ConversationStore::new();
        store.create_conversation(Some(Message::user("Hello world, how are you today please")));
        store.create_conversation(None);
        store.create_conversation(Some(Message::user("short")));

        let titles = store.list_titles();
        assert_eq!(titles.len(), 3);
        assert_eq!(titles[0].id.as_str(), "chat_0");
        assert_eq!(titles[0].title.chars().count(), 30);
        assert_eq!(titles[1].title, PLACEHOLDER_TITLE);
        assert_eq!(titles[2].title, "short");
    }

    #[test]
    fn test_ensure_current_creates_once() {
        let mut store = ConversationStore::new();
        let id = store.ensure_current();
        assert_eq!(store.ensure_current(), id);
        assert_eq!(store.len(), 1);
    }
}
