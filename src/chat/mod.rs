//! Conversation management.
//!
//! This module provides the per-session conversation store, prompt
//! construction and the submit flow tying them to the model client.

pub mod error;
pub mod prompt;
pub mod service;
pub mod store;
pub mod types;

pub use error::{ChatError, ChatResult, Severity};
pub use prompt::{build_prompt, validate_input};
pub use service::{ChatService, SubmitOutcome};
pub use store::ConversationStore;
pub use types::{Conversation, ConversationId, ConversationTitle, Message, Role};
