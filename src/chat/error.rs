//! Error types for the chat flow.

use thiserror::Error;

use super::types::ConversationId;
use crate::llm::LlmError;
use crate::table::TableError;

/// How an error is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Input problem; nothing was changed.
    Warning,
    /// Upstream failure; state up to the failure is kept.
    Error,
}

/// Errors raised while handling a chat action.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Empty or whitespace-only submission.
    #[error("please enter a question before sending")]
    EmptyInput,

    /// No conversation with this identifier exists in the session.
    #[error("unknown conversation: {0}")]
    UnknownConversation(ConversationId),

    /// The remote model call failed.
    #[error("model request failed: {0}")]
    Model(#[from] LlmError),

    /// The uploaded file could not be summarized.
    #[error("could not read uploaded table: {0}")]
    Table(#[from] TableError),

    /// The remote model did not answer within the configured bound.
    #[error("model request timed out after {0} seconds")]
    Timeout(u64),

    /// The session ended while the request was in flight.
    #[error("request cancelled because the session ended")]
    Cancelled,
}

impl ChatError {
    /// Presentation level of the error.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::EmptyInput => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Convenience result alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
