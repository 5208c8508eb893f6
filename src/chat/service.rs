//! One submit pass: validate, record, prompt, call the model, record.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::error::{ChatError, ChatResult};
use super::prompt::{build_prompt, validate_input};
use super::types::{ConversationId, Role};
use crate::llm::ModelClient;
use crate::session::Session;

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Conversation that received both messages.
    pub conversation_id: ConversationId,
    /// Assistant reply.
    pub reply: String,
}

/// Drives a session's conversation against the remote model.
#[derive(Clone)]
pub struct ChatService {
    client: Arc<dyn ModelClient>,
    timeout: Duration,
}

impl ChatService {
    /// Create a service bounding every remote call by `timeout`.
    #[must_use]
    pub const fn new(client: Arc<dyn ModelClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Identifier of the underlying model.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Submit `text` to the current conversation of `session`, creating one
    /// if none is selected.
    ///
    /// The user message is recorded before the remote call and is kept when
    /// the call fails, times out or is cancelled. The session lock is not
    /// held while waiting for the model.
    ///
    /// # Errors
    /// - [`ChatError::EmptyInput`] for blank text; nothing is recorded and
    ///   the model is not called.
    /// - [`ChatError::Model`], [`ChatError::Timeout`] or
    ///   [`ChatError::Cancelled`] when no reply was obtained.
    pub async fn submit(
        &self,
        session: &Session,
        text: &str,
        table_summary: Option<&str>,
    ) -> ChatResult<SubmitOutcome> {
        let text = validate_input(text)?;

        let conversation_id = {
            let mut state = session.lock().await;
            let id = state.conversations.ensure_current();
            state.conversations.append_message(&id, Role::User, text)?;
            id
        };

        let prompt = build_prompt(text, table_summary);
        debug!(
            session = %session.id(),
            conversation = %conversation_id,
            prompt_len = prompt.len(),
            with_table = table_summary.is_some(),
            "Submitting prompt"
        );

        let reply = self.call_model(session, &prompt).await.inspect_err(|err| {
            if matches!(err, ChatError::Model(llm) if llm.is_auth()) {
                error!(session = %session.id(), %err, "Gemini rejected the API key");
            } else {
                warn!(session = %session.id(), conversation = %conversation_id, %err, "No reply from model");
            }
        })?;

        session
            .lock()
            .await
            .conversations
            .append_message(&conversation_id, Role::Assistant, reply.clone())?;

        Ok(SubmitOutcome {
            conversation_id,
            reply,
        })
    }

    async fn call_model(&self, session: &Session, prompt: &str) -> ChatResult<String> {
        tokio::select! {
            () = session.cancel_token().cancelled() => Err(ChatError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.client.generate(prompt)) => match result {
                Ok(reply) => Ok(reply?),
                Err(_) => Err(ChatError::Timeout(self.timeout.as_secs())),
            },
        }
    }
}
