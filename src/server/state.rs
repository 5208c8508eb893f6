//! Application state shared across all request handlers.

use std::sync::Arc;

use anyhow::Context;

use super::render::PageRenderer;
use crate::chat::ChatService;
use crate::config::AppConfig;
use crate::llm::{GeminiClient, ModelClient};
use crate::session::SessionRegistry;

/// Shared application state.
pub struct AppState {
    /// Submit flow bound to the model client.
    pub chat: ChatService,
    /// Live sessions.
    pub sessions: Arc<SessionRegistry>,
    /// Page renderer.
    pub renderer: PageRenderer,
}

impl AppState {
    /// Create the state with a Gemini client built from `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or the page template cannot be
    /// initialized.
    pub fn new(config: &AppConfig) -> anyhow::Result<Arc<Self>> {
        let client = GeminiClient::from_config(config).context("failed to create Gemini client")?;
        Self::with_client(Arc::new(client), config)
    }

    /// Create the state around an arbitrary model client.
    ///
    /// # Errors
    /// Returns an error if the page template cannot be compiled.
    pub fn with_client(
        client: Arc<dyn ModelClient>,
        config: &AppConfig,
    ) -> anyhow::Result<Arc<Self>> {
        let renderer = PageRenderer::new().context("failed to load page template")?;
        Ok(Arc::new(Self {
            chat: ChatService::new(client, config.request_timeout),
            sessions: Arc::new(SessionRegistry::new(config.session_ttl)),
            renderer,
        }))
    }
}
