//! Remote model access.
//!
//! The rest of the crate only sees [`ModelClient`]: one prompt in, one reply
//! out. [`GeminiClient`] is the production implementation.

pub mod error;
pub mod gemini;

pub use error::{LlmError, LlmResult};
pub use gemini::GeminiClient;

use async_trait::async_trait;

/// A hosted text-generation model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send a single prompt and return the full reply text.
    ///
    /// # Errors
    /// Returns an error on transport, authentication, quota or content-policy
    /// failures. No retries are attempted.
    async fn generate(&self, prompt: &str) -> LlmResult<String>;

    /// Identifier of the model answering requests.
    fn model_name(&self) -> &str;
}
