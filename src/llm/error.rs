//! Error types for the model client.

use thiserror::Error;

/// Errors produced while talking to the hosted model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport-level failure (DNS, TLS, connection reset, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error envelope, or the raw body.
        message: String,
    },

    /// The prompt was rejected by the content filter.
    #[error("prompt blocked: {0}")]
    Blocked(String),

    /// The API returned no usable text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The response body was not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client construction failed.
    #[error("client configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether the failure is caused by credentials or permissions.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Convenience result alias for model calls.
pub type LlmResult<T> = Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_classification() {
        let denied = LlmError::Api {
            status: 403,
            message: "API key not valid".to_string(),
        };
        assert!(denied.is_auth());
        assert!(!LlmError::EmptyResponse.is_auth());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = LlmError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "API error (429): quota exceeded");
    }
}
