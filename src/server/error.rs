//! JSON error envelope for the API routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::chat::ChatError;

/// Error returned by the JSON API.
#[derive(Debug)]
pub enum ApiError {
    /// Failure of the chat flow.
    Chat(ChatError),
    /// Malformed request body.
    BadRequest(String),
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self::Chat(err)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Chat(err) => {
                let (status, code) = match err {
                    ChatError::EmptyInput => (StatusCode::BAD_REQUEST, "EMPTY_INPUT"),
                    ChatError::UnknownConversation(_) => {
                        (StatusCode::NOT_FOUND, "CONVERSATION_NOT_FOUND")
                    }
                    ChatError::Model(_) => (StatusCode::BAD_GATEWAY, "MODEL_ERROR"),
                    ChatError::Table(_) => (StatusCode::UNPROCESSABLE_ENTITY, "TABLE_ERROR"),
                    ChatError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "MODEL_TIMEOUT"),
                    ChatError::Cancelled => (StatusCode::CONFLICT, "SESSION_ENDED"),
                };
                (status, code, err.to_string())
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(ChatError::EmptyInput), StatusCode::BAD_REQUEST),
            (
                ApiError::from(ChatError::Model(LlmError::EmptyResponse)),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::from(ChatError::Timeout(5)), StatusCode::GATEWAY_TIMEOUT),
            (
                ApiError::from(ChatError::UnknownConversation("chat_7".into())),
                StatusCode::NOT_FOUND,
            ),
            (ApiError::BadRequest("missing field".to_string()), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
