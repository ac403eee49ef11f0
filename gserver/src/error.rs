//! HTTP error responses: a status code plus `{"error": message}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gemline::{ChatError, ChatErrorKind, ToolError, ToolErrorKind};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        let status = match error.kind {
            ChatErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ChatErrorKind::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ChatErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ChatErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ChatErrorKind::ToolLoopLimit => StatusCode::UNPROCESSABLE_ENTITY,
            ChatErrorKind::Provider => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            tracing::error!(phase = "http", error = %error, "chat request failed");
        }
        Self::new(status, error.user_message())
    }
}

impl From<ToolError> for ApiError {
    fn from(error: ToolError) -> Self {
        let status = match error.kind {
            ToolErrorKind::InvalidArguments => StatusCode::BAD_REQUEST,
            ToolErrorKind::Unauthorized => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, error.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use gemline::BACKEND_UNAVAILABLE_MESSAGE;

    use super::*;

    #[test]
    fn chat_errors_map_to_statuses() {
        let cases = [
            (ChatError::invalid_request("message must not be empty"), StatusCode::BAD_REQUEST),
            (ChatError::backend_unavailable(), StatusCode::SERVICE_UNAVAILABLE),
            (ChatError::rate_limited("quota"), StatusCode::TOO_MANY_REQUESTS),
            (ChatError::timeout("slow"), StatusCode::GATEWAY_TIMEOUT),
            (ChatError::provider("boom"), StatusCode::BAD_GATEWAY),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }

    #[test]
    fn unavailable_message_hides_internal_detail() {
        let error = ApiError::from(ChatError::backend_unavailable());
        assert_eq!(error.message, BACKEND_UNAVAILABLE_MESSAGE);

        let error = ApiError::from(ChatError::provider("HTTP 500 from models/gemini-x"));
        assert!(!error.message.contains("gemini-x"));
    }
}
