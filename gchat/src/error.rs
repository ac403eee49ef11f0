//! Chat-layer errors and the text shown to end users.

use std::error::Error;
use std::fmt::{Display, Formatter};

use gprovider::{ProviderError, ProviderErrorKind};

pub const BACKEND_UNAVAILABLE_MESSAGE: &str =
    "Gemini is not available right now. No supported model could be reached. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    BackendUnavailable,
    RateLimited,
    ToolLoopLimit,
    Timeout,
    Provider,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    /// Roster exhaustion; the message never names the candidates tried.
    pub fn backend_unavailable() -> Self {
        Self::new(ChatErrorKind::BackendUnavailable, BACKEND_UNAVAILABLE_MESSAGE)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::RateLimited, message)
    }

    pub fn tool_loop_limit(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ToolLoopLimit, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Timeout, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message)
    }

    pub fn is_retry_later(&self) -> bool {
        matches!(
            self.kind,
            ChatErrorKind::BackendUnavailable | ChatErrorKind::RateLimited
        )
    }

    /// Text safe to show an end user.
    pub fn user_message(&self) -> &str {
        match self.kind {
            ChatErrorKind::InvalidRequest => &self.message,
            ChatErrorKind::BackendUnavailable => BACKEND_UNAVAILABLE_MESSAGE,
            ChatErrorKind::RateLimited => {
                "Gemini is receiving too many requests right now. Please try again in a moment."
            }
            ChatErrorKind::ToolLoopLimit => {
                "That request needed too many tool calls to finish. Please try a more specific question."
            }
            ChatErrorKind::Timeout => "Gemini took too long to respond. Please try again.",
            ChatErrorKind::Provider => "Something went wrong while talking to Gemini. Please try again.",
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        let kind = match value.kind {
            ProviderErrorKind::RateLimited => ChatErrorKind::RateLimited,
            ProviderErrorKind::Timeout => ChatErrorKind::Timeout,
            ProviderErrorKind::ModelUnavailable | ProviderErrorKind::Unavailable => {
                return ChatError::backend_unavailable();
            }
            _ => ChatErrorKind::Provider,
        };
        ChatError::new(kind, value.to_string())
    }
}
