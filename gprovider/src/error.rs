//! Shared backend error kinds, classification, and error value helpers.
//!
//! ```rust
//! use gprovider::{ProviderError, ProviderErrorKind};
//!
//! let throttled = ProviderError::classify(Some(429), "Resource exhausted");
//! assert_eq!(throttled.kind, ProviderErrorKind::RateLimited);
//! assert!(throttled.retryable);
//!
//! let gone = ProviderError::classify(Some(404), "models/gemini-x is not found");
//! assert!(gone.is_model_unusable());
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    /// The requested model does not exist or does not support the requested mode.
    ModelUnavailable,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Authentication, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message, true)
    }

    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::ModelUnavailable, message, false)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message, false)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message, false)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message, false)
    }

    /// Maps an HTTP status (when known) and the backend's error text to an error value.
    ///
    /// Message signals win over the status code because some backends report a missing
    /// model as a generic 400 and throttling as a 503 with a quota message.
    pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();

        if is_rate_limit_signal(status, &message) {
            return Self::rate_limited(message);
        }

        if is_model_unusable_signal(status, &message) {
            return Self::model_unavailable(message);
        }

        match status {
            Some(401) | Some(403) => Self::authentication(message),
            Some(408) | Some(504) => Self::timeout(message),
            Some(400) | Some(422) => Self::invalid_request(message),
            Some(502) | Some(503) => Self::unavailable(message),
            Some(_) => Self::transport(message),
            None => Self::other(message),
        }
    }

    pub fn is_model_unusable(&self) -> bool {
        self.kind == ProviderErrorKind::ModelUnavailable
    }

    pub fn is_transient(&self) -> bool {
        self.retryable
    }
}

fn is_rate_limit_signal(status: Option<u16>, message: &str) -> bool {
    if status == Some(429) {
        return true;
    }

    let lowered = message.to_ascii_lowercase();
    lowered.contains("429") || lowered.contains("resource exhausted")
        || lowered.contains("resource_exhausted")
        || lowered.contains("quota")
}

fn is_model_unusable_signal(status: Option<u16>, message: &str) -> bool {
    if status == Some(404) {
        return true;
    }

    let lowered = message.to_ascii_lowercase();
    lowered.contains("404")
        || lowered.contains("not found")
        || lowered.contains("not supported")
        || (lowered.contains("model") && lowered.contains("does not exist"))
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ProviderError {}
