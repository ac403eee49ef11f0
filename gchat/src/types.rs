//! Caller-facing request, event, and outcome shapes.

use std::pin::Pin;

use futures_core::Stream;
use gprovider::{Part, Role};
use gtooling::ToolInvocationRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ChatError;

pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/png";

/// Speaker of a history turn; anything other than `user` is treated as the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TurnRole {
    User,
    Model,
}

impl From<String> for TurnRole {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("user") {
            Self::User
        } else {
            Self::Model
        }
    }
}

impl From<TurnRole> for Role {
    fn from(value: TurnRole) -> Self {
        match value {
            TurnRole::User => Role::User,
            TurnRole::Model => Role::Model,
        }
    }
}

fn default_image_mime_type() -> String {
    DEFAULT_IMAGE_MIME_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    #[serde(rename = "mimeType", default = "default_image_mime_type")]
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

impl ImageAttachment {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn png(data: impl Into<String>) -> Self {
        Self::new(DEFAULT_IMAGE_MIME_TYPE, data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    #[serde(alias = "content", default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageAttachment>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            images: Vec::new(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.images.push(image);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
}

impl UserInfo {
    pub fn new(first_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: None,
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// "First Last" or just the first name; `None` without a first name.
    pub fn display_name(&self) -> Option<String> {
        let first = self.first_name.as_deref().map(str::trim).filter(|name| !name.is_empty())?;
        match self.last_name.as_deref().map(str::trim).filter(|name| !name.is_empty()) {
            Some(last) => Some(format!("{first} {last}")),
            None => Some(first.to_string()),
        }
    }
}

/// One caller request, shared by both session types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "imageParts", skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageAttachment>,
    #[serde(rename = "userInfo", default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    /// Passed to tools unmodified; ignored by streaming.
    #[serde(
        rename = "contextData",
        alias = "channelData",
        default,
        skip_serializing_if = "Value::is_null"
    )]
    pub context_data: Value,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            history: Vec::new(),
            message: message.into(),
            images: Vec::new(),
            user_info: None,
            context_data: Value::Null,
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_turn(mut self, turn: ConversationTurn) -> Self {
        self.history.push(turn);
        self
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_user_info(mut self, user_info: UserInfo) -> Self {
        self.user_info = Some(user_info);
        self
    }

    pub fn with_context_data(mut self, context_data: Value) -> Self {
        self.context_data = context_data;
        self
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.message.trim().is_empty() {
            return Err(ChatError::invalid_request("message must not be empty"));
        }

        if self.images.iter().any(|image| image.data.trim().is_empty()) {
            return Err(ChatError::invalid_request("image attachments must carry data"));
        }

        Ok(())
    }
}

/// Typed piece of a consolidated streamed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructuredPart {
    Text {
        text: String,
    },
    Code {
        language: String,
        code: String,
    },
    Result {
        outcome: String,
        output: String,
    },
    Image {
        #[serde(rename = "mimeType")]
        mime_type: String,
        data: String,
    },
}

impl StructuredPart {
    /// Displayable form of a backend part; function traffic and non-image blobs have none.
    pub fn from_part(part: &Part) -> Option<Self> {
        match part {
            Part::Text(text) => Some(Self::Text { text: text.clone() }),
            Part::ExecutableCode(code) => Some(Self::Code {
                language: if code.language.is_empty() {
                    "PYTHON".to_string()
                } else {
                    code.language.clone()
                },
                code: code.code.clone(),
            }),
            Part::CodeExecutionResult(result) => Some(Self::Result {
                outcome: result.outcome.clone(),
                output: result.output.clone(),
            }),
            Part::InlineData(blob) if blob.mime_type.starts_with("image/") => Some(Self::Image {
                mime_type: blob.mime_type.clone(),
                data: blob.data.clone(),
            }),
            Part::InlineData(_) | Part::FunctionCall(_) | Part::FunctionResponse(_) => None,
        }
    }

    /// Whether a backend part forces a consolidated `fullResponse` event.
    pub fn is_structured_artifact(part: &Part) -> bool {
        match part {
            Part::ExecutableCode(_) | Part::CodeExecutionResult(_) => true,
            Part::InlineData(blob) => blob.mime_type.starts_with("image/"),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamEvent {
    Text { text: String },
    FullResponse { parts: Vec<StructuredPart> },
    Grounding { data: Value },
}

impl StreamEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

pub type ChatEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ChatError>> + Send>>;

/// Result of a tool-calling session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallingOutcome {
    pub text: String,
    /// Display views of visual tool results, in call order.
    pub charts: Vec<Value>,
    pub tool_calls: Vec<ToolInvocationRecord>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub round_limit_reached: bool,
}
