//! Backend-agnostic content, request, and response types for generative chat calls.
//!
//! ```rust
//! use gprovider::{Content, GenerateRequest, ProviderErrorKind};
//!
//! let ok = GenerateRequest::new_validated("gemini-2.0-flash", vec![Content::user_text("Hello")]);
//! assert!(ok.is_ok());
//!
//! let err = GenerateRequest::new_validated("", vec![Content::user_text("hi")])
//!     .err()
//!     .expect("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};

use gcommon::{GenerationOptions, MetadataMap};
use serde_json::Value;

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

impl InlineData {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableCode {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExecutionResult {
    pub outcome: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineData(InlineData),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
    ExecutableCode(ExecutableCode),
    CodeExecutionResult(CodeExecutionResult),
}

impl Part {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Code-execution output and generated media count as artifacts.
    pub fn is_artifact(&self) -> bool {
        matches!(
            self,
            Self::ExecutableCode(_) | Self::CodeExecutionResult(_) | Self::InlineData(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![Part::text(text)])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema describing the call arguments.
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendTool {
    FunctionDeclarations(Vec<FunctionDeclaration>),
    GoogleSearch,
    CodeExecution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub candidates_tokens: u32,
    pub total_tokens: u32,
}

/// One entry of the backend's model listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    pub display_name: Option<String>,
    pub supported_methods: Vec<String>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            supported_methods: Vec::new(),
        }
    }

    /// Name without the `models/` resource prefix.
    pub fn candidate_id(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    /// Descriptors that list no methods are assumed to support generation.
    pub fn supports_generation(&self) -> bool {
        self.supported_methods.is_empty()
            || self
                .supported_methods
                .iter()
                .any(|method| method == "generateContent" || method == "streamGenerateContent")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub model: String,
    pub parts: Vec<Part>,
    pub grounding: Option<Value>,
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
}

impl GenerateResponse {
    pub fn new(model: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            model: model.into(),
            parts,
            grounding: None,
            finish_reason: FinishReason::Stop,
            usage: TokenUsage::default(),
        }
    }

    pub fn with_grounding(mut self, grounding: Value) -> Self {
        self.grounding = Some(grounding);
        self
    }

    /// Concatenation of every text part.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    /// First requested function call, if any.
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.parts.iter().find_map(|part| match part {
            Part::FunctionCall(call) => Some(call),
            _ => None,
        })
    }

    pub fn has_artifacts(&self) -> bool {
        self.parts.iter().any(Part::is_artifact)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Vec<Content>,
    pub tools: Vec<BackendTool>,
    pub options: GenerationOptions,
    pub metadata: MetadataMap,
}

impl GenerateRequest {
    pub fn builder(model: impl Into<String>) -> GenerateRequestBuilder {
        GenerateRequestBuilder::new(model)
    }

    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            contents,
            tools: Vec::new(),
            options: GenerationOptions::default(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn new_validated(
        model: impl Into<String>,
        contents: Vec<Content>,
    ) -> Result<Self, ProviderError> {
        let request = Self::new(model, contents);
        request.validate()?;
        Ok(request)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_tools(mut self, tools: Vec<BackendTool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.contents.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one content entry is required",
            ));
        }

        if self.contents.iter().any(|content| content.parts.is_empty()) {
            return Err(ProviderError::invalid_request(
                "content entries must carry at least one part",
            ));
        }

        if let Some(max_output_tokens) = self.options.max_output_tokens
            && max_output_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_output_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequestBuilder {
    model: String,
    contents: Vec<Content>,
    tools: Vec<BackendTool>,
    options: GenerationOptions,
    metadata: MetadataMap,
}

impl GenerateRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            contents: Vec::new(),
            tools: Vec::new(),
            options: GenerationOptions::default(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    pub fn contents(mut self, contents: Vec<Content>) -> Self {
        self.contents.extend(contents);
        self
    }

    pub fn tool(mut self, tool: BackendTool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.options.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<GenerateRequest, ProviderError> {
        let request = GenerateRequest {
            model: self.model,
            contents: self.contents,
            tools: self.tools,
            options: self.options,
            metadata: self.metadata,
        };

        request.validate()?;
        Ok(request)
    }
}
