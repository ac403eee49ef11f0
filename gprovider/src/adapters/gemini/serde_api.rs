//! Gemini `generativelanguage` HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    BackendTool, CodeExecutionResult, Content, ExecutableCode, FinishReason, FunctionCall,
    FunctionResponse, GenerateRequest, GenerateResponse, InlineData, ModelDescriptor, Part,
    TokenUsage,
};

pub(crate) fn build_api_request(request: &GenerateRequest) -> GeminiApiRequest {
    let contents = request.contents.iter().map(GeminiApiContent::from).collect();
    let tools = request.tools.iter().map(GeminiApiTool::from).collect();
    let generation_config = if request.options.is_empty() {
        None
    } else {
        Some(GeminiApiGenerationConfig {
            temperature: request.options.temperature,
            max_output_tokens: request.options.max_output_tokens,
        })
    };

    GeminiApiRequest {
        contents,
        tools,
        generation_config,
    }
}

pub(crate) fn parse_finish_reason(value: Option<&str>) -> FinishReason {
    match value {
        Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::MaxTokens,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
            FinishReason::Safety
        }
        _ => FinishReason::Other,
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<GeminiApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

/// Payload of one SSE `data:` line, or `None` for comments, blanks, and terminators.
pub(crate) fn sse_data_payload(line: &str) -> Option<&str> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    Some(payload)
}

impl GeminiApiResponse {
    pub(crate) fn into_generate_response(self, requested_model: &str) -> GenerateResponse {
        let model = self
            .model_version
            .unwrap_or_else(|| requested_model.to_string());
        let usage = self.usage_metadata.map(TokenUsage::from).unwrap_or_default();

        let Some(candidate) = self.candidates.into_iter().next() else {
            let mut response = GenerateResponse::new(model, Vec::new());
            response.finish_reason = FinishReason::Other;
            response.usage = usage;
            return response;
        };

        let parts = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(GeminiApiPart::into_part)
                    .collect()
            })
            .unwrap_or_default();

        GenerateResponse {
            model,
            parts,
            grounding: candidate.grounding_metadata,
            finish_reason: parse_finish_reason(candidate.finish_reason.as_deref()),
            usage,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiErrorEnvelope {
    pub error: GeminiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiRequest {
    pub contents: Vec<GeminiApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<GeminiApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiApiGenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub(crate) struct GeminiApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiApiPart>,
}

impl From<&Content> for GeminiApiContent {
    fn from(value: &Content) -> Self {
        Self {
            role: Some(value.role.as_str().to_string()),
            parts: value.parts.iter().map(GeminiApiPart::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<GeminiApiBlob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<GeminiApiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<GeminiApiFunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_code: Option<GeminiApiExecutableCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_execution_result: Option<GeminiApiCodeExecutionResult>,
}

impl GeminiApiPart {
    /// Unrecognised part shapes (thought signatures, file references) are dropped.
    pub(crate) fn into_part(self) -> Option<Part> {
        if let Some(call) = self.function_call {
            return Some(Part::FunctionCall(FunctionCall {
                name: call.name,
                args: call.args,
            }));
        }
        if let Some(response) = self.function_response {
            return Some(Part::FunctionResponse(FunctionResponse {
                name: response.name,
                response: response.response,
            }));
        }
        if let Some(code) = self.executable_code {
            return Some(Part::ExecutableCode(ExecutableCode {
                language: code.language,
                code: code.code,
            }));
        }
        if let Some(result) = self.code_execution_result {
            return Some(Part::CodeExecutionResult(CodeExecutionResult {
                outcome: result.outcome,
                output: result.output,
            }));
        }
        if let Some(blob) = self.inline_data {
            return Some(Part::InlineData(InlineData::new(blob.mime_type, blob.data)));
        }
        self.text.map(Part::Text)
    }
}

impl From<&Part> for GeminiApiPart {
    fn from(value: &Part) -> Self {
        match value {
            Part::Text(text) => Self {
                text: Some(text.clone()),
                ..Self::default()
            },
            Part::InlineData(data) => Self {
                inline_data: Some(GeminiApiBlob {
                    mime_type: data.mime_type.clone(),
                    data: data.data.clone(),
                }),
                ..Self::default()
            },
            Part::FunctionCall(call) => Self {
                function_call: Some(GeminiApiFunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                ..Self::default()
            },
            Part::FunctionResponse(response) => Self {
                function_response: Some(GeminiApiFunctionResponse {
                    name: response.name.clone(),
                    response: response.response.clone(),
                }),
                ..Self::default()
            },
            Part::ExecutableCode(code) => Self {
                executable_code: Some(GeminiApiExecutableCode {
                    language: code.language.clone(),
                    code: code.code.clone(),
                }),
                ..Self::default()
            },
            Part::CodeExecutionResult(result) => Self {
                code_execution_result: Some(GeminiApiCodeExecutionResult {
                    outcome: result.outcome.clone(),
                    output: result.output.clone(),
                }),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiBlob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiApiFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiApiFunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiApiExecutableCode {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiApiCodeExecutionResult {
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub output: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiEmpty {}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_declarations: Option<Vec<GeminiApiFunctionDeclaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GeminiApiEmpty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_execution: Option<GeminiApiEmpty>,
}

impl From<&BackendTool> for GeminiApiTool {
    fn from(value: &BackendTool) -> Self {
        match value {
            BackendTool::FunctionDeclarations(declarations) => Self {
                function_declarations: Some(
                    declarations
                        .iter()
                        .map(|declaration| GeminiApiFunctionDeclaration {
                            name: declaration.name.clone(),
                            description: declaration.description.clone(),
                            parameters: declaration.parameters.clone(),
                        })
                        .collect(),
                ),
                ..Self::default()
            },
            BackendTool::GoogleSearch => Self {
                google_search: Some(GeminiApiEmpty {}),
                ..Self::default()
            },
            BackendTool::CodeExecution => Self {
                code_execution: Some(GeminiApiEmpty {}),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiFunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiApiCandidate>,
    #[serde(default)]
    pub usage_metadata: Option<GeminiApiUsage>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiCandidate {
    #[serde(default)]
    pub content: Option<GeminiApiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub grounding_metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiUsage {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

impl From<GeminiApiUsage> for TokenUsage {
    fn from(value: GeminiApiUsage) -> Self {
        Self {
            prompt_tokens: value.prompt_token_count,
            candidates_tokens: value.candidates_token_count,
            total_tokens: value.total_token_count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiModelList {
    #[serde(default)]
    pub models: Vec<GeminiApiModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiModel {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl From<GeminiApiModel> for ModelDescriptor {
    fn from(value: GeminiApiModel) -> Self {
        Self {
            name: value.name,
            display_name: value.display_name,
            supported_methods: value.supported_generation_methods,
        }
    }
}
