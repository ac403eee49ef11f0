//! Request handlers for the chat, image, and health endpoints.

use std::convert::Infallible;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures_util::{StreamExt, stream};
use gemline::{ChatError, ChatRequest, StreamEvent, StreamingOptions, ToolCallingOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{ApiError, AppState};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

#[derive(Debug, Deserialize)]
pub struct StreamChatBody {
    #[serde(flatten)]
    pub request: ChatRequest,
    #[serde(rename = "useCodeExecution", default)]
    pub use_code_execution: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateImageBody {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub anchor_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedImageBody {
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
    pub revised_prompt: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "geminiKeyConfigured": state.gemini_key_configured,
        "imageKeyConfigured": state.image_key_configured,
    }))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ToolCallingOutcome>, ApiError> {
    let outcome = state.runtime.tool_calling.run(request).await?;
    Ok(Json(outcome))
}

/// Streams events as NDJSON. A failure before any output becomes an HTTP error;
/// a failure afterwards becomes one final `{"type":"error"}` line.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(body): Json<StreamChatBody>,
) -> Result<Response, ApiError> {
    let options = StreamingOptions::default().with_code_execution(body.use_code_execution);
    let mut events = state
        .runtime
        .streaming
        .start_with_options(body.request, options)?;

    let first = match events.next().await {
        Some(Err(error)) => return Err(error.into()),
        Some(Ok(event)) => Some(Ok(event)),
        None => None,
    };

    let lines = stream::iter(first)
        .chain(events)
        .map(|item| Ok::<_, Infallible>(ndjson_line(item)));

    Ok(([(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)], Body::from_stream(lines)).into_response())
}

pub async fn generate_image(
    State(state): State<AppState>,
    Json(body): Json<GenerateImageBody>,
) -> Result<Json<GeneratedImageBody>, ApiError> {
    let Some(generator) = state.runtime.images.as_ref() else {
        return Err(ApiError::unavailable("OPENAI_API_KEY not configured"));
    };
    if body.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("prompt required"));
    }

    let prompt = match body.anchor_description.as_deref().map(str::trim) {
        Some(anchor) if !anchor.is_empty() => {
            format!("{}\n\nStyle reference: {anchor}", body.prompt)
        }
        _ => body.prompt,
    };
    let image = generator.generate(&prompt).await?;

    Ok(Json(GeneratedImageBody {
        image_base64: image.b64_json,
        mime_type: "image/png",
        revised_prompt: image.revised_prompt,
    }))
}

fn ndjson_line(item: Result<StreamEvent, ChatError>) -> String {
    let value = match item {
        Ok(event) => serde_json::to_value(&event)
            .unwrap_or_else(|err| json!({"type": "error", "message": err.to_string()})),
        Err(error) => {
            tracing::warn!(phase = "http", error = %error, "stream ended with an error");
            json!({"type": "error", "message": error.user_message()})
        }
    };
    format!("{value}\n")
}
