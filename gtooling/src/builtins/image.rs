//! Image generation tool and its OpenAI Images API client.

use std::sync::Arc;

use gprovider::{FunctionDeclaration, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    IMAGE_PAYLOAD_FIELD, Tool, ToolError, ToolExecutionContext, ToolFuture, ToolOutput,
    VisualKind, object_args, optional_string, required_string,
};

use super::{GENERATE_IMAGE, declaration};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "dall-e-3";
const DEFAULT_SIZE: &str = "1024x1024";
const PNG_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Base64-encoded image bytes.
    pub b64_json: String,
    pub revised_prompt: Option<String>,
}

pub trait ImageGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> ToolFuture<'a, Result<GeneratedImage, ToolError>>;
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageErrorEnvelope {
    error: ImageErrorBody,
}

#[derive(Debug, Deserialize)]
struct ImageErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiImageGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    size: String,
}

impl OpenAiImageGenerator {
    pub fn new(client: reqwest::Client, api_key: SecretString) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            size: DEFAULT_SIZE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/images/generations", self.base_url.trim_end_matches('/'))
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ImageRequest<'a> {
        ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
            response_format: "b64_json",
        }
    }
}

impl std::fmt::Debug for OpenAiImageGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiImageGenerator")
            .field("api_key", &self.api_key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

fn generation_failed(message: impl std::fmt::Display) -> ToolError {
    ToolError::execution(format!("Image generation failed: {message}"))
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ImageErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}

impl ImageGenerator for OpenAiImageGenerator {
    fn generate<'a>(&'a self, prompt: &'a str) -> ToolFuture<'a, Result<GeneratedImage, ToolError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(self.api_key.expose())
                .json(&self.request_body(prompt))
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ToolError::timeout(format!("Image generation failed: {err}"))
                    } else {
                        generation_failed(err)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = error_message(&body).unwrap_or_else(|| status.to_string());
                return Err(generation_failed(message));
            }

            let parsed: ImageResponse = response.json().await.map_err(generation_failed)?;
            let datum = parsed
                .data
                .into_iter()
                .next()
                .ok_or_else(|| generation_failed("response carried no image"))?;
            let b64_json = datum
                .b64_json
                .filter(|data| !data.is_empty())
                .ok_or_else(|| generation_failed("response carried no image"))?;

            Ok(GeneratedImage {
                b64_json,
                revised_prompt: datum.revised_prompt,
            })
        })
    }
}

/// `generateImage` tool; without a generator every call reports a missing key.
#[derive(Clone, Default)]
pub struct GenerateImageTool {
    generator: Option<Arc<dyn ImageGenerator>>,
}

impl GenerateImageTool {
    pub fn new(generator: Option<Arc<dyn ImageGenerator>>) -> Self {
        Self { generator }
    }
}

impl Tool for GenerateImageTool {
    fn definition(&self) -> FunctionDeclaration {
        declaration(
            GENERATE_IMAGE,
            "Generate an image from a text prompt. Use when the user asks to create, draw, design, or generate an image, thumbnail, or illustration. Optionally pass a description of a reference image the user attached.",
            json!({
                "prompt": {
                    "type": "STRING",
                    "description": "Detailed description of the image to generate."
                },
                "anchor_description": {
                    "type": "STRING",
                    "description": "Optional description of an attached reference image to guide style or composition."
                }
            }),
            &["prompt"],
        )
    }

    fn invoke<'a>(
        &'a self,
        args: &'a Value,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let args = object_args(args)?;
            let prompt = required_string(&args, "prompt")?;
            let Some(generator) = self.generator.as_ref() else {
                return Err(ToolError::unauthorized(
                    "OPENAI_API_KEY not configured, cannot generate images.",
                ));
            };

            let full_prompt = match optional_string(&args, "anchor_description") {
                Some(anchor) => format!("{prompt}\n\nStyle/composition reference: {anchor}"),
                None => prompt.clone(),
            };

            let image = generator.generate(&full_prompt).await?;
            let revised_prompt = image.revised_prompt.unwrap_or_else(|| prompt.clone());

            Ok(ToolOutput::visual(VisualKind::Image)
                .with_field(IMAGE_PAYLOAD_FIELD, json!(image.b64_json))
                .with_field("mimeType", json!(PNG_MIME_TYPE))
                .with_field("prompt", json!(prompt))
                .with_field("revised_prompt", json!(revised_prompt)))
        })
    }
}
