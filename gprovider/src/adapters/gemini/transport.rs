//! Gemini transport trait and reqwest-based HTTP implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response};

use crate::{GenerateRequest, GenerateResponse, ModelDescriptor, ProviderError, ProviderFuture};

use super::serde_api::{
    GeminiApiModelList, GeminiApiResponse, build_api_request, extract_error_message,
    sse_data_payload,
};

/// Partial responses, one per server-sent event.
pub type GeminiChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<GenerateResponse, ProviderError>> + Send + 'a>>;

pub trait GeminiTransport: Send + Sync + std::fmt::Debug {
    fn list_models<'a>(
        &'a self,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>>;

    fn generate<'a>(
        &'a self,
        request: GenerateRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>>;

    fn stream_generate<'a>(
        &'a self,
        request: GenerateRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<GeminiChunkStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct GeminiHttpTransport {
    client: Client,
    base_url: String,
}

impl GeminiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn model_endpoint(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        self.endpoint(&format!("models/{model}:{method}"))
    }

    fn map_send_error(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::timeout(err.to_string())
        } else {
            ProviderError::transport(err.to_string())
        }
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Gemini request failed with status {status}"));

        ProviderError::classify(Some(status.as_u16()), message)
    }
}

impl GeminiTransport for GeminiHttpTransport {
    fn list_models<'a>(
        &'a self,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.endpoint("models"))
                .query(&[("pageSize", "1000")])
                .header("x-goog-api-key", api_key)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let parsed: GeminiApiModelList = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            Ok(parsed.models.into_iter().map(ModelDescriptor::from).collect())
        })
    }

    fn generate<'a>(
        &'a self,
        request: GenerateRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>> {
        Box::pin(async move {
            let api_request = build_api_request(&request);
            let response = self
                .client
                .post(self.model_endpoint(&request.model, "generateContent"))
                .header("x-goog-api-key", api_key)
                .json(&api_request)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let parsed: GeminiApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            Ok(parsed.into_generate_response(&request.model))
        })
    }

    fn stream_generate<'a>(
        &'a self,
        request: GenerateRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<GeminiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            let api_request = build_api_request(&request);
            let response = self
                .client
                .post(self.model_endpoint(&request.model, "streamGenerateContent"))
                .query(&[("alt", "sse")])
                .header("x-goog-api-key", api_key)
                .json(&api_request)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let model = request.model;
            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut buffer: Vec<u8> = Vec::new();

                while let Some(item) = chunks.next().await {
                    let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    buffer.extend_from_slice(&bytes);

                    while let Some(newline_index) = buffer.iter().position(|byte| *byte == b'\n') {
                        let line = buffer.drain(..=newline_index).collect::<Vec<u8>>();
                        let line = String::from_utf8(line)
                            .map_err(|err| ProviderError::transport(err.to_string()))?;

                        if let Some(payload) = sse_data_payload(line.trim()) {
                            let parsed: GeminiApiResponse = serde_json::from_str(payload)
                                .map_err(|err| ProviderError::transport(err.to_string()))?;
                            yield parsed.into_generate_response(&model);
                        }
                    }
                }

                let trailing = String::from_utf8(buffer)
                    .map_err(|err| ProviderError::transport(err.to_string()))?;
                if let Some(payload) = sse_data_payload(trailing.trim()) {
                    let parsed: GeminiApiResponse = serde_json::from_str(payload)
                        .map_err(|err| ProviderError::transport(err.to_string()))?;
                    yield parsed.into_generate_response(&model);
                }
            };

            Ok(Box::pin(stream) as GeminiChunkStream<'a>)
        })
    }
}
