//! Gemini backend implementation over transport and shared models.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    BackendStreamEvent, BoxedBackendStream, FinishReason, GenerateRequest, GenerateResponse,
    GenerativeBackend, ModelDescriptor, PartAccumulator, ProviderError, ProviderFuture,
    SecretString, TokenUsage,
};

use super::transport::{GeminiHttpTransport, GeminiTransport};

#[derive(Clone)]
pub struct GeminiBackend {
    api_key: SecretString,
    transport: Arc<dyn GeminiTransport>,
}

impl GeminiBackend {
    pub fn new(api_key: SecretString, transport: Arc<dyn GeminiTransport>) -> Self {
        Self { api_key, transport }
    }

    pub fn with_http_client(api_key: SecretString, client: reqwest::Client) -> Self {
        Self::new(api_key, Arc::new(GeminiHttpTransport::new(client)))
    }

    fn resolve_api_key(&self) -> Result<&str, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::authentication("no Gemini API key configured"));
        }
        Ok(self.api_key.expose())
    }
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("api_key", &self.api_key)
            .field("transport", &self.transport)
            .finish()
    }
}

impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>> {
        Box::pin(async move {
            let api_key = self.resolve_api_key()?;
            self.transport.list_models(api_key).await
        })
    }

    fn generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let api_key = self.resolve_api_key()?;
            self.transport.generate(request, api_key).await
        })
    }

    fn stream_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> ProviderFuture<'a, Result<BoxedBackendStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let api_key = self.resolve_api_key()?;
            let model = request.model.clone();
            let mut chunks = self.transport.stream_generate(request, api_key).await?;

            let stream = try_stream! {
                let mut accumulator = PartAccumulator::new();
                let mut grounding = None;
                let mut finish_reason = FinishReason::Other;
                let mut usage = TokenUsage::default();
                let mut model = model;

                while let Some(chunk) = chunks.next().await {
                    let chunk = chunk?;
                    model = chunk.model;
                    if chunk.grounding.is_some() {
                        grounding = chunk.grounding;
                    }
                    if chunk.finish_reason != FinishReason::Other {
                        finish_reason = chunk.finish_reason;
                    }
                    if chunk.usage != TokenUsage::default() {
                        usage = chunk.usage;
                    }

                    accumulator.extend(chunk.parts.iter().cloned());
                    yield BackendStreamEvent::Chunk(chunk.parts);
                }

                yield BackendStreamEvent::Complete(GenerateResponse {
                    model,
                    parts: accumulator.into_parts(),
                    grounding,
                    finish_reason,
                    usage,
                });
            };

            Ok(Box::pin(stream) as BoxedBackendStream<'a>)
        })
    }
}
