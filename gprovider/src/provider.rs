use std::future::Future;
use std::pin::Pin;

use crate::{BoxedBackendStream, GenerateRequest, GenerateResponse, ModelDescriptor, ProviderError};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Upstream generative backend able to list models and answer chat requests.
pub trait GenerativeBackend: Send + Sync {
    fn name(&self) -> &str;

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>>;

    fn generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>>;

    fn stream_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> ProviderFuture<'a, Result<BoxedBackendStream<'a>, ProviderError>>;
}
