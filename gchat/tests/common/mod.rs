#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use gprovider::{
    BackendStreamEvent, BoxedBackendStream, GenerateRequest, GenerateResponse, GenerativeBackend,
    ModelDescriptor, Part, ProviderError, ProviderFuture, VecBackendStream,
};

/// Backend that replays scripted answers and rejects a configurable set of models.
#[derive(Default)]
pub struct ScriptedBackend {
    unusable: HashSet<String>,
    generate_script: Mutex<VecDeque<Result<GenerateResponse, ProviderError>>>,
    stream_script: Mutex<VecDeque<Vec<Result<BackendStreamEvent, ProviderError>>>>,
    stream_open_errors: Mutex<VecDeque<ProviderError>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unusable(mut self, model: &str) -> Self {
        self.unusable.insert(model.to_string());
        self
    }

    pub fn with_response(self, response: Result<GenerateResponse, ProviderError>) -> Self {
        self.generate_script
            .lock()
            .expect("script lock")
            .push_back(response);
        self
    }

    pub fn with_stream(self, events: Vec<Result<BackendStreamEvent, ProviderError>>) -> Self {
        self.stream_script
            .lock()
            .expect("script lock")
            .push_back(events);
        self
    }

    /// Fails the next stream opening with `error` before any scripted stream is used.
    pub fn with_stream_open_error(self, error: ProviderError) -> Self {
        self.stream_open_errors
            .lock()
            .expect("script lock")
            .push_back(error);
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn requested_models(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.model)
            .collect()
    }

    fn record(&self, request: &GenerateRequest) -> Result<(), ProviderError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        if self.unusable.contains(&request.model) {
            return Err(ProviderError::classify(
                Some(404),
                format!("models/{} is not found for API version v1beta", request.model),
            ));
        }
        Ok(())
    }
}

impl GenerativeBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>> {
        Box::pin(async move { Ok(Vec::new()) })
    }

    fn generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>> {
        Box::pin(async move {
            self.record(&request)?;
            self.generate_script
                .lock()
                .expect("script lock")
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::other("script exhausted")))
        })
    }

    fn stream_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> ProviderFuture<'a, Result<BoxedBackendStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.record(&request)?;
            if let Some(error) = self
                .stream_open_errors
                .lock()
                .expect("script lock")
                .pop_front()
            {
                return Err(error);
            }
            let events = self
                .stream_script
                .lock()
                .expect("script lock")
                .pop_front()
                .unwrap_or_default();
            Ok(Box::pin(VecBackendStream::new(events)) as BoxedBackendStream<'a>)
        })
    }
}

pub fn text_response(text: &str) -> GenerateResponse {
    GenerateResponse::new("scripted", vec![Part::text(text)])
}

pub fn call_response(name: &str, args: serde_json::Value) -> GenerateResponse {
    GenerateResponse::new(
        "scripted",
        vec![Part::FunctionCall(gprovider::FunctionCall {
            name: name.to_string(),
            args,
        })],
    )
}

pub fn throttled() -> ProviderError {
    ProviderError::classify(Some(429), "Resource exhausted")
}

pub fn chunk(text: &str) -> Result<BackendStreamEvent, ProviderError> {
    Ok(BackendStreamEvent::Chunk(vec![Part::text(text)]))
}

pub fn complete(response: GenerateResponse) -> Result<BackendStreamEvent, ProviderError> {
    Ok(BackendStreamEvent::Complete(response))
}
