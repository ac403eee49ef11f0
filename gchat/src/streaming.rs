//! Incremental chat: text fragments as they arrive, then any structured artifacts, then
//! grounding citations.
//!
//! A spawned producer drives the backend and pushes events through a bounded channel.
//! Dropping the returned stream closes the channel; the producer stops at once, even
//! mid-backoff, and makes no further backend calls.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use gprovider::{
    BackendStreamEvent, BackendTool, BoxedBackendStream, Content, GenerateRequest,
    GenerateResponse, GenerativeBackend, ModelSelector, NoopOperationHooks, ProviderError,
    ProviderOperationHooks, retry_with_tokio_sleep,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::candidates::CandidateCursor;
use crate::{
    ChatError, ChatEventStream, ChatPolicy, ChatRequest, Preamble, StreamEvent, StructuredPart,
};

pub const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamingOptions {
    /// Code-execution tool instead of web-search grounding.
    pub use_code_execution: bool,
}

impl StreamingOptions {
    pub fn with_code_execution(mut self, use_code_execution: bool) -> Self {
        self.use_code_execution = use_code_execution;
        self
    }

    fn backend_tool(&self) -> BackendTool {
        if self.use_code_execution {
            BackendTool::CodeExecution
        } else {
            BackendTool::GoogleSearch
        }
    }
}

type EventSender = mpsc::Sender<Result<StreamEvent, ChatError>>;

/// How one candidate attempt ended.
enum Attempt {
    Delivered,
    ModelUnusable(ProviderError),
    ConsumerGone,
}

#[derive(Clone)]
pub struct StreamingSession {
    backend: Arc<dyn GenerativeBackend>,
    selector: Arc<dyn ModelSelector>,
    preamble: Arc<Preamble>,
    policy: ChatPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl StreamingSession {
    pub fn new(backend: Arc<dyn GenerativeBackend>, selector: Arc<dyn ModelSelector>) -> Self {
        Self {
            backend,
            selector,
            preamble: Arc::new(Preamble::empty()),
            policy: ChatPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_preamble(mut self, preamble: Preamble) -> Self {
        self.preamble = Arc::new(preamble);
        self
    }

    pub fn with_policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn start(&self, request: ChatRequest) -> Result<ChatEventStream, ChatError> {
        self.start_with_options(request, StreamingOptions::default())
    }

    /// Validates synchronously, then streams from a spawned producer task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_with_options(
        &self,
        request: ChatRequest,
        options: StreamingOptions,
    ) -> Result<ChatEventStream, ChatError> {
        request.validate()?;

        let contents = self.preamble.contents_for(&request);
        let (sender, mut receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let session = self.clone();
        tokio::spawn(async move {
            session.produce(contents, options.backend_tool(), sender).await;
        });

        Ok(Box::pin(async_stream::stream! {
            while let Some(item) = receiver.recv().await {
                yield item;
            }
        }))
    }

    /// Runs until the backend answer is forwarded or the consumer goes away, whichever
    /// comes first. Backoff sleeps and pending backend calls are abandoned on disconnect.
    async fn produce(self, contents: Vec<Content>, tool: BackendTool, sender: EventSender) {
        let outcome = tokio::select! {
            _ = sender.closed() => {
                tracing::debug!(phase = "streaming", "consumer dropped stream");
                return;
            }
            outcome = self.drive(contents, tool, &sender) => outcome,
        };

        if let Err(error) = outcome {
            tracing::warn!(phase = "streaming", kind = ?error.kind, error = %error, "stream failed");
            let _ = sender.send(Err(error)).await;
        }
    }

    async fn drive(
        &self,
        contents: Vec<Content>,
        tool: BackendTool,
        sender: &EventSender,
    ) -> Result<(), ChatError> {
        let mut candidates = CandidateCursor::open(self.selector.as_ref()).await;

        while let Some(model) = candidates.current().map(str::to_string) {
            let request = GenerateRequest::new(&model, contents.clone()).with_tools(vec![tool.clone()]);
            let stream = match self.open_stream(&model, request).await {
                Ok(stream) => stream,
                Err(error) if error.is_model_unusable() => {
                    candidates.reject(self.selector.as_ref(), &error);
                    continue;
                }
                Err(error) => return Err(error.into()),
            };

            match self.forward(stream, sender).await? {
                Attempt::Delivered => {
                    candidates.accept(self.selector.as_ref());
                    return Ok(());
                }
                Attempt::ConsumerGone => {
                    tracing::debug!(phase = "streaming", model = %model, "consumer dropped stream");
                    return Ok(());
                }
                Attempt::ModelUnusable(error) => {
                    candidates.reject(self.selector.as_ref(), &error);
                }
            }
        }

        Err(ChatError::backend_unavailable())
    }

    async fn open_stream<'a>(
        &'a self,
        model: &str,
        request: GenerateRequest,
    ) -> Result<BoxedBackendStream<'a>, ProviderError> {
        let call_timeout = self.policy.call_timeout;
        retry_with_tokio_sleep(
            model,
            "stream_generate",
            &self.policy.retry,
            self.hooks.as_ref(),
            |_attempt| {
                let request = request.clone();
                async move {
                    match timeout(call_timeout, self.backend.stream_generate(request)).await {
                        Ok(result) => result,
                        Err(_) => Err(opening_timed_out(call_timeout)),
                    }
                }
            },
        )
        .await
    }

    async fn forward(
        &self,
        mut stream: BoxedBackendStream<'_>,
        sender: &EventSender,
    ) -> Result<Attempt, ChatError> {
        let mut emitted = false;
        let mut completed: Option<GenerateResponse> = None;

        loop {
            let next = timeout(self.policy.call_timeout, stream.next())
                .await
                .map_err(|_| {
                    ChatError::timeout(format!(
                        "no stream chunk within {}s",
                        self.policy.call_timeout.as_secs()
                    ))
                })?;

            match next {
                None => break,
                Some(Ok(event @ BackendStreamEvent::Chunk(_))) => {
                    let Some(text) = event.chunk_text() else {
                        continue;
                    };
                    emitted = true;
                    if sender.send(Ok(StreamEvent::text(text))).await.is_err() {
                        return Ok(Attempt::ConsumerGone);
                    }
                }
                Some(Ok(BackendStreamEvent::Complete(response))) => {
                    completed = Some(response);
                    break;
                }
                Some(Err(error)) if !emitted && error.is_model_unusable() => {
                    return Ok(Attempt::ModelUnusable(error));
                }
                Some(Err(error)) => return Err(error.into()),
            }
        }

        if let Some(response) = completed {
            for event in closing_events(response) {
                if sender.send(Ok(event)).await.is_err() {
                    return Ok(Attempt::ConsumerGone);
                }
            }
        }

        Ok(Attempt::Delivered)
    }
}

fn opening_timed_out(call_timeout: Duration) -> ProviderError {
    ProviderError::timeout(format!(
        "stream did not open within {}s",
        call_timeout.as_secs()
    ))
}

/// At most one structured response, then at most one grounding event.
fn closing_events(response: GenerateResponse) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if response.parts.iter().any(StructuredPart::is_structured_artifact) {
        let parts = response
            .parts
            .iter()
            .filter_map(StructuredPart::from_part)
            .collect();
        events.push(StreamEvent::FullResponse { parts });
    }

    if let Some(data) = response.grounding {
        events.push(StreamEvent::Grounding { data });
    }

    events
}
