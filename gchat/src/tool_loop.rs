//! Agentic chat: the backend may request tools, whose results are fed back until it
//! answers in plain text or the round bound is reached.
//!
//! Each round executes only the first requested function call. The display view of the
//! result is recorded for the caller; the model view is what goes back to the backend.

use std::sync::Arc;

use gcommon::RequestId;
use gprovider::{
    BackendTool, Content, FunctionCall, FunctionResponse, GenerateRequest, GenerateResponse,
    GenerativeBackend, ModelSelector, NoopOperationHooks, Part, ProviderError,
    ProviderOperationHooks, Role, retry_with_tokio_sleep,
};
use gtooling::{ToolExecutionContext, ToolInvocationRecord, ToolRuntime};
use serde_json::json;
use tokio::time::timeout;

use crate::candidates::CandidateCursor;
use crate::{
    ChatError, ChatPolicy, ChatRequest, Preamble, RoundLimitBehavior, ToolCallingOutcome,
};

/// Everything a tool-calling session carries between rounds.
#[derive(Debug)]
struct LoopState {
    contents: Vec<Content>,
    /// Tool rounds executed so far.
    round: u32,
    candidates: CandidateCursor,
    charts: Vec<serde_json::Value>,
    tool_calls: Vec<ToolInvocationRecord>,
    last_response: Option<GenerateResponse>,
}

impl LoopState {
    fn new(contents: Vec<Content>, candidates: CandidateCursor) -> Self {
        Self {
            contents,
            round: 0,
            candidates,
            charts: Vec::new(),
            tool_calls: Vec::new(),
            last_response: None,
        }
    }

    fn finish(self, text: String, round_limit_reached: bool) -> ToolCallingOutcome {
        ToolCallingOutcome {
            text,
            charts: self.charts,
            tool_calls: self.tool_calls,
            round_limit_reached,
        }
    }
}

enum ToolLoopStep {
    CallTool(FunctionCall),
    Answer(String),
    RoundLimit,
}

#[derive(Clone)]
pub struct ToolCallingSession {
    backend: Arc<dyn GenerativeBackend>,
    selector: Arc<dyn ModelSelector>,
    runtime: Arc<dyn ToolRuntime>,
    preamble: Arc<Preamble>,
    policy: ChatPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl ToolCallingSession {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        selector: Arc<dyn ModelSelector>,
        runtime: Arc<dyn ToolRuntime>,
    ) -> Self {
        Self {
            backend,
            selector,
            runtime,
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

    pub async fn run(&self, request: ChatRequest) -> Result<ToolCallingOutcome, ChatError> {
        request.validate()?;

        let request_id = RequestId::next();
        let context = ToolExecutionContext::new()
            .with_data(request.context_data.clone())
            .with_request_id(request_id.clone());
        let candidates = CandidateCursor::open(self.selector.as_ref()).await;
        let mut state = LoopState::new(self.preamble.contents_for(&request), candidates);

        loop {
            match self.next_step(&mut state).await? {
                ToolLoopStep::Answer(text) => {
                    tracing::debug!(
                        phase = "tool_loop",
                        request_id = %request_id,
                        rounds = state.round,
                        "final answer"
                    );
                    return Ok(state.finish(text, false));
                }
                ToolLoopStep::CallTool(call) => self.call_tool(&mut state, call, &context).await,
                ToolLoopStep::RoundLimit => return self.round_limit(state),
            }
        }
    }

    async fn next_step(&self, state: &mut LoopState) -> Result<ToolLoopStep, ChatError> {
        let response = self.await_response(state).await?;
        let step = match response.function_call() {
            None => ToolLoopStep::Answer(response.text()),
            Some(_) if state.round >= self.policy.tool_round_limit() => ToolLoopStep::RoundLimit,
            Some(call) => ToolLoopStep::CallTool(call.clone()),
        };
        state.last_response = Some(response);
        Ok(step)
    }

    async fn call_tool(&self, state: &mut LoopState, call: FunctionCall, context: &ToolExecutionContext) {
        state.round += 1;
        tracing::debug!(phase = "tool_loop", round = state.round, tool = %call.name, "executing tool");

        let output = self
            .runtime
            .execute(&call.name, call.args.clone(), context)
            .await;

        if output.is_visual() {
            state.charts.push(output.display_view());
        }
        state
            .tool_calls
            .push(ToolInvocationRecord::new(&call.name, call.args.clone(), &output));

        if let Some(response) = state.last_response.as_ref() {
            state
                .contents
                .push(Content::new(Role::Model, response.parts.clone()));
        }
        state.contents.push(Content::new(
            Role::User,
            vec![Part::FunctionResponse(FunctionResponse {
                name: call.name,
                response: json!({ "result": output.model_view() }),
            })],
        ));
    }

    fn round_limit(&self, state: LoopState) -> Result<ToolCallingOutcome, ChatError> {
        tracing::warn!(
            phase = "tool_loop",
            rounds = state.round,
            behavior = ?self.policy.round_limit,
            "tool round limit reached"
        );

        match self.policy.round_limit {
            RoundLimitBehavior::Fail => Err(ChatError::tool_loop_limit(format!(
                "backend still requested a tool after {} rounds",
                state.round
            ))),
            RoundLimitBehavior::ReturnLastText => {
                let text = state
                    .last_response
                    .as_ref()
                    .map(GenerateResponse::text)
                    .unwrap_or_default();
                Ok(state.finish(text, true))
            }
        }
    }

    /// Sends the conversation, moving to the next candidate on a model-unusable signal.
    async fn await_response(&self, state: &mut LoopState) -> Result<GenerateResponse, ChatError> {
        let definitions = self.runtime.definitions();
        let tools = if definitions.is_empty() {
            Vec::new()
        } else {
            vec![BackendTool::FunctionDeclarations(definitions)]
        };

        while let Some(model) = state.candidates.current().map(str::to_string) {
            let request = GenerateRequest::new(&model, state.contents.clone()).with_tools(tools.clone());
            match self.generate(&model, request).await {
                Ok(response) => {
                    state.candidates.accept(self.selector.as_ref());
                    return Ok(response);
                }
                Err(error) if error.is_model_unusable() => {
                    state.candidates.reject(self.selector.as_ref(), &error);
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(ChatError::backend_unavailable())
    }

    async fn generate(
        &self,
        model: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        let call_timeout = self.policy.call_timeout;
        retry_with_tokio_sleep(
            model,
            "generate",
            &self.policy.retry,
            self.hooks.as_ref(),
            |_attempt| {
                let request = request.clone();
                async move {
                    match timeout(call_timeout, self.backend.generate(request)).await {
                        Ok(result) => result,
                        Err(_) => Err(ProviderError::timeout(format!(
                            "no response within {}s",
                            call_timeout.as_secs()
                        ))),
                    }
                }
            },
        )
        .await
    }
}
