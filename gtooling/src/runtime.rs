//! Tool runtime trait and the default registry-backed dispatcher.
//!
//! Dispatch never fails: unknown names and tool errors become error-shaped outputs the
//! backend can read and react to.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{Either, select};
use gprovider::FunctionDeclaration;
use serde_json::Value;

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolFuture, ToolLookup, ToolOutput,
    ToolRegistry, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    fn definitions(&self) -> Vec<FunctionDeclaration>;

    fn execute<'a>(
        &'a self,
        tool_name: &'a str,
        args: Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolOutput>;
}

#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Upper bound for a single tool invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    async fn invoke_registered(
        &self,
        tool_name: &str,
        args: &Value,
        context: &ToolExecutionContext,
    ) -> Result<ToolOutput, ToolError> {
        let tool = match self.registry.lookup(tool_name) {
            ToolLookup::Registered(tool) => tool,
            ToolLookup::Unknown(name) => {
                return Err(ToolError::not_found(format!("Unknown tool: {name}")));
            }
        };

        let invocation = tool.invoke(args, context);
        let Some(timeout) = self.timeout else {
            return invocation.await;
        };

        match select(invocation, Delay::new(timeout)).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(ToolError::timeout(format!(
                "tool '{tool_name}' timed out after {}ms",
                timeout.as_millis()
            ))),
        }
    }
}

impl ToolRuntime for ToolDispatcher {
    fn definitions(&self) -> Vec<FunctionDeclaration> {
        self.registry.definitions()
    }

    fn execute<'a>(
        &'a self,
        tool_name: &'a str,
        args: Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, ToolOutput> {
        Box::pin(async move {
            self.hooks.on_execution_start(tool_name, context);
            let started = Instant::now();

            match self.invoke_registered(tool_name, &args, context).await {
                Ok(output) => {
                    self.hooks
                        .on_execution_success(tool_name, context, &output, started.elapsed());
                    output
                }
                Err(error) => {
                    let error = error.with_tool_name(tool_name);
                    self.hooks
                        .on_execution_failure(tool_name, context, &error, started.elapsed());
                    ToolOutput::error(error.model_message())
                }
            }
        })
    }
}
