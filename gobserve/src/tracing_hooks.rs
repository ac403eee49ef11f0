//! Structured `tracing` events for every backend attempt, selector decision, and tool run.
//!
//! ```rust
//! use gobserve::TracingObservabilityHooks;
//! use gprovider::SelectorHooks;
//!
//! fn accepts_selector_hooks(_hooks: &dyn SelectorHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_selector_hooks(&hooks);
//! ```

use std::time::Duration;

use gprovider::{ProviderError, ProviderOperationHooks, SelectionSource, SelectorHooks};
use gtooling::{ToolError, ToolExecutionContext, ToolOutput, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, model: &str, operation: &str, attempt: u32) {
        tracing::debug!(
            phase = "backend",
            event = "attempt_start",
            model,
            operation,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        model: &str,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "backend",
            event = "retry_scheduled",
            model,
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_success(&self, model: &str, operation: &str, attempts: u32) {
        tracing::info!(
            phase = "backend",
            event = "success",
            model,
            operation,
            attempts
        );
    }

    fn on_failure(&self, model: &str, operation: &str, attempts: u32, error: &ProviderError) {
        tracing::error!(
            phase = "backend",
            event = "failure",
            model,
            operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl SelectorHooks for TracingObservabilityHooks {
    fn on_candidate_selected(&self, candidate: &str, source: SelectionSource) {
        tracing::info!(
            phase = "selector",
            event = "candidate_selected",
            candidate,
            source = %source
        );
    }

    fn on_discovery_fallback(&self, reason: &str, fallback: &str) {
        tracing::warn!(
            phase = "selector",
            event = "discovery_fallback",
            reason,
            fallback
        );
    }

    fn on_invalidated(&self, candidate: &str) {
        tracing::warn!(phase = "selector", event = "invalidated", candidate);
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_name: &str, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name,
            request_id = context.request_id.as_ref().map(|id| id.as_str()),
            records = context.records().len()
        );
    }

    fn on_execution_success(
        &self,
        tool_name: &str,
        context: &ToolExecutionContext,
        output: &ToolOutput,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name,
            request_id = context.request_id.as_ref().map(|id| id.as_str()),
            visual = output.visual_kind().map(|kind| kind.as_str()),
            reported_error = output.is_error(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_name: &str,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name,
            request_id = context.request_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}
