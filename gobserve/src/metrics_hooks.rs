//! `metrics` counters and histograms keyed by model, operation, and tool name.
//!
//! ```rust
//! use gobserve::MetricsObservabilityHooks;
//! use gprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use gprovider::{ProviderError, ProviderOperationHooks, SelectionSource, SelectorHooks};
use gtooling::{ToolError, ToolExecutionContext, ToolOutput, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, model: &str, operation: &str, _attempt: u32) {
        metrics::counter!(
            "gemline_backend_attempt_start_total",
            "model" => model.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        model: &str,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "gemline_backend_retry_scheduled_total",
            "model" => model.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "gemline_backend_retry_delay_seconds",
            "model" => model.to_string(),
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, model: &str, operation: &str, attempts: u32) {
        metrics::counter!(
            "gemline_backend_success_total",
            "model" => model.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "gemline_backend_attempts_per_success",
            "model" => model.to_string(),
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(&self, model: &str, operation: &str, attempts: u32, error: &ProviderError) {
        metrics::counter!(
            "gemline_backend_failure_total",
            "model" => model.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "gemline_backend_attempts_per_failure",
            "model" => model.to_string(),
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }
}

impl SelectorHooks for MetricsObservabilityHooks {
    fn on_candidate_selected(&self, candidate: &str, source: SelectionSource) {
        metrics::counter!(
            "gemline_selector_selected_total",
            "model" => candidate.to_string(),
            "source" => source.to_string()
        )
        .increment(1);
    }

    fn on_discovery_fallback(&self, _reason: &str, fallback: &str) {
        metrics::counter!(
            "gemline_selector_discovery_fallback_total",
            "model" => fallback.to_string()
        )
        .increment(1);
    }

    fn on_invalidated(&self, candidate: &str) {
        metrics::counter!(
            "gemline_selector_invalidated_total",
            "model" => candidate.to_string()
        )
        .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_name: &str, _context: &ToolExecutionContext) {
        metrics::counter!(
            "gemline_tool_execution_start_total",
            "tool_name" => tool_name.to_string()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_name: &str,
        _context: &ToolExecutionContext,
        output: &ToolOutput,
        elapsed: Duration,
    ) {
        let status = if output.is_error() { "reported_error" } else { "success" };
        metrics::counter!(
            "gemline_tool_execution_success_total",
            "tool_name" => tool_name.to_string(),
            "status" => status
        )
        .increment(1);
        metrics::histogram!(
            "gemline_tool_execution_duration_seconds",
            "tool_name" => tool_name.to_string(),
            "status" => status
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_name: &str,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "gemline_tool_execution_failure_total",
            "tool_name" => tool_name.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "gemline_tool_execution_duration_seconds",
            "tool_name" => tool_name.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
