use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use gprovider::{ProviderError, ProviderOperationHooks, SelectionSource, SelectorHooks};
use gtooling::{ToolError, ToolExecutionContext, ToolOutput, ToolRuntimeHooks};

/// Swallows panics raised by wrapped backend hooks so a faulty observer cannot
/// abort a chat turn.
pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_attempt_start(&self, model: &str, operation: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(model, operation, attempt)
        }));
    }

    fn on_retry_scheduled(
        &self,
        model: &str,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_retry_scheduled(model, operation, attempt, delay, error)
        }));
    }

    fn on_success(&self, model: &str, operation: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(model, operation, attempts)
        }));
    }

    fn on_failure(&self, model: &str, operation: &str, attempts: u32, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(model, operation, attempts, error)
        }));
    }
}

pub struct SafeSelectorHooks<H> {
    inner: H,
}

impl<H> SafeSelectorHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> SelectorHooks for SafeSelectorHooks<H>
where
    H: SelectorHooks,
{
    fn on_candidate_selected(&self, candidate: &str, source: SelectionSource) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_candidate_selected(candidate, source)
        }));
    }

    fn on_discovery_fallback(&self, reason: &str, fallback: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_discovery_fallback(reason, fallback)
        }));
    }

    fn on_invalidated(&self, candidate: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_invalidated(candidate)));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, tool_name: &str, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_name, context)
        }));
    }

    fn on_execution_success(
        &self,
        tool_name: &str,
        context: &ToolExecutionContext,
        output: &ToolOutput,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(tool_name, context, output, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_name: &str,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_name, context, error, elapsed)
        }));
    }
}
