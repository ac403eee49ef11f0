//! Runtime wiring: one backend, one shared selector, the tool pack, and both sessions.

use std::sync::Arc;

use gchat::{ChatPolicy, Preamble, StreamingSession, ToolCallingSession};
use gobserve::{SafeProviderHooks, SafeSelectorHooks, SafeToolHooks, TracingObservabilityHooks};
use gprovider::adapters::gemini::GeminiBackend;
use gprovider::{
    BackendDiscovery, DiscoveringModelSelector, GenerativeBackend, ModelPreference, ModelSelector,
    ProviderOperationHooks, SecretString, SelectorHooks, StaticFallbackList,
};
use gtooling::builtins::{ImageGenerator, OpenAiImageGenerator, builtin_registry};
use gtooling::{ToolDispatcher, ToolRegistry, ToolRuntimeHooks};

use crate::{ConfigError, GemlineConfig};

/// Everything a server needs to answer chat requests.
#[derive(Clone)]
pub struct GemlineRuntime {
    pub backend: Arc<dyn GenerativeBackend>,
    pub selector: Arc<DiscoveringModelSelector>,
    pub tools: Arc<ToolDispatcher>,
    pub images: Option<Arc<dyn ImageGenerator>>,
    pub streaming: StreamingSession,
    pub tool_calling: ToolCallingSession,
}

impl GemlineRuntime {
    pub fn builder(backend: Arc<dyn GenerativeBackend>) -> GemlineRuntimeBuilder {
        GemlineRuntimeBuilder::new(backend)
    }

    /// Resolves the preferred model ahead of the first request.
    pub async fn warm_up(&self) -> String {
        let model = self.selector.select_current().await;
        tracing::info!(phase = "startup", model = %model, "model selected");
        model
    }
}

pub struct GemlineRuntimeBuilder {
    backend: Arc<dyn GenerativeBackend>,
    preamble: Preamble,
    policy: ChatPolicy,
    fallback: StaticFallbackList,
    preference: ModelPreference,
    registry: Option<ToolRegistry>,
    images: Option<Arc<dyn ImageGenerator>>,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    selector_hooks: Arc<dyn SelectorHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
}

impl GemlineRuntimeBuilder {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            preamble: Preamble::empty(),
            policy: ChatPolicy::default(),
            fallback: StaticFallbackList::default(),
            preference: ModelPreference::default(),
            registry: None,
            images: None,
            provider_hooks: Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)),
            selector_hooks: Arc::new(SafeSelectorHooks::new(TracingObservabilityHooks)),
            tool_hooks: Arc::new(SafeToolHooks::new(TracingObservabilityHooks)),
        }
    }

    pub fn preamble(mut self, preamble: Preamble) -> Self {
        self.preamble = preamble;
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn fallback(mut self, fallback: StaticFallbackList) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn preference(mut self, preference: ModelPreference) -> Self {
        self.preference = preference;
        self
    }

    /// Replaces the built-in tool pack.
    pub fn registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn images(mut self, images: Arc<dyn ImageGenerator>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn provider_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.provider_hooks = hooks;
        self
    }

    pub fn selector_hooks(mut self, hooks: Arc<dyn SelectorHooks>) -> Self {
        self.selector_hooks = hooks;
        self
    }

    pub fn tool_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = hooks;
        self
    }

    pub fn build(self) -> GemlineRuntime {
        let discovery = Arc::new(BackendDiscovery::new(Arc::clone(&self.backend)));
        let selector = Arc::new(
            DiscoveringModelSelector::new(discovery)
                .with_fallback(self.fallback)
                .with_preference(self.preference)
                .with_hooks(self.selector_hooks),
        );

        let registry = self
            .registry
            .unwrap_or_else(|| builtin_registry(self.images.clone()));
        let tools = Arc::new(ToolDispatcher::new(Arc::new(registry)).with_hooks(self.tool_hooks));

        let shared_selector: Arc<dyn ModelSelector> = selector.clone();
        let streaming = StreamingSession::new(Arc::clone(&self.backend), Arc::clone(&shared_selector))
            .with_preamble(self.preamble.clone())
            .with_policy(self.policy.clone())
            .with_hooks(Arc::clone(&self.provider_hooks));
        let tool_calling =
            ToolCallingSession::new(Arc::clone(&self.backend), shared_selector, tools.clone())
                .with_preamble(self.preamble)
                .with_policy(self.policy)
                .with_hooks(self.provider_hooks);

        GemlineRuntime {
            backend: self.backend,
            selector,
            tools,
            images: self.images,
            streaming,
            tool_calling,
        }
    }
}

/// Builds the Gemini-backed runtime described by `config`.
///
/// A missing Gemini key still yields a runtime; its backend calls fail with an
/// authentication error.
pub fn build_runtime(config: &GemlineConfig) -> Result<GemlineRuntime, ConfigError> {
    let client = config.http_client()?;
    let preamble = config.load_preamble()?;

    if !config.gemini_key_configured() {
        tracing::warn!(phase = "startup", "no Gemini API key configured");
    }
    let api_key = config
        .gemini_api_key
        .clone()
        .unwrap_or_else(|| SecretString::new(""));
    let backend: Arc<dyn GenerativeBackend> =
        Arc::new(GeminiBackend::with_http_client(api_key, client.clone()));

    let mut builder = GemlineRuntime::builder(backend)
        .preamble(preamble)
        .policy(config.policy.clone())
        .fallback(config.fallback.clone());

    if let Some(image_key) = config.image_api_key.clone().filter(|key| !key.is_empty()) {
        builder = builder.images(Arc::new(OpenAiImageGenerator::new(client, image_key)));
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_runtime_registers_builtin_tools_without_keys() {
        let runtime = build_runtime(&GemlineConfig::default()).expect("runtime should build");

        assert!(runtime.images.is_none());
        assert_eq!(runtime.tools.registry().definitions().len(), 7);
        assert_eq!(runtime.backend.name(), "gemini");
    }

    #[test]
    fn image_key_enables_image_generator() {
        let config = GemlineConfig::default()
            .with_gemini_api_key("AIza-test")
            .with_image_api_key("sk-test");

        let runtime = build_runtime(&config).expect("runtime should build");

        assert!(runtime.images.is_some());
    }
}
