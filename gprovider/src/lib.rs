//! Backend contracts, model selection, and retry for generative chat.
//!
//! ```rust
//! use std::sync::Arc;
//! use gprovider::{FixedModelSelector, ModelSelector, RetryPolicy};
//!
//! let selector: Arc<dyn ModelSelector> = Arc::new(FixedModelSelector::new(["gemini-2.0-flash", "gemini-pro"]));
//! assert_eq!(selector.fallback_list().len(), 2);
//! assert_eq!(RetryPolicy::default().max_attempts(), 4);
//! ```

pub mod adapters;
pub mod credentials;
pub mod error;
pub mod model;
pub mod prelude;
pub mod provider;
pub mod resilience;
pub mod selector;
pub mod stream;

pub use credentials::SecretString;
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    BackendTool, CodeExecutionResult, Content, ExecutableCode, FinishReason, FunctionCall,
    FunctionDeclaration, FunctionResponse, GenerateRequest, GenerateRequestBuilder,
    GenerateResponse, InlineData, ModelDescriptor, Part, Role, TokenUsage,
};
pub use provider::{GenerativeBackend, ProviderFuture};
pub use resilience::{
    NoopOperationHooks, ProviderOperationHooks, RetryPolicy, execute_with_retry,
    retry_with_tokio_sleep,
};
pub use selector::{
    BackendDiscovery, DEFAULT_FALLBACK_MODELS, DiscoveringModelSelector, FixedModelSelector,
    ModelDiscovery, ModelPreference, ModelRoster, ModelSelector, NoopSelectorHooks,
    SelectionSource, SelectorHooks, StaticFallbackList,
};
pub use stream::{
    BackendEventStream, BackendStreamEvent, BoxedBackendStream, PartAccumulator, VecBackendStream,
};
