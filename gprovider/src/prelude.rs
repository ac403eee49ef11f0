//! Common `gprovider` imports for downstream crates.

pub use crate::{
    BackendStreamEvent, BackendTool, BoxedBackendStream, Content, DiscoveringModelSelector,
    FunctionCall, FunctionDeclaration, GenerateRequest, GenerateResponse, GenerativeBackend,
    ModelRoster, ModelSelector, NoopOperationHooks, Part, ProviderError, ProviderErrorKind,
    ProviderOperationHooks, RetryPolicy, Role, StaticFallbackList, execute_with_retry,
};
pub use gcommon::{BoxFuture, GenerationOptions, MetadataMap};
