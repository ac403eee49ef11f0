//! Unified facade over the gemline workspace crates.
//!
//! Most applications depend on this crate alone: it re-exports the chat sessions, the
//! backend contracts, and the tool pack, and builds a ready-to-serve runtime from
//! environment configuration.
//!
//! ```rust,no_run
//! use gemline::prelude::*;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = build_runtime(&GemlineConfig::from_env())?;
//! let outcome = runtime
//!     .tool_calling
//!     .run(ChatRequest::new("Which video has the most views?"))
//!     .await?;
//! println!("{}", outcome.text);
//! # Ok(())
//! # }
//! ```

mod config;
mod macros;

pub mod prelude;
pub mod runtime;

pub use gchat;
pub use gcommon;
pub use gobserve;
pub use gprovider;
pub use gtooling;

pub use config::{
    ConfigError, ConfigErrorKind, DEFAULT_HTTP_TIMEOUT, FALLBACK_MODELS_ENV, GEMINI_API_KEY_ENV,
    GemlineConfig, OPENAI_API_KEY_ENV, PROMPT_FILE_ENV,
};
pub use gchat::{
    BACKEND_UNAVAILABLE_MESSAGE, ChatError, ChatErrorKind, ChatEventStream, ChatPolicy,
    ChatRequest, ConversationTurn, ImageAttachment, MAX_TOOL_ROUNDS, Preamble,
    RoundLimitBehavior, StreamEvent, StreamingOptions, StreamingSession, StructuredPart,
    ToolCallingOutcome, ToolCallingSession, TurnRole, UserInfo,
};
pub use gcommon::{BoxFuture, RequestId};
pub use gobserve::{
    MetricsObservabilityHooks, SafeProviderHooks, SafeSelectorHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
pub use gprovider::{
    DiscoveringModelSelector, GenerativeBackend, ModelPreference, ModelSelector, ProviderError,
    ProviderErrorKind, RetryPolicy, SecretString, StaticFallbackList,
};
pub use gtooling::{
    Tool, ToolDispatcher, ToolError, ToolErrorKind, ToolExecutionContext, ToolInvocationRecord,
    ToolOutput, ToolRegistry, ToolRuntime, VisualKind,
};

pub use runtime::{GemlineRuntime, GemlineRuntimeBuilder, build_runtime};

#[cfg(test)]
mod tests {
    use crate::TurnRole;

    #[test]
    fn gm_turn_macro_creates_expected_turn() {
        let turn = crate::gm_turn!(user => "hello");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.text, "hello");
    }

    #[test]
    fn gm_history_macro_builds_turn_vector() {
        let history = crate::gm_history![
            user => "hi",
            model => "Hello!",
            user => "plot my views",
        ];

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, TurnRole::User);
        assert_eq!(history[1].role, TurnRole::Model);
        assert!(crate::gm_history![].is_empty());
    }
}
