//! Common imports for most gemline applications.

pub use crate::{GemlineConfig, GemlineRuntime, GemlineRuntimeBuilder, build_runtime};
pub use crate::{gm_history, gm_turn};
pub use crate::{
    ChatError, ChatErrorKind, ChatEventStream, ChatPolicy, ChatRequest, ConversationTurn,
    GenerativeBackend, ImageAttachment, ModelSelector, Preamble, ProviderError,
    RoundLimitBehavior, StreamEvent, StreamingOptions, StreamingSession, ToolCallingOutcome,
    ToolCallingSession, ToolDispatcher, ToolOutput, ToolRegistry, UserInfo, VisualKind,
};
