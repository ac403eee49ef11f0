//! Conversational orchestration over a generative backend.
//!
//! Two session types share the same request shape, preamble, model fallback, and retry
//! policy: [`StreamingSession`] forwards fragments as they arrive, and
//! [`ToolCallingSession`] runs a bounded function-calling loop.
//!
//! ```rust
//! use gchat::{ChatRequest, ConversationTurn};
//!
//! let request = ChatRequest::new("How many views did my last video get?")
//!     .with_turn(ConversationTurn::user("hi"))
//!     .with_turn(ConversationTurn::model("Hello! How can I help?"));
//! assert!(request.validate().is_ok());
//! ```

mod candidates;
mod error;
mod policy;
mod preamble;
mod streaming;
mod tool_loop;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatEventStream, ChatPolicy, ChatRequest, ConversationTurn,
        ImageAttachment, Preamble, RoundLimitBehavior, StreamEvent, StreamingOptions,
        StreamingSession, StructuredPart, ToolCallingOutcome, ToolCallingSession, TurnRole,
        UserInfo,
    };
    pub use gtooling::{
        Tool, ToolDispatcher, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolInvocationRecord, ToolOutput, ToolRegistry, ToolRuntime, VisualKind,
    };
}

pub use error::{BACKEND_UNAVAILABLE_MESSAGE, ChatError, ChatErrorKind};
pub use policy::{ChatPolicy, DEFAULT_CALL_TIMEOUT, MAX_TOOL_ROUNDS, RoundLimitBehavior};
pub use preamble::{INSTRUCTIONS_ACK, INSTRUCTIONS_LEAD, Preamble};
pub use streaming::{EVENT_CHANNEL_CAPACITY, StreamingOptions, StreamingSession};
pub use tool_loop::ToolCallingSession;
pub use types::{
    ChatEventStream, ChatRequest, ConversationTurn, DEFAULT_IMAGE_MIME_TYPE, ImageAttachment,
    StreamEvent, StructuredPart, ToolCallingOutcome, TurnRole, UserInfo,
};
