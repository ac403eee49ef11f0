//! Capability layer for registering, dispatching, and rendering tools.
//!
//! Every invocation produces a [`ToolOutput`] with two views: the display view goes to the
//! client unchanged, while the model view drops bulky payloads such as generated images
//! before it is sent back to the backend.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use gtooling::builtins::builtin_registry;
//! use gtooling::{ToolDispatcher, ToolExecutionContext, ToolRuntime};
//! use serde_json::json;
//!
//! # let runtime = tokio::runtime::Runtime::new().expect("runtime");
//! # runtime.block_on(async {
//! let dispatcher = ToolDispatcher::new(Arc::new(builtin_registry(None)));
//! let context = ToolExecutionContext::new()
//!     .with_data(json!([{"title": "a", "view_count": 3}, {"title": "b", "view_count": 5}]));
//!
//! let output = dispatcher
//!     .execute("compute_stats_json", json!({"field": "view_count"}), &context)
//!     .await;
//! assert_eq!(output.get("mean"), Some(&json!(4)));
//! # });
//! ```

mod args;
pub mod builtins;
mod error;
mod hooks;
mod output;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        Tool, ToolDispatcher, ToolError, ToolErrorKind, ToolExecutionContext, ToolFuture,
        ToolInvocationRecord, ToolOutput, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
        VisualKind,
    };
}

pub use args::{
    available_fields, numeric_value, object_args, optional_bool, optional_string, optional_usize,
    required_string, resolve_field,
};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use output::{IMAGE_PAYLOAD_FIELD, TOOL_TYPE_FIELD, ToolInvocationRecord, ToolOutput, VisualKind};
pub use registry::{ToolLookup, ToolRegistry};
pub use runtime::{ToolDispatcher, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::ToolExecutionContext;
