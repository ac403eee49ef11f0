//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use gprovider::FunctionDeclaration;
//! use gtooling::{FunctionTool, Tool, ToolOutput};
//! use serde_json::json;
//!
//! let tool = FunctionTool::new(
//!     FunctionDeclaration {
//!         name: "echo".to_string(),
//!         description: "Echoes input".to_string(),
//!         parameters: json!({"type": "OBJECT"}),
//!     },
//!     |args, _ctx| async move { Ok(ToolOutput::plain().with_field("echo", args)) },
//! );
//!
//! assert_eq!(tool.definition().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use gcommon::BoxFuture;
use gprovider::FunctionDeclaration;
use serde_json::Value;

use crate::{ToolError, ToolExecutionContext, ToolOutput};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait Tool: Send + Sync {
    /// Name, description, and argument schema advertised to the backend.
    fn definition(&self) -> FunctionDeclaration;

    fn invoke<'a>(
        &'a self,
        args: &'a Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolOutput, ToolError>>;
}

type ToolHandler = dyn Fn(Value, ToolExecutionContext) -> ToolFuture<'static, Result<ToolOutput, ToolError>>
    + Send
    + Sync;

pub struct FunctionTool {
    definition: FunctionDeclaration,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: FunctionDeclaration, handler: F) -> Self
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> = Arc::new(move |args, context| Box::pin(handler(args, context)));

        Self {
            definition,
            handler,
        }
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> FunctionDeclaration {
        self.definition.clone()
    }

    fn invoke<'a>(
        &'a self,
        args: &'a Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolOutput, ToolError>> {
        (self.handler)(args.clone(), context.clone())
    }
}
