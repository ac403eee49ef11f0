//! Tool registry for lookup by tool definition name.

use std::future::Future;
use std::sync::Arc;

use gcommon::Registry;
use gprovider::FunctionDeclaration;
use serde_json::Value;

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext, ToolOutput};

/// Result of resolving a backend-requested tool name.
#[derive(Clone)]
pub enum ToolLookup {
    Registered(Arc<dyn Tool>),
    Unknown(String),
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.definition().name;
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    pub fn register_fn<F, Fut>(&mut self, definition: FunctionDeclaration, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(definition, handler));
    }

    pub fn register_sync_fn<F>(&mut self, definition: FunctionDeclaration, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(definition, move |args, context| {
            let output = handler(args, context);
            async move { output }
        });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn lookup(&self, name: &str) -> ToolLookup {
        match self.get(name) {
            Some(tool) => ToolLookup::Registered(tool),
            None => ToolLookup::Unknown(name.to_string()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    /// Declarations in registration order.
    pub fn definitions(&self) -> Vec<FunctionDeclaration> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
