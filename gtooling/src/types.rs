//! Tool runtime context shared by every invocation in a request.

use std::sync::Arc;

use gcommon::{MetadataMap, RequestId};
use serde_json::Value;

/// Caller-supplied data handed to tools unmodified, plus request identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionContext {
    pub request_id: Option<RequestId>,
    pub data: Arc<Value>,
    pub metadata: MetadataMap,
}

impl Default for ToolExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolExecutionContext {
    pub fn new() -> Self {
        Self {
            request_id: None,
            data: Arc::new(Value::Null),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Arc::new(data);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<RequestId>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Context data viewed as a list of records; non-array data yields no records.
    pub fn records(&self) -> &[Value] {
        self.data.as_array().map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn records_reads_array_data_only() {
        let context = ToolExecutionContext::new().with_data(json!([{"a": 1}, {"a": 2}]));
        assert_eq!(context.records().len(), 2);

        let object = ToolExecutionContext::new().with_data(json!({"a": 1}));
        assert!(object.records().is_empty());
        assert!(ToolExecutionContext::default().records().is_empty());
    }
}
