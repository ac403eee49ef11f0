//! Tool results and the two views derived from them.
//!
//! A tool result carries an optional visual marker. The display view is the full
//! object shown to the caller. The model view drops binary payloads before the result
//! is replayed to the backend.
//!
//! ```rust
//! use gtooling::{ToolOutput, VisualKind};
//! use serde_json::json;
//!
//! let output = ToolOutput::visual(VisualKind::Image)
//!     .with_field("mimeType", json!("image/png"))
//!     .with_field("imageBase64", json!("iVBORw0"));
//!
//! assert_eq!(output.display_view()["_toolType"], "image");
//! assert!(output.model_view().get("imageBase64").is_none());
//! ```

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

pub const TOOL_TYPE_FIELD: &str = "_toolType";
pub const IMAGE_PAYLOAD_FIELD: &str = "imageBase64";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualKind {
    Chart,
    Image,
    Video,
    Stats,
}

impl VisualKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Image => "image",
            Self::Video => "video",
            Self::Stats => "stats",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "chart" => Some(Self::Chart),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolOutput {
    visual: Option<VisualKind>,
    fields: Map<String, Value>,
    binary_fields: Vec<String>,
}

impl ToolOutput {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn visual(kind: VisualKind) -> Self {
        Self {
            visual: Some(kind),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::plain().with_field("error", Value::String(message.into()))
    }

    /// Wraps an arbitrary JSON value; objects keep their fields and visual marker,
    /// anything else lands under `result`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut fields) => {
                let visual = fields
                    .remove(TOOL_TYPE_FIELD)
                    .and_then(|marker| marker.as_str().and_then(VisualKind::parse));
                Self {
                    visual,
                    fields,
                    binary_fields: Vec::new(),
                }
            }
            other => Self::plain().with_field("result", other),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Marks a field as display-only; it never appears in the model view.
    pub fn with_binary_field(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.binary_fields.contains(&key) {
            self.binary_fields.push(key);
        }
        self
    }

    pub fn visual_kind(&self) -> Option<VisualKind> {
        self.visual
    }

    pub fn is_visual(&self) -> bool {
        self.visual.is_some()
    }

    pub fn is_error(&self) -> bool {
        self.fields.contains_key("error")
    }

    pub fn error_message(&self) -> Option<&str> {
        self.fields.get("error").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn display_view(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        if let Some(kind) = self.visual {
            object.insert(TOOL_TYPE_FIELD.to_string(), Value::String(kind.as_str().to_string()));
        }
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }

    pub fn model_view(&self) -> Value {
        let mut view = self.display_view();
        if let Value::Object(object) = &mut view {
            object.remove(IMAGE_PAYLOAD_FIELD);
            for field in &self.binary_fields {
                object.remove(field);
            }
        }
        view
    }
}

impl Serialize for ToolOutput {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.display_view().serialize(serializer)
    }
}

/// Audit entry for one executed tool call; `result` is the display view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRecord {
    pub name: String,
    pub args: Value,
    pub result: Value,
}

impl ToolInvocationRecord {
    pub fn new(name: impl Into<String>, args: Value, output: &ToolOutput) -> Self {
        Self {
            name: name.into(),
            args,
            result: output.display_view(),
        }
    }
}
