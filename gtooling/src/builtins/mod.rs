//! Built-in data tools over caller-supplied context records.
//!
//! Channel tools read video records (`title`, `release_date`, `view_count`, ...);
//! tabular tools read arbitrary row objects. Both receive the records through
//! [`ToolExecutionContext::records`](crate::ToolExecutionContext::records).
//!
//! ```rust
//! use gtooling::builtins::builtin_registry;
//!
//! let registry = builtin_registry(None);
//! assert!(registry.contains("compute_stats_json"));
//! assert!(registry.contains("generateImage"));
//! assert_eq!(registry.len(), 7);
//! ```

mod chart;
mod image;
mod stats;
mod tabular;
mod video;

use std::sync::Arc;

use gprovider::FunctionDeclaration;
use serde_json::{Map, Value, json};

use crate::{FunctionTool, ToolError, ToolOutput, ToolRegistry, object_args};

pub use image::{GenerateImageTool, GeneratedImage, ImageGenerator, OpenAiImageGenerator};

pub const COMPUTE_STATS_JSON: &str = "compute_stats_json";
pub const PLOT_METRIC_VS_TIME: &str = "plot_metric_vs_time";
pub const PLAY_VIDEO: &str = "play_video";
pub const GENERATE_IMAGE: &str = "generateImage";
pub const COMPUTE_COLUMN_STATS: &str = "compute_column_stats";
pub const GET_VALUE_COUNTS: &str = "get_value_counts";
pub const GET_TOP_ROWS: &str = "get_top_rows";

/// Registry holding every built-in tool, channel tools first.
pub fn builtin_registry(images: Option<Arc<dyn ImageGenerator>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry, images);
    registry
}

pub fn register_builtin_tools(registry: &mut ToolRegistry, images: Option<Arc<dyn ImageGenerator>>) {
    registry.register(GenerateImageTool::new(images));
    registry.register(record_tool(chart::plot_declaration(), chart::plot_metric_vs_time));
    registry.register(record_tool(video::play_declaration(), video::play_video));
    registry.register(record_tool(
        stats::stats_json_declaration(),
        stats::compute_stats_json,
    ));
    registry.register(record_tool(
        stats::column_stats_declaration(),
        stats::compute_column_stats,
    ));
    registry.register(record_tool(
        tabular::value_counts_declaration(),
        tabular::get_value_counts,
    ));
    registry.register(record_tool(tabular::top_rows_declaration(), tabular::get_top_rows));
}

type RecordHandler = fn(&Map<String, Value>, &[Value]) -> Result<ToolOutput, ToolError>;

/// Wraps a synchronous handler over object arguments and context records.
fn record_tool(definition: FunctionDeclaration, handler: RecordHandler) -> FunctionTool {
    FunctionTool::new(definition, move |args, context| {
        let output = object_args(&args).and_then(|args| handler(&args, context.records()));
        async move { output }
    })
}

fn declaration(name: &str, description: &str, properties: Value, required: &[&str]) -> FunctionDeclaration {
    FunctionDeclaration {
        name: name.to_string(),
        description: description.to_string(),
        parameters: json!({
            "type": "OBJECT",
            "properties": properties,
            "required": required,
        }),
    }
}

/// Integral values render without a fractional part.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn field_list(records: &[Value]) -> String {
    let fields = crate::available_fields(records);
    if fields.is_empty() {
        "none".to_string()
    } else {
        fields.join(", ")
    }
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

/// Display text of a record value; `null` and missing values are empty.
fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn number_drops_fraction_for_integral_values() {
        assert_eq!(number(10.0), json!(10));
        assert_eq!(number(2.5), json!(2.5));
        assert_eq!(round4(1.234_567), 1.2346);
    }

    #[test]
    fn declarations_use_uppercase_schema_types() {
        let registry = builtin_registry(None);
        for definition in registry.definitions() {
            assert_eq!(definition.parameters["type"], "OBJECT", "{}", definition.name);
            assert!(definition.parameters["required"].is_array());
        }
    }

    #[test]
    fn value_text_renders_scalars() {
        assert_eq!(value_text(Some(&json!("a"))), "a");
        assert_eq!(value_text(Some(&json!(3))), "3");
        assert_eq!(value_text(Some(&Value::Null)), "");
        assert_eq!(value_text(None), "");
    }
}
