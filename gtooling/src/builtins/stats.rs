use gprovider::FunctionDeclaration;
use serde_json::{Map, Value, json};

use crate::{ToolError, ToolOutput, VisualKind, numeric_value, required_string, resolve_field};

use super::{COMPUTE_COLUMN_STATS, COMPUTE_STATS_JSON, declaration, field_list, number, round4};

const COLUMN_NOTE: &str =
    "Use the exact column name as it appears in the [CSV columns: ...] header at the top of the message.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

pub(crate) fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    Some(Summary {
        count,
        mean,
        median,
        std: variance.sqrt(),
        min: sorted[0],
        max: sorted[count - 1],
    })
}

fn field_values(records: &[Value], field: &str) -> Vec<f64> {
    records
        .iter()
        .filter_map(|record| record.get(field).and_then(numeric_value))
        .collect()
}

pub(super) fn stats_json_declaration() -> FunctionDeclaration {
    declaration(
        COMPUTE_STATS_JSON,
        "Compute descriptive statistics (mean, median, standard deviation, min, max, n) for any numeric field in the loaded YouTube channel JSON. Use for \"average\", \"statistics\", \"distribution\", etc.",
        json!({
            "field": {
                "type": "STRING",
                "description": "Numeric field name: view_count, like_count, comment_count, or duration."
            }
        }),
        &["field"],
    )
}

pub(super) fn compute_stats_json(
    args: &Map<String, Value>,
    records: &[Value],
) -> Result<ToolOutput, ToolError> {
    let field = resolve_field(records, &required_string(args, "field")?);
    let values = field_values(records, &field);

    let summary = summarize(&values).ok_or_else(|| {
        ToolError::invalid_arguments(format!(
            "No numeric values for \"{field}\". Available fields: {}",
            field_list(records)
        ))
    })?;

    Ok(ToolOutput::visual(VisualKind::Stats)
        .with_field("field", json!(field))
        .with_field("n", json!(summary.count))
        .with_field("mean", number(round4(summary.mean)))
        .with_field("median", number(round4(summary.median)))
        .with_field("std", number(round4(summary.std)))
        .with_field("min", number(summary.min))
        .with_field("max", number(summary.max)))
}

pub(super) fn column_stats_declaration() -> FunctionDeclaration {
    declaration(
        COMPUTE_COLUMN_STATS,
        &format!(
            "Compute descriptive statistics (mean, median, std, min, max, count) for a numeric column. {COLUMN_NOTE}"
        ),
        json!({
            "column": {
                "type": "STRING",
                "description": "Exact column name copied from [CSV columns: ...]."
            }
        }),
        &["column"],
    )
}

pub(super) fn compute_column_stats(
    args: &Map<String, Value>,
    records: &[Value],
) -> Result<ToolOutput, ToolError> {
    let column = resolve_field(records, &required_string(args, "column")?);
    let values = field_values(records, &column);

    let summary = summarize(&values).ok_or_else(|| {
        ToolError::invalid_arguments(format!(
            "No numeric values in \"{column}\". Available: {}",
            field_list(records)
        ))
    })?;

    Ok(ToolOutput::plain()
        .with_field("column", json!(column))
        .with_field("count", json!(summary.count))
        .with_field("mean", number(round4(summary.mean)))
        .with_field("median", number(round4(summary.median)))
        .with_field("std", number(round4(summary.std)))
        .with_field("min", number(summary.min))
        .with_field("max", number(summary.max)))
}
