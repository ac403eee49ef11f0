use gprovider::FunctionDeclaration;
use serde_json::{Map, Value, json};

use crate::{
    ToolError, ToolOutput, VisualKind, numeric_value, optional_string, optional_usize,
    required_string, resolve_field,
};

use super::{PLOT_METRIC_VS_TIME, declaration, number, truncate_chars};

const TITLE_LIMIT: usize = 60;

pub(super) fn plot_declaration() -> FunctionDeclaration {
    declaration(
        PLOT_METRIC_VS_TIME,
        "Plot any numeric metric (views, likes, comments, duration) vs time for the channel videos. Returns chart data the UI renders as a line chart. Use when the user asks to plot, chart, graph, or visualize a metric over time.",
        json!({
            "metric": {
                "type": "STRING",
                "description": "Field name: view_count, like_count, comment_count, or duration."
            },
            "video_limit": {
                "type": "NUMBER",
                "description": "Max number of videos to include (omit for all)."
            },
            "sort": {
                "type": "STRING",
                "description": "\"asc\" for oldest first (default), \"desc\" for newest first."
            }
        }),
        &["metric"],
    )
}

struct Point<'a> {
    date: &'a str,
    value: f64,
    record: &'a Value,
}

pub(super) fn plot_metric_vs_time(
    args: &Map<String, Value>,
    records: &[Value],
) -> Result<ToolOutput, ToolError> {
    let metric = resolve_field(records, &required_string(args, "metric")?);
    let descending = optional_string(args, "sort").is_some_and(|sort| sort.eq_ignore_ascii_case("desc"));

    let mut points: Vec<Point<'_>> = records
        .iter()
        .filter_map(|record| {
            let date = record
                .get("release_date")
                .and_then(Value::as_str)
                .filter(|date| !date.is_empty())?;
            let value = record.get(&metric).and_then(numeric_value)?;
            Some(Point { date, value, record })
        })
        .collect();

    // ISO-8601 dates order lexically.
    if descending {
        points.sort_by(|left, right| right.date.cmp(left.date));
    } else {
        points.sort_by(|left, right| left.date.cmp(right.date));
    }

    let limit = optional_usize(args, "video_limit").unwrap_or(points.len());
    let data: Vec<Value> = points
        .into_iter()
        .take(limit)
        .map(|point| {
            let mut row = Map::new();
            let day = point.date.split('T').next().unwrap_or(point.date);
            row.insert("date".to_string(), json!(day));
            let title = point.record.get("title").and_then(Value::as_str).unwrap_or_default();
            row.insert("title".to_string(), json!(truncate_chars(title, TITLE_LIMIT)));
            row.insert(metric.clone(), number(point.value));
            let url = point.record.get("video_url").filter(|url| url.is_string());
            row.insert("video_url".to_string(), url.cloned().unwrap_or(Value::Null));
            Value::Object(row)
        })
        .collect();

    Ok(ToolOutput::visual(VisualKind::Chart)
        .with_field("chartType", json!("metric_vs_time"))
        .with_field("metric", json!(metric))
        .with_field("data", Value::Array(data)))
}
