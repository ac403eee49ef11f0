use std::collections::HashMap;

use gprovider::FunctionDeclaration;
use serde_json::{Map, Value, json};

use crate::{
    ToolError, ToolOutput, available_fields, numeric_value, optional_bool, optional_usize,
    required_string, resolve_field,
};

use super::{GET_TOP_ROWS, GET_VALUE_COUNTS, declaration, field_list, number, truncate_chars, value_text};

const DEFAULT_TOP_N: usize = 10;
const TEXT_LIMIT: usize = 150;

pub(super) fn value_counts_declaration() -> FunctionDeclaration {
    declaration(
        GET_VALUE_COUNTS,
        "Count occurrences of each distinct value in a categorical column. Use the exact column name from [CSV columns: ...].",
        json!({
            "column": {
                "type": "STRING",
                "description": "Exact column name copied from [CSV columns: ...]."
            },
            "top_n": {
                "type": "NUMBER",
                "description": "How many top values to return (default 10)."
            }
        }),
        &["column"],
    )
}

pub(super) fn get_value_counts(
    args: &Map<String, Value>,
    records: &[Value],
) -> Result<ToolOutput, ToolError> {
    let column = resolve_field(records, &required_string(args, "column")?);
    let top_n = optional_usize(args, "top_n").unwrap_or(DEFAULT_TOP_N);

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let key = value_text(record.get(&column));
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            Some(position) => counts[*position].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    // Stable: ties keep first-seen order.
    counts.sort_by(|left, right| right.1.cmp(&left.1));

    let value_counts: Map<String, Value> = counts
        .into_iter()
        .take(top_n)
        .map(|(value, count)| (value, json!(count)))
        .collect();

    Ok(ToolOutput::plain()
        .with_field("column", json!(column))
        .with_field("total_rows", json!(records.len()))
        .with_field("value_counts", Value::Object(value_counts)))
}

pub(super) fn top_rows_declaration() -> FunctionDeclaration {
    declaration(
        GET_TOP_ROWS,
        "Return the top or bottom N rows sorted by any numeric column, with each row's text truncated for readability.",
        json!({
            "sort_column": {
                "type": "STRING",
                "description": "Exact numeric column name to sort by, copied from [CSV columns: ...]."
            },
            "n": {
                "type": "NUMBER",
                "description": "Number of rows to return (default 10)."
            },
            "ascending": {
                "type": "BOOLEAN",
                "description": "true for lowest first, false (default) for highest first."
            }
        }),
        &["sort_column"],
    )
}

pub(super) fn get_top_rows(
    args: &Map<String, Value>,
    records: &[Value],
) -> Result<ToolOutput, ToolError> {
    let sort_column = resolve_field(records, &required_string(args, "sort_column")?);
    let n = optional_usize(args, "n").unwrap_or(DEFAULT_TOP_N);
    let ascending = optional_bool(args, "ascending").unwrap_or(false);

    if records.is_empty() {
        return Err(ToolError::invalid_arguments(format!(
            "No rows to rank by \"{sort_column}\". Available: {}",
            field_list(records)
        )));
    }

    let headers = available_fields(records);
    let text_column = text_column(&headers);
    let carried: Vec<&String> = headers
        .iter()
        .filter(|header| {
            let lower = header.to_lowercase();
            lower == "engagement"
                || loose_count_column(&lower, "favorite")
                || loose_count_column(&lower, "view")
        })
        .collect();

    let (mut ranked, unranked): (Vec<(f64, &Value)>, Vec<(f64, &Value)>) = records
        .iter()
        .map(|record| {
            let score = record.get(&sort_column).and_then(numeric_value).unwrap_or(f64::NAN);
            (score, record)
        })
        .partition(|(score, _)| !score.is_nan());

    if ascending {
        ranked.sort_by(|left, right| left.0.total_cmp(&right.0));
    } else {
        ranked.sort_by(|left, right| right.0.total_cmp(&left.0));
    }

    let rows: Vec<Value> = ranked
        .into_iter()
        .chain(unranked)
        .take(n)
        .enumerate()
        .map(|(position, (score, record))| {
            let mut row = Map::new();
            row.insert("rank".to_string(), json!(position + 1));
            if let Some(column) = text_column {
                let text = value_text(record.get(column));
                row.insert("text".to_string(), json!(truncate_chars(&text, TEXT_LIMIT)));
            }
            for column in &carried {
                row.insert(
                    (*column).clone(),
                    record.get(column.as_str()).cloned().unwrap_or(Value::Null),
                );
            }
            if !row.contains_key(&sort_column) {
                let value = if score.is_nan() { Value::Null } else { number(score) };
                row.insert(sort_column.clone(), value);
            }
            Value::Object(row)
        })
        .collect();

    Ok(ToolOutput::plain()
        .with_field("sort_column", json!(sort_column))
        .with_field(
            "direction",
            json!(if ascending { "ascending" } else { "descending" }),
        )
        .with_field("count", json!(rows.len()))
        .with_field("rows", Value::Array(rows)))
}

/// Column named exactly `text`, else the first whose name mentions text-like content.
fn text_column(headers: &[String]) -> Option<&String> {
    headers
        .iter()
        .find(|header| header.eq_ignore_ascii_case("text"))
        .or_else(|| {
            headers.iter().find(|header| {
                let lower = header.to_lowercase();
                ["text", "content", "tweet", "body"]
                    .iter()
                    .any(|needle| lower.contains(needle))
            })
        })
}

/// Matches `{prefix}count` with at most one separator character between the parts.
fn loose_count_column(lower: &str, prefix: &str) -> bool {
    lower.match_indices(prefix).any(|(start, _)| {
        let rest = &lower[start + prefix.len()..];
        rest.starts_with("count")
            || rest
                .char_indices()
                .nth(1)
                .is_some_and(|(offset, _)| rest[offset..].starts_with("count"))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::object_args;

    fn tweets() -> Vec<Value> {
        vec![
            json!({"Tweet Text": "hello world", "favorite_count": 5, "viewCount": 100, "lang": "en"}),
            json!({"Tweet Text": "bonjour", "favorite_count": 50, "viewCount": 10, "lang": "fr"}),
            json!({"Tweet Text": "hola", "favorite_count": "n/a", "viewCount": 1, "lang": "es"}),
            json!({"Tweet Text": "again", "favorite_count": 20, "viewCount": 7, "lang": "en"}),
            json!({"Tweet Text": "blank", "favorite_count": 1, "viewCount": 3, "lang": ""}),
        ]
    }

    #[test]
    fn value_counts_rank_by_frequency_and_skip_blanks() {
        let args = object_args(&json!({"column": "lang", "top_n": 2})).expect("args");
        let output = get_value_counts(&args, &tweets()).expect("counts");

        assert_eq!(output.get("total_rows"), Some(&json!(5)));
        assert_eq!(output.get("value_counts"), Some(&json!({"en": 2, "fr": 1})));
        let keys: Vec<&String> = output
            .get("value_counts")
            .and_then(Value::as_object)
            .expect("object")
            .keys()
            .collect();
        assert_eq!(keys, vec!["en", "fr"]);
    }

    #[test]
    fn top_rows_sort_descending_and_keep_unranked_last() {
        let args = object_args(&json!({"sort_column": "favorite_count", "n": 10})).expect("args");
        let output = get_top_rows(&args, &tweets()).expect("rows");

        assert_eq!(output.get("direction"), Some(&json!("descending")));
        assert_eq!(output.get("count"), Some(&json!(5)));
        let rows = output.get("rows").and_then(Value::as_array).expect("rows");
        let texts: Vec<&str> = rows.iter().filter_map(|row| row["text"].as_str()).collect();
        assert_eq!(texts, vec!["bonjour", "again", "hello world", "blank", "hola"]);
        assert_eq!(rows[0]["rank"], json!(1));
        assert_eq!(rows[0]["viewCount"], json!(10));
    }

    #[test]
    fn top_rows_ascending_limits_results() {
        let args = object_args(&json!({"sort_column": "viewCount", "n": 2, "ascending": true}))
            .expect("args");
        let output = get_top_rows(&args, &tweets()).expect("rows");

        let rows = output.get("rows").and_then(Value::as_array).expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["text"], json!("hola"));
        assert_eq!(output.get("direction"), Some(&json!("ascending")));
    }

    #[test]
    fn top_rows_truncate_text_and_reject_empty_data() {
        let records = vec![json!({"text": "y".repeat(200), "score": 1})];
        let args = object_args(&json!({"sort_column": "score"})).expect("args");
        let output = get_top_rows(&args, &records).expect("rows");
        let row = &output.get("rows").expect("rows")[0];
        assert_eq!(row["text"].as_str().map(str::len), Some(150));
        assert_eq!(row["score"], json!(1));

        assert!(get_top_rows(&args, &[]).is_err());
    }

    #[test]
    fn loose_count_column_allows_one_separator() {
        assert!(loose_count_column("favorite_count", "favorite"));
        assert!(loose_count_column("favoritecount", "favorite"));
        assert!(loose_count_column("viewcount", "view"));
        assert!(!loose_count_column("favorite__count", "favorite"));
        assert!(!loose_count_column("reviews", "view"));
    }
}
