use gprovider::FunctionDeclaration;
use reqwest::Url;
use serde_json::{Map, Value, json};

use crate::{ToolError, ToolOutput, VisualKind, numeric_value};

use super::{PLAY_VIDEO, declaration};

const ORDINALS: &[(&str, isize)] = &[
    ("first", 0),
    ("1st", 0),
    ("second", 1),
    ("2nd", 1),
    ("third", 2),
    ("3rd", 2),
    ("fourth", 3),
    ("4th", 3),
    ("fifth", 4),
    ("5th", 4),
    ("sixth", 5),
    ("6th", 5),
    ("seventh", 6),
    ("7th", 6),
    ("eighth", 7),
    ("8th", 7),
    ("ninth", 8),
    ("9th", 8),
    ("tenth", 9),
    ("10th", 9),
    ("last", -1),
];

pub(super) fn play_declaration() -> FunctionDeclaration {
    declaration(
        PLAY_VIDEO,
        "Open or play a specific YouTube video from the loaded channel data. Use when the user asks to \"play\", \"open\", \"watch\", or \"show\" a video. Matches by title substring, ordinal (\"first\", \"last\"), or popularity (\"most viewed\").",
        json!({
            "query": {
                "type": "STRING",
                "description": "Title keywords, ordinal like \"first\" or \"last\", or \"most viewed\"."
            }
        }),
        &["query"],
    )
}

pub(super) fn play_video(
    args: &Map<String, Value>,
    records: &[Value],
) -> Result<ToolOutput, ToolError> {
    if records.is_empty() {
        return Err(ToolError::invalid_arguments("No channel data loaded."));
    }

    let raw_query = args.get("query").and_then(Value::as_str).unwrap_or_default();
    let query = raw_query.trim().to_lowercase();

    if ["most viewed", "most popular", "top viewed"]
        .iter()
        .any(|phrase| query.contains(phrase))
    {
        return Ok(video_output(by_view_count(records, Extreme::Max)));
    }
    if query.contains("least viewed") {
        return Ok(video_output(by_view_count(records, Extreme::Min)));
    }

    if let Some((_, index)) = ORDINALS.iter().find(|(word, _)| query.contains(word)) {
        let position = if *index < 0 {
            records.len().checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };
        return position
            .and_then(|position| records.get(position))
            .map(video_output)
            .ok_or_else(|| {
                ToolError::invalid_arguments(format!("Only {} videos loaded.", records.len()))
            });
    }

    let title_of = |record: &Value| {
        record
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase()
    };

    if let Some(record) = records.iter().find(|record| title_of(record).contains(&query)) {
        return Ok(video_output(record));
    }

    let words: Vec<&str> = query
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .collect();
    records
        .iter()
        .find(|record| {
            let title = title_of(record);
            words.iter().any(|word| title.contains(word))
        })
        .map(video_output)
        .ok_or_else(|| {
            ToolError::invalid_arguments(format!(
                "No video matching \"{raw_query}\" found in loaded data."
            ))
        })
}

#[derive(Clone, Copy)]
enum Extreme {
    Max,
    Min,
}

/// First record holding the extreme view count; missing counts read as zero.
fn by_view_count(records: &[Value], extreme: Extreme) -> &Value {
    let views = |record: &Value| record.get("view_count").and_then(numeric_value).unwrap_or(0.0);
    let mut best = &records[0];
    for record in &records[1..] {
        let better = match extreme {
            Extreme::Max => views(record) > views(best),
            Extreme::Min => views(record) < views(best),
        };
        if better {
            best = record;
        }
    }
    best
}

fn video_output(record: &Value) -> ToolOutput {
    let text = |key: &str| record.get(key).and_then(Value::as_str).filter(|value| !value.is_empty());

    let video_id = text("video_id")
        .map(ToString::to_string)
        .or_else(|| text("video_url").and_then(video_id_from_url))
        .unwrap_or_default();
    let thumbnail_url = text("thumbnail_url")
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg"));
    let video_url = text("video_url")
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={video_id}"));
    let carried = |key: &str| record.get(key).cloned().unwrap_or(Value::Null);

    ToolOutput::visual(VisualKind::Video)
        .with_field("title", json!(text("title").unwrap_or_default()))
        .with_field("thumbnail_url", json!(thumbnail_url))
        .with_field("video_url", json!(video_url))
        .with_field("video_id", json!(video_id))
        .with_field("view_count", carried("view_count"))
        .with_field("like_count", carried("like_count"))
        .with_field("duration", carried("duration"))
}

/// `v` query parameter, else the last path segment.
fn video_id_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        return Some(id.into_owned());
    }
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::object_args;

    fn videos() -> Vec<Value> {
        vec![
            json!({"title": "Intro to Rust", "video_url": "https://www.youtube.com/watch?v=abc123", "view_count": 500, "like_count": 20, "duration": 300}),
            json!({"title": "Async Deep Dive", "video_url": "https://youtu.be/def456", "view_count": 1500}),
            json!({"title": "Error Handling", "video_id": "ghi789", "view_count": 90}),
        ]
    }

    fn play(query: &str) -> Result<ToolOutput, ToolError> {
        let args = object_args(&json!({"query": query})).expect("args");
        play_video(&args, &videos())
    }

    #[test]
    fn popularity_queries_pick_view_extremes() {
        let most = play("Play the most viewed one").expect("video");
        assert_eq!(most.get("title"), Some(&json!("Async Deep Dive")));
        assert_eq!(most.get("video_id"), Some(&json!("def456")));

        let least = play("least viewed").expect("video");
        assert_eq!(least.get("title"), Some(&json!("Error Handling")));
        assert_eq!(
            least.get("video_url"),
            Some(&json!("https://www.youtube.com/watch?v=ghi789"))
        );
    }

    #[test]
    fn ordinals_index_into_loaded_order() {
        assert_eq!(play("first").expect("video").get("video_id"), Some(&json!("abc123")));
        assert_eq!(play("the last video").expect("video").get("title"), Some(&json!("Error Handling")));

        let error = play("tenth").expect_err("out of range");
        assert_eq!(error.message, "Only 3 videos loaded.");
    }

    #[test]
    fn title_and_word_matches_fill_video_defaults() {
        let output = play("intro to rust").expect("video");
        assert_eq!(output.visual_kind(), Some(VisualKind::Video));
        assert_eq!(
            output.display_view(),
            json!({
                "_toolType": "video",
                "title": "Intro to Rust",
                "thumbnail_url": "https://i.ytimg.com/vi/abc123/hqdefault.jpg",
                "video_url": "https://www.youtube.com/watch?v=abc123",
                "video_id": "abc123",
                "view_count": 500,
                "like_count": 20,
                "duration": 300
            })
        );

        let by_word = play("that handling video").expect("video");
        assert_eq!(by_word.get("video_id"), Some(&json!("ghi789")));
        assert_eq!(by_word.get("like_count"), Some(&Value::Null));
    }

    #[test]
    fn misses_and_empty_data_are_errors() {
        let error = play("cooking show").expect_err("no match");
        assert_eq!(error.message, "No video matching \"cooking show\" found in loaded data.");

        let args = object_args(&json!({"query": "first"})).expect("args");
        let error = play_video(&args, &[]).expect_err("no data");
        assert_eq!(error.message, "No channel data loaded.");
    }

    #[test]
    fn video_id_comes_from_query_or_path() {
        assert_eq!(video_id_from_url("https://youtube.com/watch?v=xyz").as_deref(), Some("xyz"));
        assert_eq!(video_id_from_url("https://youtu.be/short1").as_deref(), Some("short1"));
        assert_eq!(video_id_from_url("not a url"), None);
    }
}
