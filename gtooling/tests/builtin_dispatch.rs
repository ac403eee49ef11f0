use std::sync::Arc;

use gtooling::builtins::{GeneratedImage, ImageGenerator, builtin_registry};
use gtooling::{
    ToolDispatcher, ToolError, ToolExecutionContext, ToolFuture, ToolRuntime, VisualKind,
};
use serde_json::{Value, json};

struct StaticImage;

impl ImageGenerator for StaticImage {
    fn generate<'a>(&'a self, _prompt: &'a str) -> ToolFuture<'a, Result<GeneratedImage, ToolError>> {
        Box::pin(async move {
            Ok(GeneratedImage {
                b64_json: "AAAA".to_string(),
                revised_prompt: Some("a refined fox".to_string()),
            })
        })
    }
}

fn channel() -> Value {
    json!([
        {"title": "Launch day", "release_date": "2024-01-10T08:00:00Z", "view_count": 1200, "like_count": 80, "video_url": "https://www.youtube.com/watch?v=launch"},
        {"title": "Behind the scenes", "release_date": "2024-02-14T08:00:00Z", "view_count": 300, "like_count": 12, "video_url": "https://www.youtube.com/watch?v=bts"},
        {"title": "Q&A", "release_date": "2024-03-01T08:00:00Z", "view_count": 4500, "like_count": 310, "video_url": "https://www.youtube.com/watch?v=qa"}
    ])
}

fn dispatcher() -> ToolDispatcher {
    ToolDispatcher::new(Arc::new(builtin_registry(Some(Arc::new(StaticImage)))))
}

#[tokio::test]
async fn channel_tools_read_context_records() {
    let dispatcher = dispatcher();
    let context = ToolExecutionContext::new().with_data(channel());

    let chart = dispatcher
        .execute("plot_metric_vs_time", json!({"metric": "like_count", "sort": "desc"}), &context)
        .await;
    assert_eq!(chart.visual_kind(), Some(VisualKind::Chart));
    assert_eq!(chart.get("data").and_then(Value::as_array).map(Vec::len), Some(3));

    let video = dispatcher
        .execute("play_video", json!({"query": "most popular"}), &context)
        .await;
    assert_eq!(video.get("video_id"), Some(&json!("qa")));

    let stats = dispatcher
        .execute("compute_stats_json", json!({"field": "view_count"}), &context)
        .await;
    assert_eq!(stats.get("median"), Some(&json!(1200)));
    assert_eq!(stats.display_view()["_toolType"], json!("stats"));
}

#[tokio::test]
async fn resolution_failures_reach_the_model_as_errors() {
    let dispatcher = dispatcher();
    let context = ToolExecutionContext::new();

    let output = dispatcher
        .execute("play_video", json!({"query": "first"}), &context)
        .await;
    assert_eq!(output.model_view(), json!({"error": "No channel data loaded."}));

    let output = dispatcher
        .execute("plot_metric_vs_time", json!({}), &context)
        .await;
    assert!(output.is_error());
}

#[tokio::test]
async fn image_payload_is_display_only() {
    let dispatcher = dispatcher();

    let output = dispatcher
        .execute("generateImage", json!({"prompt": "a fox"}), &ToolExecutionContext::new())
        .await;

    assert_eq!(
        output.model_view(),
        json!({
            "_toolType": "image",
            "mimeType": "image/png",
            "prompt": "a fox",
            "revised_prompt": "a refined fox"
        })
    );
    assert_eq!(output.display_view()["imageBase64"], json!("AAAA"));
}

#[tokio::test]
async fn tabular_tools_rank_rows() {
    let dispatcher = dispatcher();
    let context = ToolExecutionContext::new().with_data(json!([
        {"text": "first post", "favorite_count": 3, "source": "web"},
        {"text": "second post", "favorite_count": 9, "source": "mobile"},
        {"text": "third post", "favorite_count": 6, "source": "web"}
    ]));

    let counts = dispatcher
        .execute("get_value_counts", json!({"column": "source"}), &context)
        .await;
    assert_eq!(counts.get("value_counts"), Some(&json!({"web": 2, "mobile": 1})));

    let top = dispatcher
        .execute("get_top_rows", json!({"sort_column": "favorite_count", "n": 1}), &context)
        .await;
    assert_eq!(
        top.get("rows"),
        Some(&json!([{"rank": 1, "text": "second post", "favorite_count": 9}]))
    );
}
