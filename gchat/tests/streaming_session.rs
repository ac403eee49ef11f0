mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedBackend, chunk, complete, text_response, throttled};
use futures_util::StreamExt;
use gchat::INSTRUCTIONS_ACK;
use gchat::prelude::*;
use gprovider::{
    BackendTool, CodeExecutionResult, ExecutableCode, FixedModelSelector, GenerateResponse, Part,
    ProviderError,
};
use serde_json::json;

fn streaming(backend: Arc<ScriptedBackend>, models: &[&str]) -> StreamingSession {
    StreamingSession::new(
        backend,
        Arc::new(FixedModelSelector::new(models.iter().copied())),
    )
}

async fn collect(stream: ChatEventStream) -> Vec<Result<StreamEvent, ChatError>> {
    stream.collect().await
}

#[tokio::test]
async fn fragments_become_text_events_in_order() {
    let backend = Arc::new(ScriptedBackend::new().with_stream(vec![
        chunk("Hi"),
        chunk(" there"),
        complete(text_response("Hi there")),
    ]));
    let session = streaming(backend.clone(), &["gemini-2.0-flash"]);

    let events = collect(session.start(ChatRequest::new("Hello")).expect("stream")).await;

    assert_eq!(
        events,
        vec![Ok(StreamEvent::text("Hi")), Ok(StreamEvent::text(" there"))]
    );
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].tools, vec![BackendTool::GoogleSearch]);
}

#[tokio::test]
async fn artifacts_and_grounding_follow_text() {
    let final_response = GenerateResponse::new(
        "gemini-2.0-flash",
        vec![
            Part::text("Computing"),
            Part::ExecutableCode(ExecutableCode {
                language: "PYTHON".to_string(),
                code: "print(6 * 7)".to_string(),
            }),
            Part::CodeExecutionResult(CodeExecutionResult {
                outcome: "OUTCOME_OK".to_string(),
                output: "42\n".to_string(),
            }),
        ],
    )
    .with_grounding(json!({"groundingChunks": [{"web": {"uri": "https://example.com"}}]}));
    let backend = Arc::new(
        ScriptedBackend::new().with_stream(vec![chunk("Computing"), complete(final_response)]),
    );
    let session = streaming(backend.clone(), &["m"]);

    let events = collect(
        session
            .start_with_options(
                ChatRequest::new("what is 6*7?"),
                StreamingOptions::default().with_code_execution(true),
            )
            .expect("stream"),
    )
    .await;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0], Ok(StreamEvent::text("Computing")));
    assert_eq!(
        events[1],
        Ok(StreamEvent::FullResponse {
            parts: vec![
                StructuredPart::Text {
                    text: "Computing".to_string()
                },
                StructuredPart::Code {
                    language: "PYTHON".to_string(),
                    code: "print(6 * 7)".to_string()
                },
                StructuredPart::Result {
                    outcome: "OUTCOME_OK".to_string(),
                    output: "42\n".to_string()
                },
            ]
        })
    );
    assert!(matches!(events[2], Ok(StreamEvent::Grounding { .. })));
    assert_eq!(backend.requests()[0].tools, vec![BackendTool::CodeExecution]);
}

#[tokio::test]
async fn unusable_model_falls_back_before_any_output() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_unusable("old-model")
            .with_stream(vec![chunk("ok"), complete(text_response("ok"))]),
    );
    let selector = Arc::new(FixedModelSelector::new(["old-model", "gemini-1.5-flash"]));
    let session = StreamingSession::new(backend.clone(), selector.clone());

    let events = collect(session.start(ChatRequest::new("hi")).expect("stream")).await;

    assert_eq!(events, vec![Ok(StreamEvent::text("ok"))]);
    assert_eq!(backend.requested_models(), vec!["old-model", "gemini-1.5-flash"]);
    assert_eq!(selector.invalidations(), 1);
}

#[tokio::test]
async fn exhausted_roster_emits_only_one_error() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_unusable("a")
            .with_unusable("b")
            .with_unusable("c"),
    );
    let session = streaming(backend.clone(), &["a", "b", "c"]);

    let events = collect(session.start(ChatRequest::new("hi")).expect("stream")).await;

    assert_eq!(events, vec![Err(ChatError::backend_unavailable())]);
    assert_eq!(backend.requested_models(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn failure_after_partial_output_is_terminal() {
    let backend = Arc::new(ScriptedBackend::new().with_stream(vec![
        chunk("partial"),
        Err(ProviderError::model_unavailable("model went away")),
    ]));
    let session = streaming(backend.clone(), &["a", "b"]);

    let events = collect(session.start(ChatRequest::new("hi")).expect("stream")).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], Ok(StreamEvent::text("partial")));
    assert!(events[1].is_err());
    assert_eq!(backend.requested_models(), vec!["a"]);
}

#[tokio::test]
async fn empty_message_is_rejected_synchronously() {
    let backend = Arc::new(ScriptedBackend::new());
    let session = streaming(backend.clone(), &["m"]);

    let error = session
        .start(ChatRequest::new(""))
        .err()
        .expect("empty message should be rejected");

    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn preamble_and_history_precede_the_message() {
    let backend = Arc::new(
        ScriptedBackend::new().with_stream(vec![complete(text_response("Hello Ada"))]),
    );
    let session = streaming(backend.clone(), &["m"]).with_preamble(Preamble::new("Be kind."));
    let request = ChatRequest::new("Hello")
        .with_turn(ConversationTurn::user("earlier"))
        .with_user_info(UserInfo::new("Ada"));

    let events = collect(session.start(request).expect("stream")).await;

    assert!(events.is_empty());
    let requests = backend.requests();
    let contents = &requests[0].contents;
    assert_eq!(contents.len(), 4);
    assert_eq!(contents[1], gprovider::Content::model_text(INSTRUCTIONS_ACK));
    assert_eq!(contents[3], gprovider::Content::user_text("Hello"));
}

#[tokio::test(start_paused = true)]
async fn throttled_opening_is_retried_then_streams() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_stream_open_error(throttled())
            .with_stream(vec![chunk("ok"), complete(text_response("ok"))]),
    );
    let session = streaming(backend.clone(), &["m"]);
    let started = tokio::time::Instant::now();

    let events = collect(session.start(ChatRequest::new("hi")).expect("stream")).await;

    assert_eq!(events, vec![Ok(StreamEvent::text("ok"))]);
    assert_eq!(backend.requested_models(), vec!["m", "m"]);
    assert!(started.elapsed() >= Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retry_budget_surfaces_rate_limited() {
    let mut backend = ScriptedBackend::new();
    for _ in 0..4 {
        backend = backend.with_stream_open_error(throttled());
    }
    let backend = Arc::new(backend);
    let session = streaming(backend.clone(), &["m", "other"]);

    let events = collect(session.start(ChatRequest::new("hi")).expect("stream")).await;

    assert_eq!(events.len(), 1);
    let Err(error) = &events[0] else {
        panic!("expected a rate-limit error");
    };
    assert_eq!(error.kind, ChatErrorKind::RateLimited);
    assert_eq!(backend.requested_models(), vec!["m", "m", "m", "m"]);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_stream_stops_backend_calls() {
    let mut backend = ScriptedBackend::new();
    for _ in 0..4 {
        backend = backend.with_stream_open_error(throttled());
    }
    let backend = Arc::new(backend);
    let session = streaming(backend.clone(), &["m"]);

    let stream = session.start(ChatRequest::new("hi")).expect("stream");
    tokio::time::sleep(Duration::from_millis(10)).await;
    let before = backend.requests().len();
    drop(stream);
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(before, 1);
    assert_eq!(backend.requests().len(), before);
}
