use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use gemline::gprovider::{
    BackendStreamEvent, BoxedBackendStream, GenerateRequest, GenerateResponse, ModelDescriptor,
    Part, ProviderFuture, VecBackendStream,
};
use gemline::prelude::*;
use serde_json::json;

const RETIRED: &str = "gemini-2.0-flash";

/// Lists two models, the preferred of which rejects every call.
#[derive(Default)]
struct RetiringBackend {
    calls: Mutex<Vec<String>>,
}

impl RetiringBackend {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn admit(&self, request: &GenerateRequest) -> Result<(), ProviderError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(request.model.clone());
        if request.model == RETIRED {
            return Err(ProviderError::classify(
                Some(404),
                format!("models/{RETIRED} is not found"),
            ));
        }
        Ok(())
    }
}

impl GenerativeBackend for RetiringBackend {
    fn name(&self) -> &str {
        "retiring"
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>> {
        Box::pin(async move {
            Ok(vec![
                ModelDescriptor::new("models/gemini-pro"),
                ModelDescriptor::new(format!("models/{RETIRED}")),
            ])
        })
    }

    fn generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>> {
        Box::pin(async move {
            self.admit(&request)?;
            Ok(GenerateResponse::new(
                request.model.clone(),
                vec![Part::text(format!("answered by {}", request.model))],
            ))
        })
    }

    fn stream_generate<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> ProviderFuture<'a, Result<BoxedBackendStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.admit(&request)?;
            let text = format!("streamed by {}", request.model);
            let events = vec![
                Ok(BackendStreamEvent::Chunk(vec![Part::text(text.clone())])),
                Ok(BackendStreamEvent::Complete(GenerateResponse::new(
                    request.model,
                    vec![Part::text(text)],
                ))),
            ];
            Ok(Box::pin(VecBackendStream::new(events)) as BoxedBackendStream<'a>)
        })
    }
}

#[tokio::test]
async fn sessions_share_one_selector() {
    let backend = Arc::new(RetiringBackend::default());
    let runtime = GemlineRuntime::builder(backend.clone()).build();

    assert_eq!(runtime.warm_up().await, RETIRED);

    let outcome = runtime
        .tool_calling
        .run(ChatRequest::new("hello"))
        .await
        .expect("fallback should answer");
    assert_eq!(outcome.text, "answered by gemini-1.5-flash");

    let events: Vec<_> = runtime
        .streaming
        .start(ChatRequest::new("hello again"))
        .expect("stream")
        .collect()
        .await;
    assert_eq!(
        events,
        vec![Ok(StreamEvent::text("streamed by gemini-1.5-flash"))]
    );

    assert_eq!(
        backend.calls(),
        vec![RETIRED, "gemini-1.5-flash", "gemini-1.5-flash"]
    );
}

#[tokio::test]
async fn builtin_tools_see_request_context_data() {
    struct OneCallBackend {
        answered: Mutex<bool>,
    }

    impl GenerativeBackend for OneCallBackend {
        fn name(&self) -> &str {
            "one-call"
        }

        fn list_models<'a>(
            &'a self,
        ) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>> {
            Box::pin(async move { Ok(Vec::new()) })
        }

        fn generate<'a>(
            &'a self,
            request: GenerateRequest,
        ) -> ProviderFuture<'a, Result<GenerateResponse, ProviderError>> {
            Box::pin(async move {
                let mut answered = self.answered.lock().expect("answered lock");
                let parts = if *answered {
                    vec![Part::text("Playing it now.")]
                } else {
                    *answered = true;
                    vec![Part::FunctionCall(gemline::gprovider::FunctionCall {
                        name: "play_video".to_string(),
                        args: json!({"query": "first"}),
                    })]
                };
                Ok(GenerateResponse::new(request.model, parts))
            })
        }

        fn stream_generate<'a>(
            &'a self,
            _request: GenerateRequest,
        ) -> ProviderFuture<'a, Result<BoxedBackendStream<'a>, ProviderError>> {
            Box::pin(async move { Err(ProviderError::other("streaming not scripted")) })
        }
    }

    let runtime = GemlineRuntime::builder(Arc::new(OneCallBackend {
        answered: Mutex::new(false),
    }))
    .build();
    let request = ChatRequest::new("play my first video").with_context_data(json!([
        {"title": "Launch day", "video_url": "https://www.youtube.com/watch?v=abc123", "view_count": 10}
    ]));

    let outcome = runtime.tool_calling.run(request).await.expect("answer");

    assert_eq!(outcome.text, "Playing it now.");
    assert_eq!(outcome.charts.len(), 1);
    assert_eq!(outcome.charts[0]["_toolType"], json!("video"));
    assert_eq!(outcome.charts[0]["video_id"], json!("abc123"));
}
