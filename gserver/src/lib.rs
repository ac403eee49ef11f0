//! HTTP surface over a [`GemlineRuntime`](gemline::GemlineRuntime).
//!
//! - `POST /api/chat/stream`: chat request plus `useCodeExecution`; NDJSON stream events.
//! - `POST /api/chat`: chat request plus `contextData`; `{text, charts, toolCalls}`.
//! - `POST /api/generate-image`: `{prompt, anchor_description}`; `{imageBase64, mimeType, revised_prompt}`.
//! - `GET /api/health`: `{ok, geminiKeyConfigured, imageKeyConfigured}`.
//!
//! ```rust
//! use gemline::{GemlineConfig, build_runtime};
//! use gserver::{AppState, router};
//!
//! let config = GemlineConfig::default();
//! let runtime = build_runtime(&config).expect("runtime");
//! let _app = router(AppState::new(runtime, &config));
//! ```

mod error;
mod routes;
mod state;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;

pub use error::ApiError;
pub use routes::{GenerateImageBody, GeneratedImageBody, NDJSON_CONTENT_TYPE, StreamChatBody};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/chat", post(routes::chat))
        .route("/api/chat/stream", post(routes::chat_stream))
        .route("/api/generate-image", post(routes::generate_image))
        .with_state(state)
}

/// Binds `host:port`; `host` may be an IP literal or a resolvable name such as `localhost`.
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

/// Serves until `shutdown` resolves, letting in-flight requests finish.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
