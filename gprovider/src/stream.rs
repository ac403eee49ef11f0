//! Streaming event contracts and in-memory stream utilities.
//!
//! ```rust
//! use gprovider::{BackendStreamEvent, BoxedBackendStream, GenerateResponse, Part, VecBackendStream};
//!
//! let stream = VecBackendStream::new(vec![
//!     Ok(BackendStreamEvent::Chunk(vec![Part::text("hello")])),
//!     Ok(BackendStreamEvent::Complete(GenerateResponse::new("m", vec![Part::text("hello")]))),
//! ]);
//! let _boxed: BoxedBackendStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::{GenerateResponse, Part, ProviderError};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendStreamEvent {
    /// Parts carried by one partial response, in arrival order.
    Chunk(Vec<Part>),
    /// Consolidated response assembled from every chunk.
    Complete(GenerateResponse),
}

impl BackendStreamEvent {
    /// Concatenated text of a chunk; `None` for completions and text-less chunks.
    pub fn chunk_text(&self) -> Option<String> {
        match self {
            Self::Chunk(parts) => {
                let text = parts.iter().filter_map(Part::as_text).collect::<String>();
                (!text.is_empty()).then_some(text)
            }
            Self::Complete(_) => None,
        }
    }
}

/// Backend stream contract.
///
/// Invariants for consumers:
/// - Events are emitted in source order.
/// - `Chunk` may appear zero or more times.
/// - `Complete` appears exactly once on success and is the last event.
/// - An `Err` item is terminal; nothing follows it.
pub trait BackendEventStream:
    Stream<Item = Result<BackendStreamEvent, ProviderError>> + Send
{
}

impl<T> BackendEventStream for T where
    T: Stream<Item = Result<BackendStreamEvent, ProviderError>> + Send
{
}

pub type BoxedBackendStream<'a> = Pin<Box<dyn BackendEventStream + 'a>>;

#[derive(Debug)]
pub struct VecBackendStream {
    events: VecDeque<Result<BackendStreamEvent, ProviderError>>,
}

impl VecBackendStream {
    pub fn new(events: Vec<Result<BackendStreamEvent, ProviderError>>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl Stream for VecBackendStream {
    type Item = Result<BackendStreamEvent, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<BackendStreamEvent, ProviderError>>> {
        Poll::Ready(self.events.pop_front())
    }
}

/// Folds streamed parts into one consolidated part list, merging adjacent text parts.
#[derive(Debug, Default, Clone)]
pub struct PartAccumulator {
    parts: Vec<Part>,
}

impl PartAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: Part) {
        if let Part::Text(incoming) = &part
            && let Some(Part::Text(existing)) = self.parts.last_mut()
        {
            existing.push_str(incoming);
            return;
        }

        self.parts.push(part);
    }

    pub fn extend(&mut self, parts: impl IntoIterator<Item = Part>) {
        for part in parts {
            self.push(part);
        }
    }

    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }
}
