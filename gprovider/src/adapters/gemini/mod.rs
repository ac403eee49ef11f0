mod backend;
mod serde_api;
mod tests;
mod transport;

pub use backend::GeminiBackend;
pub use transport::{GeminiChunkStream, GeminiHttpTransport, GeminiTransport};
