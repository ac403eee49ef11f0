use std::sync::Arc;

use gemline::{GemlineConfig, GemlineRuntime};

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<GemlineRuntime>,
    pub gemini_key_configured: bool,
    pub image_key_configured: bool,
}

impl AppState {
    pub fn new(runtime: GemlineRuntime, config: &GemlineConfig) -> Self {
        Self {
            image_key_configured: runtime.images.is_some(),
            runtime: Arc::new(runtime),
            gemini_key_configured: config.gemini_key_configured(),
        }
    }
}
