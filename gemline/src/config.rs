//! Process configuration for a gemline runtime.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use gemline::GemlineConfig;
//!
//! let config = GemlineConfig::default()
//!     .with_gemini_api_key("AIza-test")
//!     .with_http_timeout(Duration::from_secs(30));
//! assert!(config.gemini_key_configured());
//! assert!(!config.image_key_configured());
//! ```

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use gchat::{ChatPolicy, Preamble};
use gprovider::{SecretString, StaticFallbackList};

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const PROMPT_FILE_ENV: &str = "GEMLINE_PROMPT_FILE";
pub const FALLBACK_MODELS_ENV: &str = "GEMLINE_FALLBACK_MODELS";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    PromptFile,
    HttpClient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn prompt_file(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::PromptFile, message)
    }

    pub fn http_client(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::HttpClient, message)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct GemlineConfig {
    pub gemini_api_key: Option<SecretString>,
    /// Enables the image-generation tool when present.
    pub image_api_key: Option<SecretString>,
    pub prompt_file: Option<PathBuf>,
    pub fallback: StaticFallbackList,
    pub http_timeout: Duration,
    pub policy: ChatPolicy,
}

impl Default for GemlineConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            image_api_key: None,
            prompt_file: None,
            fallback: StaticFallbackList::default(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            policy: ChatPolicy::default(),
        }
    }
}

impl GemlineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            gemini_api_key: read(GEMINI_API_KEY_ENV).map(SecretString::new),
            image_api_key: read(OPENAI_API_KEY_ENV).map(SecretString::new),
            prompt_file: read(PROMPT_FILE_ENV).map(PathBuf::from),
            fallback: read(FALLBACK_MODELS_ENV)
                .as_deref()
                .and_then(StaticFallbackList::parse)
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn with_gemini_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(SecretString::new(api_key));
        self
    }

    pub fn with_image_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.image_api_key = Some(SecretString::new(api_key));
        self
    }

    pub fn with_prompt_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_file = Some(path.into());
        self
    }

    pub fn with_fallback(mut self, fallback: StaticFallbackList) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }

    pub fn with_policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn gemini_key_configured(&self) -> bool {
        self.gemini_api_key
            .as_ref()
            .is_some_and(|key| !key.is_empty())
    }

    pub fn image_key_configured(&self) -> bool {
        self.image_api_key
            .as_ref()
            .is_some_and(|key| !key.is_empty())
    }

    /// Reads the standing instructions. A missing file yields an empty preamble.
    pub fn load_preamble(&self) -> Result<Preamble, ConfigError> {
        match self.prompt_file.as_deref() {
            None => Ok(Preamble::empty()),
            Some(path) => read_preamble(path),
        }
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|err| ConfigError::http_client(err.to_string()))
    }
}

fn read_preamble(path: &Path) -> Result<Preamble, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Preamble::new(text.trim())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "prompt file not found; running without instructions");
            Ok(Preamble::empty())
        }
        Err(err) => Err(ConfigError::prompt_file(format!(
            "failed to read {}: {err}",
            path.display()
        ))),
    }
}
