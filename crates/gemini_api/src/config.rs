use std::time::Duration;

/// Default base URL for Generative Language API requests.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used when the caller does not select one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Transport configuration for Gemini API requests.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key carried in the `x-goog-api-key` request header.
    pub api_key: String,
    /// Base URL for Generative Language endpoints.
    pub base_url: String,
    /// Model identifier used to build the `generateContent` endpoint path.
    pub model: String,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Builds the `generateContent` endpoint for a base URL and model.
///
/// An empty or blank base URL falls back to [`DEFAULT_BASE_URL`]; trailing
/// slashes are stripped before the model path is appended.
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    let base = if base_url.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        base_url.trim()
    };

    let trimmed = base.trim_end_matches('/');
    format!("{trimmed}/models/{model}:generateContent")
}
