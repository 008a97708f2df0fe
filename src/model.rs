//! Generation backend seam and its two implementations.
//!
//! The dispatcher talks to the remote service through [`GenerationBackend`]
//! so the wizard can run against a deterministic mock in tests and demos.
//! Backend selection happens once at startup from the environment.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gemini_api::{
    CancellationSignal, FinishReason, GeminiApiError, GeminiClient, GeminiConfig,
    GenerateContentRequest, GenerationConfig,
};

/// Shared flag raised to abort in-flight work.
pub type CancelSignal = Arc<AtomicBool>;

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_ENV_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_ENV_VAR: &str = "GEMINI_BASE_URL";
pub const MOCK_ENV_VAR: &str = "RESUME_WIZARD_MOCK";

const MAX_OUTPUT_TOKENS: u32 = 8192;

/// One generation request, already assembled into a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
}

/// What came back from one generation call: how the model finished, and the
/// attempt to extract usable text from it. Extraction can fail independently
/// of the finish reason, so both are carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub finish_reason: FinishReason,
    pub extraction: Result<String, String>,
}

/// A resume generation service. Implementations block until the call
/// completes, checking `cancel` while they wait.
pub trait GenerationBackend: Send + Sync + 'static {
    fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancelSignal,
    ) -> Result<GenerationOutcome, String>;
}

/// Deterministic offline backend, selected with `RESUME_WIZARD_MOCK=1`.
pub struct MockBackend {
    delay: Duration,
}

impl MockBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(150))
    }
}

const MOCK_RESUME: &str = "\
# Jordan Example

jordan@example.com | Example City

## Summary

Software engineer with eight years of experience building reliable backend
services and the tooling around them.

## Experience

### Senior Software Engineer, Example Corp (2020 - present)

- Led the rewrite of the billing pipeline, cutting settlement latency in half.
- Mentored four engineers through promotion to senior roles.

### Software Engineer, Sample Systems (2016 - 2020)

- Built the internal deployment platform used by every product team.

## Skills

Rust, Go, PostgreSQL, Kubernetes
";

impl GenerationBackend for MockBackend {
    fn generate(
        &self,
        _request: &GenerationRequest,
        cancel: &CancelSignal,
    ) -> Result<GenerationOutcome, String> {
        // Sleep in short slices so cancellation stays responsive.
        let slice = Duration::from_millis(10);
        let mut remaining = self.delay;
        while !remaining.is_zero() {
            if cancel.load(std::sync::atomic::Ordering::Relaxed) {
                return Err("request was cancelled".to_string());
            }
            let step = remaining.min(slice);
            thread::sleep(step);
            remaining -= step;
        }

        Ok(GenerationOutcome {
            finish_reason: FinishReason::Stop,
            extraction: Ok(MOCK_RESUME.to_string()),
        })
    }
}

/// Backend that calls the Gemini `generateContent` endpoint.
pub struct GeminiBackend {
    client: GeminiClient,
}

impl GeminiBackend {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

impl GenerationBackend for GeminiBackend {
    fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancelSignal,
    ) -> Result<GenerationOutcome, String> {
        // The wizard makes one call at a time from a worker thread, so a
        // throwaway current-thread runtime per call is the simplest bridge
        // to the async client.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| format!("failed to initialize async runtime: {error}"))?;

        let wire_request = GenerateContentRequest::from_prompt(request.prompt.clone())
            .with_generation_config(GenerationConfig {
                max_output_tokens: Some(MAX_OUTPUT_TOKENS),
                temperature: None,
            });

        let signal: CancellationSignal = Arc::clone(cancel);
        let response = runtime
            .block_on(self.client.generate(&wire_request, Some(&signal)))
            .map_err(|error: GeminiApiError| error.to_string())?;

        let finish_reason = response.finish_reason();
        let extraction = response
            .primary_text()
            .ok_or_else(|| "response contained no readable text".to_string());

        Ok(GenerationOutcome {
            finish_reason,
            extraction,
        })
    }
}

fn trimmed_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Whether a usable credential (or the mock escape hatch) is present. Only
/// presence is checked here; the key is validated by the first remote call.
pub fn api_key_from_env() -> Option<String> {
    trimmed_env(API_KEY_ENV_VAR)
}

pub fn mock_mode_from_env() -> bool {
    matches!(
        trimmed_env(MOCK_ENV_VAR).as_deref(),
        Some("1") | Some("true")
    )
}

/// Builds the backend the dispatcher will use, honoring the mock escape
/// hatch and the model and base-URL overrides.
pub fn backend_from_env() -> Result<Arc<dyn GenerationBackend>, String> {
    if mock_mode_from_env() {
        return Ok(Arc::new(MockBackend::default()));
    }

    let api_key = api_key_from_env()
        .ok_or_else(|| format!("authentication error: {API_KEY_ENV_VAR} is not set or empty"))?;

    let mut config = GeminiConfig::new(api_key);
    if let Some(model) = trimmed_env(MODEL_ENV_VAR) {
        config = config.with_model(model);
    }
    if let Some(base_url) = trimmed_env(BASE_URL_ENV_VAR) {
        config = config.with_base_url(base_url);
    }

    let client = GeminiClient::new(config)
        .map_err(|error| format!("failed to initialize generation client: {error}"))?;

    Ok(Arc::new(GeminiBackend::new(client)))
}
