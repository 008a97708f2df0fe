use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use reqwest::Client;

use crate::config::{generate_content_url, GeminiConfig};
use crate::error::{parse_error_message, GeminiApiError};
use crate::payload::GenerateContentRequest;
use crate::response::GenerateResponse;

/// Optional cancellation signal shared between the wizard session and an
/// in-flight request.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiApiError> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiApiError::MissingApiKey);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(GeminiApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        generate_content_url(&self.config.base_url, &self.config.model)
    }

    /// Issues one `generateContent` call.
    ///
    /// Cancellation is polled while awaiting the transport; a raised signal
    /// resolves to [`GeminiApiError::Cancelled`] without waiting for the
    /// request to finish. There is no retry on any failure path.
    pub async fn generate(
        &self,
        request: &GenerateContentRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<GenerateResponse, GeminiApiError> {
        if is_cancelled(cancellation) {
            return Err(GeminiApiError::Cancelled);
        }

        let pending = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send();
        let response = await_or_cancel(pending, cancellation)
            .await?
            .map_err(GeminiApiError::from)?;

        let status = response.status();
        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .map_err(GeminiApiError::from)?;

        if !status.is_success() {
            return Err(GeminiApiError::Status(
                status,
                parse_error_message(status, &body),
            ));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        if parsed.candidates.is_empty() {
            if let Some(reason) = parsed.block_reason() {
                return Err(GeminiApiError::Blocked {
                    reason: reason.to_string(),
                });
            }
            return Err(GeminiApiError::EmptyResponse);
        }

        Ok(parsed)
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, GeminiApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(GeminiApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(GeminiApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
