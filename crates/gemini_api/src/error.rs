use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum GeminiApiError {
    MissingApiKey,
    Request(reqwest::Error),
    Status(StatusCode, String),
    Serde(JsonError),
    Blocked { reason: String },
    EmptyResponse,
    Cancelled,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    /// gRPC-style status token, for example `UNAUTHENTICATED` or
    /// `RESOURCE_EXHAUSTED`. Preserved in surfaced messages because the
    /// wizard's presentation-time classifier keys on these tokens.
    pub status: Option<String>,
}

impl fmt::Display for GeminiApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "authentication error: API key is required"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Serde(error) => write!(f, "response parse error: {error}"),
            Self::Blocked { reason } => {
                write!(f, "prompt blocked by safety filters ({reason})")
            }
            Self::EmptyResponse => write!(f, "response contained no candidates"),
            Self::Cancelled => write!(f, "request was cancelled"),
        }
    }
}

impl std::error::Error for GeminiApiError {}

impl From<reqwest::Error> for GeminiApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for GeminiApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Extracts a human-readable message from a failed response body.
///
/// Google error bodies look like `{"error":{"code":400,"message":"...",
/// "status":"INVALID_ARGUMENT"}}`. The status token is prepended when
/// present so downstream classification can match on it.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.to_string()
        }
    };

    let parsed = match serde_json::from_str::<ErrorPayload>(body) {
        Ok(payload) => payload,
        Err(_) => return fallback(),
    };

    let Some(fields) = parsed.value else {
        return fallback();
    };

    let message = fields
        .message
        .as_deref()
        .filter(|value| !value.is_empty());
    let token = fields
        .status
        .as_deref()
        .filter(|value| !value.is_empty());

    match (token, message) {
        (Some(token), Some(message)) => format!("{token}: {message}"),
        (Some(token), None) => token.to_string(),
        (None, Some(message)) => message.to_string(),
        (None, None) => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_message_prepends_status_token() {
        let body = r#"{"error":{"code":401,"message":"API key not valid.","status":"UNAUTHENTICATED"}}"#;
        assert_eq!(
            parse_error_message(StatusCode::UNAUTHORIZED, body),
            "UNAUTHENTICATED: API key not valid."
        );
    }

    #[test]
    fn parse_error_message_uses_body_when_not_json() {
        assert_eq!(
            parse_error_message(StatusCode::BAD_GATEWAY, "upstream unavailable"),
            "upstream unavailable"
        );
    }

    #[test]
    fn parse_error_message_falls_back_to_canonical_reason() {
        assert_eq!(
            parse_error_message(StatusCode::TOO_MANY_REQUESTS, ""),
            "Too Many Requests"
        );
    }

    #[test]
    fn parse_error_message_handles_token_only_payload() {
        let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            parse_error_message(StatusCode::TOO_MANY_REQUESTS, body),
            "RESOURCE_EXHAUSTED"
        );
    }

    #[test]
    fn display_formats_are_stable() {
        assert_eq!(
            GeminiApiError::MissingApiKey.to_string(),
            "authentication error: API key is required"
        );
        assert_eq!(
            GeminiApiError::Blocked {
                reason: "SAFETY".to_string()
            }
            .to_string(),
            "prompt blocked by safety filters (SAFETY)"
        );
        assert_eq!(
            GeminiApiError::Cancelled.to_string(),
            "request was cancelled"
        );
    }
}
