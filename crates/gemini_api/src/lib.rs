//! Transport-only Gemini API client primitives.
//!
//! This crate owns request building and response parsing for the Google
//! Generative Language `generateContent` endpoint only. It intentionally
//! contains no credential discovery and no wizard/UI coupling; callers pass
//! a fully populated [`GeminiConfig`].
//!
//! Requests are single-shot. There is no automatic retry: every failure is
//! surfaced to the caller, which decides whether the run is recoverable
//! (truncated output carries [`FinishReason::MaxTokens`] alongside whatever
//! candidate text was produced before the cutoff).

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod response;

pub use client::{CancellationSignal, GeminiClient};
pub use config::GeminiConfig;
pub use error::GeminiApiError;
pub use payload::{Content, GenerateContentRequest, GenerationConfig, Part};
pub use response::{FinishReason, GenerateResponse};
