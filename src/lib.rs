//! Interactive terminal wizard that drafts a resume from career notes and an
//! optional source document via the Gemini API.
//!
//! The wizard runs a fixed flow: welcome, source-path entry, multi-line note
//! entry, confirmation, generation, then a success or error screen. A pure
//! state machine ([`session`]) consumes events and emits commands; the
//! dispatcher ([`runtime`]) executes them on worker threads and feeds their
//! results back as events.
//!
//! Environment:
//! - `GEMINI_API_KEY` (required unless mocking): Gemini API credential.
//! - `GEMINI_MODEL` (optional): model override, default `gemini-2.0-flash`.
//! - `GEMINI_BASE_URL` (optional): endpoint override for proxies and tests.
//! - `RESUME_WIZARD_MOCK=1` (optional): deterministic offline backend.
//! - `RESUME_WIZARD_LOG` (optional): file to write logs to; the terminal is
//!   never used for log output.

pub mod classify;
pub mod files;
pub mod flags;
pub mod model;
pub mod observability;
pub mod output;
pub mod prompt;
pub mod recovery;
pub mod runtime;
pub mod session;
pub mod tui;
