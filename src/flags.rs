//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

/// Interactive terminal wizard that drafts a resume from career notes and an
/// optional source document.
#[derive(Debug, Parser)]
#[command(name = "resume_wizard", version)]
pub struct Flags {
    /// Path to an existing resume or notes document to seed the draft.
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Where to write the generated resume (defaults to resume.md).
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl Flags {
    pub fn source_path(&self) -> Option<String> {
        self.source
            .as_ref()
            .map(|path| path.display().to_string())
    }

    pub fn output_path(&self) -> Option<String> {
        self.output
            .as_ref()
            .map(|path| path.display().to_string())
    }
}
