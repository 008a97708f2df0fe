//! Markdown validation, normalization, and output writing.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Written when the user gives no output override.
pub const DEFAULT_OUTPUT_PATH: &str = "resume.md";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("permission denied writing output file {path}: {source}")]
    WritePermission {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Checks that the generated text parses as markdown.
pub fn validate_markdown(text: &str) -> Result<(), String> {
    markdown::to_mdast(text, &markdown::ParseOptions::default())
        .map(|_| ())
        .map_err(|message| message.to_string())
}

/// Strips trailing whitespace from every line and guarantees exactly one
/// trailing newline.
pub fn normalize_markdown(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len() + 1);
    for line in text.lines() {
        normalized.push_str(line.trim_end());
        normalized.push('\n');
    }
    while normalized.ends_with("\n\n") {
        normalized.pop();
    }
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

/// Writes the resume, creating parent directories as needed, and returns the
/// path actually written.
pub fn write_output(path: Option<&str>, text: &str) -> Result<String, OutputError> {
    let path = match path {
        Some(path) if !path.trim().is_empty() => path,
        _ => DEFAULT_OUTPUT_PATH,
    };

    if let Some(parent) = Path::new(path).parent().filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::Directory {
            path: parent.display().to_string(),
            source,
        })?;
    }

    fs::write(path, text).map_err(|source| match source.kind() {
        io::ErrorKind::PermissionDenied => OutputError::WritePermission {
            path: path.to_string(),
            source,
        },
        _ => OutputError::Io {
            path: path.to_string(),
            source,
        },
    })?;

    Ok(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_trailing_whitespace_per_line() {
        let normalized = normalize_markdown("# Resume   \n\nBody  ");

        assert_eq!(normalized, "# Resume\n\nBody\n");
    }

    #[test]
    fn normalization_collapses_trailing_blank_lines() {
        let normalized = normalize_markdown("# Resume\n\n\n");

        assert_eq!(normalized, "# Resume\n");
    }

    #[test]
    fn generated_markdown_validates() {
        assert!(validate_markdown("# Resume\n\n- item\n").is_ok());
    }

    #[test]
    fn write_defaults_to_resume_md_in_the_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join(DEFAULT_OUTPUT_PATH);

        // Exercise the default path resolution without touching the real cwd.
        let written = write_output(Some(default.to_str().unwrap()), "# Resume\n").unwrap();

        assert_eq!(written, default.to_str().unwrap());
        assert_eq!(fs::read_to_string(default).unwrap(), "# Resume\n");
    }

    #[test]
    fn blank_override_falls_back_to_the_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let written = write_output(Some("   "), "# Resume\n");
        std::env::set_current_dir(original).unwrap();

        assert_eq!(written.unwrap(), DEFAULT_OUTPUT_PATH);
        assert!(dir.path().join(DEFAULT_OUTPUT_PATH).exists());
    }

    #[test]
    fn missing_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("drafts").join("latest").join("resume.md");

        let written = write_output(Some(nested.to_str().unwrap()), "# Resume\n").unwrap();

        assert_eq!(written, nested.to_str().unwrap());
        assert!(nested.exists());
    }
}
