//! Source-document reading with size and type guards.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::session::SourceRead;

/// Hard cap on source document size.
pub const MAX_SOURCE_FILE_BYTES: u64 = 10 * 1024 * 1024;

const EXPECTED_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

#[derive(Debug, Error)]
pub enum FileReadError {
    #[error("source file does not exist: {0}")]
    NotFound(String),
    #[error("source path is not a regular file: {0}")]
    NotRegular(String),
    #[error("source file exceeds maximum size of 10MB: {0}")]
    TooLarge(String),
    #[error("permission denied reading source file: {0}")]
    PermissionDenied(String),
    #[error("failed to read source file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Reads a source document, enforcing the size cap and attaching a warning
/// for unexpected file extensions. The warning never blocks the read.
pub fn read_source(path: &str) -> Result<SourceRead, FileReadError> {
    let metadata = fs::metadata(path).map_err(|error| read_error(path, error))?;

    if !metadata.is_file() {
        return Err(FileReadError::NotRegular(path.to_string()));
    }
    if metadata.len() > MAX_SOURCE_FILE_BYTES {
        return Err(FileReadError::TooLarge(path.to_string()));
    }

    let content = fs::read_to_string(path).map_err(|error| read_error(path, error))?;

    Ok(SourceRead {
        content,
        warning: extension_warning(Path::new(path)),
    })
}

fn read_error(path: &str, error: io::Error) -> FileReadError {
    match error.kind() {
        io::ErrorKind::NotFound => FileReadError::NotFound(path.to_string()),
        io::ErrorKind::PermissionDenied => FileReadError::PermissionDenied(path.to_string()),
        _ => FileReadError::Io {
            path: path.to_string(),
            source: error,
        },
    }
}

fn extension_warning(path: &Path) -> Option<String> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some(extension) if EXPECTED_EXTENSIONS.contains(&extension) => None,
        Some(extension) => Some(format!(
            "unusual source extension '.{extension}'; expected .txt, .md, or .markdown"
        )),
        None => Some("source file has no extension; expected .txt, .md, or .markdown".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;

    #[test]
    fn reads_content_from_an_expected_extension_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# Notes\n").unwrap();

        let read = read_source(path.to_str().unwrap()).unwrap();

        assert_eq!(read.content, "# Notes\n");
        assert!(read.warning.is_none());
    }

    #[test]
    fn unexpected_extension_reads_but_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        fs::write(&path, "not really a pdf").unwrap();

        let read = read_source(path.to_str().unwrap()).unwrap();

        assert_eq!(read.content, "not really a pdf");
        let warning = read.warning.unwrap();
        assert!(warning.contains(".pdf"));
    }

    #[test]
    fn missing_extension_reads_but_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes");
        fs::write(&path, "plain").unwrap();

        let read = read_source(path.to_str().unwrap()).unwrap();

        assert!(read.warning.is_some());
    }

    #[test]
    fn missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.md");

        let error = read_source(path.to_str().unwrap()).unwrap_err();

        assert!(matches!(error, FileReadError::NotFound(_)));
        assert!(error.to_string().contains("does not exist"));
    }

    #[test]
    fn directory_reports_not_regular() {
        let dir = tempfile::tempdir().unwrap();

        let error = read_source(dir.path().to_str().unwrap()).unwrap_err();

        assert!(matches!(error, FileReadError::NotRegular(_)));
    }

    #[test]
    fn oversized_file_reports_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.md");
        let file = File::create(&path).unwrap();
        file.set_len(MAX_SOURCE_FILE_BYTES + 1).unwrap();

        let error = read_source(path.to_str().unwrap()).unwrap_err();

        assert!(matches!(error, FileReadError::TooLarge(_)));
        assert!(error.to_string().contains("exceeds maximum size"));
    }
}
