//! Maps raw error strings to user-facing categories with remediation hints.
//!
//! Classification happens at presentation time, on the session's stored
//! error message. Matching is case-insensitive substring search in a fixed
//! priority order; the first matching rule wins, so a message mentioning
//! both a quota and a network problem reports the quota.

/// User-facing error categories, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    Quota,
    Network,
    SafetyFilter,
    Truncation,
    FileNotFound,
    FileSize,
    FilePermission,
    WritePermission,
    Directory,
    Generic,
}

impl ErrorCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Auth => "Authentication problem",
            ErrorCategory::Quota => "Quota or rate limit reached",
            ErrorCategory::Network => "Network problem",
            ErrorCategory::SafetyFilter => "Blocked by safety filters",
            ErrorCategory::Truncation => "Output was truncated",
            ErrorCategory::FileNotFound => "Source file not found",
            ErrorCategory::FileSize => "Source file too large",
            ErrorCategory::FilePermission => "Cannot read the source file",
            ErrorCategory::WritePermission => "Cannot write the output file",
            ErrorCategory::Directory => "Output directory problem",
            ErrorCategory::Generic => "Unexpected error",
        }
    }
}

/// A classified error: category, exactly three hints, optional doc link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: ErrorCategory,
    pub hints: [&'static str; 3],
    pub doc_ref: Option<&'static str>,
}

const AUTH: Classification = Classification {
    category: ErrorCategory::Auth,
    hints: [
        "Check that the GEMINI_API_KEY environment variable is set",
        "Verify the key is still active in Google AI Studio",
        "Make sure the key was copied completely, without quotes or whitespace",
    ],
    doc_ref: Some("https://ai.google.dev/gemini-api/docs/api-key"),
};

const QUOTA: Classification = Classification {
    category: ErrorCategory::Quota,
    hints: [
        "Wait a minute and try again",
        "Check your usage and quota in Google AI Studio",
        "Consider a key from a different project or account",
    ],
    doc_ref: Some("https://ai.google.dev/gemini-api/docs/rate-limits"),
};

const NETWORK: Classification = Classification {
    category: ErrorCategory::Network,
    hints: [
        "Check your internet connection",
        "Verify that generativelanguage.googleapis.com is reachable",
        "Disable any proxy or VPN and try again",
    ],
    doc_ref: None,
};

const SAFETY_FILTER: Classification = Classification {
    category: ErrorCategory::SafetyFilter,
    hints: [
        "The service flagged the content as potentially sensitive",
        "Review the source document and notes for flagged material",
        "Rephrase the affected sections and try again",
    ],
    doc_ref: Some("https://ai.google.dev/gemini-api/docs/safety-settings"),
};

const TRUNCATION: Classification = Classification {
    category: ErrorCategory::Truncation,
    hints: [
        "The generated output hit the maximum length",
        "Simplify or split the career notes and try again",
        "Any partial output written to disk is still usable",
    ],
    doc_ref: None,
};

const FILE_NOT_FOUND: Classification = Classification {
    category: ErrorCategory::FileNotFound,
    hints: [
        "Verify the path is spelled correctly",
        "Verify the file exists at that location",
        "Use an absolute path if the file lives outside the working directory",
    ],
    doc_ref: None,
};

const FILE_SIZE: Classification = Classification {
    category: ErrorCategory::FileSize,
    hints: [
        "The source file exceeds the 10MB size cap",
        "Split the document into smaller parts",
        "Remove embedded content to reduce the size",
    ],
    doc_ref: None,
};

const FILE_PERMISSION: Classification = Classification {
    category: ErrorCategory::FilePermission,
    hints: [
        "Permission was denied while reading the file",
        "Check the file's read permissions",
        "Check the privileges of the account running the wizard",
    ],
    doc_ref: None,
};

const WRITE_PERMISSION: Classification = Classification {
    category: ErrorCategory::WritePermission,
    hints: [
        "Permission was denied while writing the output",
        "Choose a different output location with --output",
        "Check the write permissions on the target directory",
    ],
    doc_ref: None,
};

const DIRECTORY: Classification = Classification {
    category: ErrorCategory::Directory,
    hints: [
        "The output directory could not be created",
        "Verify the parent directory exists and is writable",
        "Try a different output location with --output",
    ],
    doc_ref: None,
};

const GENERIC: Classification = Classification {
    category: ErrorCategory::Generic,
    hints: [
        "Try the operation again",
        "Check the log file for details if logging is enabled",
        "Restart the wizard if the problem persists",
    ],
    doc_ref: None,
};

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Classifies a raw error message. Never fails; unmatched messages fall
/// through to [`ErrorCategory::Generic`].
pub fn classify(raw_message: &str) -> Classification {
    let haystack = raw_message.to_lowercase();

    if contains_any(
        &haystack,
        &[
            "authentication error",
            "unauthenticated",
            "api key not valid",
            "invalid api key",
            "api_key_invalid",
        ],
    ) {
        return AUTH;
    }
    if contains_any(
        &haystack,
        &[
            "resource_exhausted",
            "resource exhausted",
            "quota",
            "rate limit",
            "rate_limit",
            "too many requests",
        ],
    ) {
        return QUOTA;
    }
    if contains_any(
        &haystack,
        &[
            "network",
            "deadline",
            "connection",
            "timed out",
            "timeout",
            "dns",
            "unreachable",
        ],
    ) {
        return NETWORK;
    }
    if contains_any(&haystack, &["safety", "blocked", "harm category"]) {
        return SAFETY_FILTER;
    }
    if contains_any(
        &haystack,
        &["maximum output length", "max_tokens", "truncat"],
    ) {
        return TRUNCATION;
    }
    if contains_any(&haystack, &["does not exist", "no such file"]) {
        return FILE_NOT_FOUND;
    }
    if contains_any(&haystack, &["exceeds maximum size", "too large"]) {
        return FILE_SIZE;
    }
    // Read-side permission problems; write and directory failures carry
    // their own phrasing and are matched below.
    if contains_any(&haystack, &["permission", "access denied"])
        && !haystack.contains("writ")
        && !haystack.contains("director")
    {
        return FILE_PERMISSION;
    }
    if contains_any(
        &haystack,
        &["permission", "failed to write", "read-only file system"],
    ) {
        return WRITE_PERMISSION;
    }
    if haystack.contains("director") {
        return DIRECTORY;
    }

    GENERIC
}
