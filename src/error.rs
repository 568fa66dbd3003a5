//! Structured error types for codepress.
//!
//! Two levels of failure exist. [`CodepressError`] is returned by the public
//! API for problems that stop a render before it starts: a configuration that
//! doesn't parse or validate, or a source root that can't be walked.
//! [`BlockError`] is per-file data: it is recorded on the content block and in
//! its report, and the rest of the document still renders.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// The unified error type returned by the public codepress API.
#[derive(Debug, Error)]
pub enum CodepressError {
    /// JSON input failed to parse as a valid configuration or render request.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// The configuration parsed but describes an impossible layout.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// A path could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Nothing to render.
    #[error("No source files to render")]
    NoSources,
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for CodepressError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        CodepressError::ParseError { source: e, hint }
    }
}

/// A failure confined to one source file.
///
/// Every variant has a degraded-but-valid rendering. Only the fatal ones
/// (see [`BlockError::is_fatal`]) leave the block without a code panel.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum BlockError {
    /// The highlighter could not tokenize the file. The block is rendered
    /// as uncolored text.
    #[error("highlighting failed: {0}")]
    Highlight(String),
    /// The highlighter produced unbalanced or unparseable markup. The block
    /// is rendered as the markup's plain text.
    #[error("malformed highlighter markup: {0}")]
    MalformedMarkup(String),
    /// Even a fresh page has no room for a single line.
    #[error("page has no room for a single line of code")]
    ZeroCapacityPage,
    /// The file's bytes could not be read.
    #[error("{0}")]
    Unreadable(String),
}

impl BlockError {
    /// Fatal errors leave the block with nothing to draw but an error notice.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BlockError::Unreadable(_) | BlockError::ZeroCapacityPage)
    }
}
