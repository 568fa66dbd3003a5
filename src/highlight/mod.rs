//! # Highlighter Capability
//!
//! Tokenizing source text is not codepress's job. A [`Highlighter`] turns
//! raw text into markup (`<span class="...">` around tokens) and the marker
//! encoder takes it from there. [`SyntectHighlighter`] is the default;
//! [`PlainHighlighter`] escapes the text and adds no classes.

use std::path::Path;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("highlighter failed on line {line}: {message}")]
    Tokenize { line: usize, message: String },
    #[error("{0}")]
    Other(String),
}

/// Produces highlighter markup for a file's text.
///
/// `file_name` is a hint for choosing a lexer; implementations fall back to
/// content sniffing or plain text when it doesn't help. Must be shareable
/// across the worker threads that prepare blocks.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, text: &str, file_name: &str) -> Result<String, HighlightError>;
}

/// Escape text for inclusion in markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// No tokenizing: the text, escaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, text: &str, _file_name: &str) -> Result<String, HighlightError> {
        Ok(escape_markup(text))
    }
}

/// Classed-HTML highlighting with syntect's bundled syntaxes.
///
/// Lexer selection: the file extension, then the first line (shebangs,
/// modelines), then plain text.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn syntax_for(&self, file_name: &str, text: &str) -> &SyntaxReference {
        let by_extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.syntaxes.find_syntax_by_extension(ext));
        by_extension
            .or_else(|| {
                let first_line = text.lines().next().unwrap_or("");
                self.syntaxes.find_syntax_by_first_line(first_line)
            })
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, text: &str, file_name: &str) -> Result<String, HighlightError> {
        let syntax = self.syntax_for(file_name, text);
        tracing::trace!(target: "highlight", file = file_name, syntax = %syntax.name, "syntax_selected");

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        let owned;
        let text: &str = if text.ends_with('\n') || text.is_empty() {
            text
        } else {
            owned = format!("{}\n", text);
            &owned
        };
        for (idx, line) in LinesWithEndings::from(text).enumerate() {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| HighlightError::Tokenize {
                    line: idx + 1,
                    message: e.to_string(),
                })?;
        }
        Ok(generator.finalize())
    }
}
