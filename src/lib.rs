//! # codepress
//!
//! A page-native code printer.
//!
//! Source files are highlighted by an external lexer, reduced to colored
//! runs, and poured into fixed-size pages. Each code panel is a cursor over
//! its remaining lines: a page takes what fits, the rest moves on to the
//! next page, and no line is ever measured or drawn twice.
//!
//! ## Architecture
//!
//! ```text
//! (path, bytes)
//!       ↓
//!   [source]     — Walk directories, decode bytes to text
//!       ↓
//!   [highlight]  — External lexer → markup
//!       ↓
//!   [markup]     — Markup → colored runs per line
//!       ↓
//!   [layout]     — Chunks → flows → page slices → draw commands
//!       ↓         (uses [render] to draw each slice)
//!   [pdf]        — Serialize to PDF bytes
//! ```
//!
//! Everything geometric or visual comes from one [`RenderConfig`].

pub mod config;
pub mod error;
pub mod font;
pub mod highlight;
pub mod layout;
pub mod markup;
pub mod model;
pub mod pdf;
pub mod render;
pub mod source;
pub mod style;

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::Deserialize;

pub use config::RenderConfig;
pub use error::{BlockError, CodepressError};
pub use highlight::{Highlighter, PlainHighlighter, SyntectHighlighter};
pub use layout::{BlockReport, Document};
pub use source::SourceFile;

use layout::{prepare_blocks, LayoutEngine};
use model::Metadata;
use pdf::PdfWriter;

/// A finished render: the PDF and the layout it was written from.
#[derive(Debug)]
pub struct Rendered {
    pub pdf: Vec<u8>,
    pub document: Document,
}

/// Highlight and lay out `files` without writing a PDF.
///
/// Fails only on an invalid configuration or an empty file list; problems
/// with individual files are reported in [`Document::blocks`].
pub fn layout(
    files: &[SourceFile],
    highlighter: &dyn Highlighter,
    config: &RenderConfig,
) -> Result<Document, CodepressError> {
    config.validate()?;
    if files.is_empty() {
        return Err(CodepressError::NoSources);
    }
    let blocks = prepare_blocks(files, highlighter, config);
    Ok(LayoutEngine::new(config).layout(blocks))
}

/// Render `files` to PDF bytes.
///
/// This is the primary entry point.
pub fn render(
    files: &[SourceFile],
    highlighter: &dyn Highlighter,
    config: &RenderConfig,
) -> Result<Rendered, CodepressError> {
    let document = layout(files, highlighter, config)?;
    let metadata = Metadata {
        title: config.title.clone(),
        ..Default::default()
    };
    let pdf = PdfWriter::new().write(&document.pages, &metadata);
    tracing::info!(
        target: "pdf",
        pages = document.page_count(),
        bytes = pdf.len(),
        failed_blocks = document.failed_blocks().count(),
        "render_complete"
    );
    Ok(Rendered { pdf, document })
}

/// A render described as JSON: in-memory files plus optional configuration.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub files: Vec<RequestFile>,
    #[serde(default)]
    pub config: RenderConfig,
}

#[derive(Debug, Deserialize)]
pub struct RequestFile {
    pub path: String,
    pub content: String,
}

/// Render a JSON [`RenderRequest`] to PDF bytes with the default
/// highlighter.
pub fn render_json(json: &str) -> Result<Vec<u8>, CodepressError> {
    let request: RenderRequest = serde_json::from_str(json)?;
    let files: Vec<SourceFile> = request
        .files
        .into_iter()
        .map(|f| SourceFile::new(f.path, f.content))
        .collect();
    let highlighter = SyntectHighlighter::new();
    Ok(render(&files, &highlighter, &request.config)?.pdf)
}
