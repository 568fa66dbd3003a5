//! # Document Model
//!
//! The input representation for layout: colored runs grouped into lines,
//! lines grouped into one [`ContentBlock`] per source file, plus the page
//! geometry and metadata types shared with configuration and the PDF writer.

use serde::{Deserialize, Serialize};

use crate::error::BlockError;
use crate::style::ColorTag;

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// Page size and margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page size. Defaults to Letter.
    pub size: PageSize,
    /// Page margins in points (1/72 inch).
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::Letter,
            margin: Edges::uniform(30.0),
        }
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    A3,
    A5,
    #[default]
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margins.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A contiguous piece of text drawn in a single color.
/// `tag: None` means the default text color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColoredRun {
    pub text: String,
    pub tag: Option<ColorTag>,
}

impl ColoredRun {
    pub fn new(text: impl Into<String>, tag: Option<ColorTag>) -> Self {
        Self {
            text: text.into(),
            tag,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }
}

/// One source line: an ordered sequence of runs, no embedded newline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Line {
    pub runs: Vec<ColoredRun>,
}

impl Line {
    pub fn new(runs: Vec<ColoredRun>) -> Self {
        Self { runs }
    }

    /// A single untagged run, or no runs for an empty string.
    pub fn plain(text: &str) -> Self {
        let mut line = Line::default();
        line.push(text, None);
        line
    }

    /// Append text, merging with the previous run when the tag matches.
    /// Empty text is ignored.
    pub fn push(&mut self, text: &str, tag: Option<ColorTag>) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.tag == tag => last.text.push_str(text),
            _ => self.runs.push(ColoredRun::new(text, tag)),
        }
    }

    /// The line's text with colors discarded.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Remove trailing whitespace, dropping runs that become empty.
    pub fn trim_end(&mut self) {
        while let Some(last) = self.runs.last_mut() {
            let trimmed_len = last.text.trim_end().len();
            last.text.truncate(trimmed_len);
            if last.text.is_empty() {
                self.runs.pop();
            } else {
                break;
            }
        }
    }
}

/// All highlighted lines of one source file.
#[derive(Debug, Clone, Serialize)]
pub struct ContentBlock {
    /// Human-readable label, normally the file's relative path.
    pub label: String,
    pub lines: Vec<Line>,
    /// Set when reading, highlighting or decoding the file failed.
    pub error: Option<BlockError>,
}

impl ContentBlock {
    pub fn new(label: impl Into<String>, lines: Vec<Line>) -> Self {
        Self {
            label: label.into(),
            lines,
            error: None,
        }
    }

    /// Uncolored lines of `text`, used when highlighting is unavailable.
    pub fn plain(label: impl Into<String>, text: &str) -> Self {
        Self::new(label, text.lines().map(Line::plain).collect())
    }

    /// Lines decoded from the textual marker encoding.
    pub fn from_marker_text(label: impl Into<String>, text: &str) -> Self {
        Self::new(label, crate::markup::decode(text))
    }

    /// A block with nothing to draw but its error.
    pub fn failed(label: impl Into<String>, error: BlockError) -> Self {
        Self {
            label: label.into(),
            lines: Vec::new(),
            error: Some(error),
        }
    }

    pub fn with_error(mut self, error: BlockError) -> Self {
        self.error = Some(error);
        self
    }

    /// Trim trailing whitespace from every line and drop trailing blank
    /// lines. With `drop_blank`, every blank line goes.
    pub fn normalize(&mut self, drop_blank: bool) {
        for line in &mut self.lines {
            line.trim_end();
        }
        if drop_blank {
            self.lines.retain(|line| !line.is_blank());
        }
        while self.lines.last().is_some_and(|l| l.runs.is_empty()) {
            self.lines.pop();
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// True when the block has a code panel to draw.
    pub fn is_renderable(&self) -> bool {
        !self.error.as_ref().is_some_and(BlockError::is_fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_merges_same_tag() {
        let mut line = Line::default();
        line.push("let", Some(ColorTag::Keyword));
        line.push(" ", None);
        line.push("x", None);
        line.push("", Some(ColorTag::Comment));
        assert_eq!(
            line.runs,
            vec![
                ColoredRun::new("let", Some(ColorTag::Keyword)),
                ColoredRun::plain(" x"),
            ]
        );
        assert_eq!(line.text(), "let x");
    }

    #[test]
    fn trim_end_crosses_runs() {
        let mut line = Line::new(vec![
            ColoredRun::new("x  ", Some(ColorTag::Name)),
            ColoredRun::plain("   "),
        ]);
        line.trim_end();
        assert_eq!(line.runs, vec![ColoredRun::new("x", Some(ColorTag::Name))]);
    }

    #[test]
    fn normalize_trims_trailing_blank_lines() {
        let mut block = ContentBlock::plain("a.py", "a\n\nb  \n\n\n");
        block.normalize(false);
        let texts: Vec<String> = block.lines.iter().map(Line::text).collect();
        assert_eq!(texts, vec!["a", "", "b"]);

        block.normalize(true);
        assert_eq!(block.line_count(), 2);
    }

    #[test]
    fn from_marker_text_decodes_runs() {
        let block = ContentBlock::from_marker_text("a.py", "\u{2588}kwdef\u{2588} f():\n    pass");
        assert_eq!(block.line_count(), 2);
        assert_eq!(
            block.lines[0].runs,
            vec![
                ColoredRun::new("def", Some(ColorTag::Keyword)),
                ColoredRun::plain(" f():"),
            ]
        );
        assert_eq!(block.lines[1].text(), "    pass");
    }

    #[test]
    fn page_sizes() {
        assert_eq!(PageSize::Letter.dimensions(), (612.0, 792.0));
        assert_eq!(
            PageSize::Custom {
                width: 100.0,
                height: 200.0
            }
            .dimensions(),
            (100.0, 200.0)
        );
    }
}
