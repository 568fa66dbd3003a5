//! # Layout Engine
//!
//! Turns content blocks into positioned draw commands on fixed-size pages.
//!
//! Each block is a heading, an optional notice, and its lines cut into
//! chunks of `chunkLines`. Every chunk becomes a [`CodeFlow`] that is
//! measured against whatever height the current page has left; when the
//! flow doesn't drain, the page is finished and the same flow continues on
//! the next one. The flow remembers what it already handed out, so nothing
//! is measured twice and no line appears on two pages.

pub mod budget;
pub mod flow;
pub mod page_break;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::RenderConfig;
use crate::error::BlockError;
use crate::font::FontContext;
use crate::highlight::Highlighter;
use crate::markup;
use crate::model::{ContentBlock, Line};
use crate::render::{render_slice, Canvas};
use crate::source::{decode_text, SourceFile};
use crate::style::Color;

use self::flow::CodeFlow;
use self::page_break::{decide_fixed_break, decide_heading_break, BreakDecision};

const HEADING_SPACE_BEFORE: f64 = 10.0;
const HEADING_SPACE_AFTER: f64 = 5.0;
const PANEL_SPACE_AFTER: f64 = 8.0;
const NOTE_SPACE_AFTER: f64 = 8.0;
const LINE_HEIGHT: f64 = 1.2;

const CONTINUED_NOTE: &str = "(continued on next page...)";

/// What to draw. Positions are in points from the page's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrawCommand {
    /// A filled rectangle; `y` is its top edge.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    /// A run of text in one font and color.
    Text {
        x: f64,
        baseline: f64,
        text: String,
        font: String,
        size: f64,
        color: Color,
    },
}

/// A fully laid-out page ready for PDF serialization.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

/// A [`Canvas`] that records draw commands.
#[derive(Debug, Default)]
pub struct PageCanvas {
    pub commands: Vec<DrawCommand>,
    fonts: FontContext,
}

impl PageCanvas {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for PageCanvas {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn draw_text(
        &mut self,
        x: f64,
        baseline: f64,
        text: &str,
        font: &str,
        size: f64,
        color: Color,
    ) {
        if text.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::Text {
            x,
            baseline,
            text: text.to_string(),
            font: font.to_string(),
            size,
            color,
        });
    }

    fn text_width(&self, text: &str, font: &str, size: f64) -> f64 {
        self.fonts.measure_string(text, font, size)
    }
}

/// Where one block ended up.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockReport {
    pub label: String,
    pub lines: usize,
    /// 1-based pages the block spans; `None` if nothing was placed.
    pub first_page: Option<usize>,
    pub last_page: Option<usize>,
    pub error: Option<BlockError>,
}

/// The laid-out document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub pages: Vec<LayoutPage>,
    pub blocks: Vec<BlockReport>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Reports of blocks that carry an error.
    pub fn failed_blocks(&self) -> impl Iterator<Item = &BlockReport> {
        self.blocks.iter().filter(|b| b.error.is_some())
    }
}

/// Read, highlight and encode one file into a content block.
///
/// Never fails: an unreadable file gives a block with only an error, a
/// highlighter failure gives uncolored lines, malformed markup gives the
/// markup's plain text.
pub fn prepare_block(
    file: &SourceFile,
    highlighter: &dyn Highlighter,
    config: &RenderConfig,
) -> ContentBlock {
    let bytes = match &file.data {
        Ok(bytes) => bytes,
        Err(message) => {
            return ContentBlock::failed(&file.path, BlockError::Unreadable(message.clone()));
        }
    };
    let text = decode_text(bytes, config.tab_width);

    let mut block = match highlighter.highlight(&text, &file.path) {
        Ok(markup) => {
            let encoded = markup::encode(&markup);
            let block = ContentBlock::new(&file.path, encoded.lines);
            match encoded.malformed {
                Some(reason) => block.with_error(BlockError::MalformedMarkup(reason)),
                None => block,
            }
        }
        Err(e) => {
            tracing::warn!(target: "layout", file = %file.path, error = %e, "highlight_failed");
            ContentBlock::plain(&file.path, &text).with_error(BlockError::Highlight(e.to_string()))
        }
    };
    block.normalize(config.drop_blank_lines);
    tracing::debug!(
        target: "layout",
        file = %file.path,
        lines = block.line_count(),
        degraded = block.error.is_some(),
        "block_prepared"
    );
    block
}

/// Prepare every file on the rayon pool. Output order matches input order.
pub fn prepare_blocks(
    files: &[SourceFile],
    highlighter: &dyn Highlighter,
    config: &RenderConfig,
) -> Vec<ContentBlock> {
    files
        .par_iter()
        .map(|file| prepare_block(file, highlighter, config))
        .collect()
}

/// Tracks where we are on the current page during layout.
struct PageCursor {
    canvas: PageCanvas,
    /// Height used below the top margin.
    y: f64,
    content_height: f64,
}

impl PageCursor {
    fn new(config: &RenderConfig) -> Self {
        Self {
            canvas: PageCanvas::new(),
            y: 0.0,
            content_height: config.content_height(),
        }
    }

    fn remaining_height(&self) -> f64 {
        (self.content_height - self.y).max(0.0)
    }

    fn is_fresh(&self) -> bool {
        self.y == 0.0
    }
}

/// The main layout engine.
pub struct LayoutEngine<'a> {
    config: &'a RenderConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// Lay out blocks in order. The result always has at least one page.
    pub fn layout(&self, blocks: Vec<ContentBlock>) -> Document {
        let mut pages = Vec::new();
        let mut cursor = PageCursor::new(self.config);
        let mut reports = Vec::with_capacity(blocks.len());

        for block in blocks {
            let report = self.layout_block(block, &mut cursor, &mut pages);
            tracing::debug!(
                target: "layout",
                label = %report.label,
                lines = report.lines,
                first_page = ?report.first_page,
                last_page = ?report.last_page,
                "block_placed"
            );
            reports.push(report);
        }

        if !cursor.is_fresh() || pages.is_empty() {
            self.finish_page(&mut cursor, &mut pages);
        }
        if self.config.page_numbers {
            self.add_footers(&mut pages);
        }

        Document {
            pages,
            blocks: reports,
        }
    }

    fn finish_page(&self, cursor: &mut PageCursor, pages: &mut Vec<LayoutPage>) {
        let (width, height) = self.config.page_dimensions();
        let finished = std::mem::replace(cursor, PageCursor::new(self.config));
        tracing::debug!(
            target: "layout",
            page = pages.len() + 1,
            commands = finished.canvas.commands.len(),
            "page_finished"
        );
        pages.push(LayoutPage {
            width,
            height,
            commands: finished.canvas.commands,
        });
    }

    /// 1-based number of the page the cursor is on.
    fn page_number(pages: &[LayoutPage]) -> usize {
        pages.len() + 1
    }

    fn layout_block(
        &self,
        block: ContentBlock,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
    ) -> BlockReport {
        let config = self.config;
        let mut report = BlockReport {
            label: block.label.clone(),
            lines: block.line_count(),
            first_page: None,
            last_page: None,
            error: block.error.clone(),
        };

        let code_lines = if block.is_renderable() {
            block.line_count()
        } else {
            0
        };
        // The error notice sits between heading and code and travels with them.
        let notice_height = if block.error.is_some() {
            self.note_height() + NOTE_SPACE_AFTER
        } else {
            0.0
        };
        self.place_heading(&block.label, code_lines, notice_height, cursor, pages);
        report.first_page = Some(Self::page_number(pages));
        report.last_page = report.first_page;

        match &block.error {
            Some(err) if err.is_fatal() => {
                tracing::warn!(target: "layout", label = %block.label, error = %err, "block_failed");
                let notice = format!("Error processing {}: {}", block.label, err);
                self.place_note(&notice, config.theme.error, cursor, pages);
                report.last_page = Some(Self::page_number(pages));
                return report;
            }
            Some(err) => {
                let notice = format!("({}; shown without colors)", err);
                self.place_note(&notice, config.theme.note, cursor, pages);
            }
            None => {}
        }

        let metrics = config.line_metrics();
        let pad = config.panel_padding;
        let text_width = config.content_width() - 2.0 * pad;
        let left = config.page.margin.left;
        let top = config.page.margin.top;

        let chunks = chunk_lines(block.lines, config.chunk_lines);
        let chunk_count = chunks.len();
        let mut next_number = 1;

        for (index, chunk) in chunks.into_iter().enumerate() {
            let mut flow = CodeFlow::new(chunk, next_number, metrics);
            while flow.has_remainder() {
                let available = cursor.remaining_height() - 2.0 * pad;
                if flow.capacity(available) == 0 {
                    if cursor.is_fresh() {
                        tracing::warn!(
                            target: "layout",
                            label = %report.label,
                            remaining = flow.remaining_len(),
                            "zero_capacity_page"
                        );
                        report.error = Some(BlockError::ZeroCapacityPage);
                        return report;
                    }
                    self.finish_page(cursor, pages);
                    continue;
                }

                let slice = flow.measure(text_width, available);
                render_slice(
                    &mut cursor.canvas,
                    &slice,
                    left + pad,
                    top + cursor.y + pad,
                    config,
                );
                cursor.y += slice.height + 2.0 * pad;
                report.last_page = Some(Self::page_number(pages));

                if flow.has_remainder() {
                    self.finish_page(cursor, pages);
                }
            }
            next_number = flow.next_line_number();
            cursor.y += PANEL_SPACE_AFTER;

            if index + 1 < chunk_count {
                self.place_note(CONTINUED_NOTE, config.theme.note, cursor, pages);
            }
        }

        report
    }

    fn place_heading(
        &self,
        label: &str,
        code_lines: usize,
        notice_height: f64,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
    ) {
        let config = self.config;
        let text_height = config.heading_font_size * LINE_HEIGHT;
        let space_before = if cursor.is_fresh() {
            0.0
        } else {
            HEADING_SPACE_BEFORE
        };

        let decision = decide_heading_break(
            cursor.remaining_height(),
            space_before + text_height + HEADING_SPACE_AFTER,
            notice_height,
            config.panel_padding,
            code_lines,
            config.min_orphan_lines,
            &config.line_metrics(),
            cursor.is_fresh(),
        );
        let space_before = if decision == BreakDecision::MoveToNextPage {
            self.finish_page(cursor, pages);
            0.0
        } else {
            space_before
        };

        let baseline = config.page.margin.top + cursor.y + space_before + config.heading_font_size;
        cursor.canvas.draw_text(
            config.page.margin.left,
            baseline,
            label,
            &config.heading_font_name,
            config.heading_font_size,
            config.theme.heading,
        );
        cursor.y += space_before + text_height + HEADING_SPACE_AFTER;
    }

    fn note_height(&self) -> f64 {
        self.config.note_font_size * LINE_HEIGHT
    }

    fn place_note(
        &self,
        text: &str,
        color: Color,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
    ) {
        let config = self.config;
        let height = self.note_height();
        if decide_fixed_break(cursor.remaining_height(), height, cursor.is_fresh())
            == BreakDecision::MoveToNextPage
        {
            self.finish_page(cursor, pages);
        }
        let baseline = config.page.margin.top + cursor.y + config.note_font_size;
        cursor.canvas.draw_text(
            config.page.margin.left,
            baseline,
            text,
            &config.note_font_name,
            config.note_font_size,
            color,
        );
        cursor.y += height + NOTE_SPACE_AFTER;
    }

    /// "Page N of M", centered in the bottom margin.
    fn add_footers(&self, pages: &mut [LayoutPage]) {
        let config = self.config;
        let total = pages.len();
        for (i, page) in pages.iter_mut().enumerate() {
            let mut canvas = PageCanvas {
                commands: std::mem::take(&mut page.commands),
                fonts: FontContext::new(),
            };
            let text = format!("Page {} of {}", i + 1, total);
            let width = canvas.text_width(&text, &config.note_font_name, config.note_font_size);
            let baseline =
                page.height - config.page.margin.bottom / 2.0 + config.note_font_size / 3.0;
            canvas.draw_text(
                (page.width - width) / 2.0,
                baseline,
                &text,
                &config.note_font_name,
                config.note_font_size,
                config.theme.note,
            );
            page.commands = canvas.commands;
        }
    }
}

/// Split lines into chunks of at most `size` lines. No lines, no chunks.
fn chunk_lines(mut lines: Vec<Line>, size: usize) -> Vec<Vec<Line>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(lines.len().div_ceil(size));
    while !lines.is_empty() {
        let rest = lines.split_off(size.min(lines.len()));
        chunks.push(std::mem::replace(&mut lines, rest));
    }
    chunks
}
