//! # Canvas Rendering
//!
//! Draws one [`PageSlice`] as a code panel: the dark background, a gutter
//! cell and right-aligned number per line, then the line's runs left to
//! right with the color switched before each run.
//!
//! Coordinates are top-left based, y growing down, the same as the layout
//! engine; the PDF writer flips them. The renderer draws where it's told
//! and never starts a page.

use crate::config::RenderConfig;
use crate::layout::flow::PageSlice;
use crate::style::Color;

/// A drawing surface.
pub trait Canvas {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);

    /// Draw `text` with its left edge at `x` and its baseline at `baseline`.
    fn draw_text(
        &mut self,
        x: f64,
        baseline: f64,
        text: &str,
        font: &str,
        size: f64,
        color: Color,
    );

    fn text_width(&self, text: &str, font: &str, size: f64) -> f64;

    /// Draw `text` so that it ends at `right`.
    fn draw_right_text(
        &mut self,
        right: f64,
        baseline: f64,
        text: &str,
        font: &str,
        size: f64,
        color: Color,
    ) {
        let width = self.text_width(text, font, size);
        self.draw_text(right - width, baseline, text, font, size, color);
    }
}

/// Draw a slice with the top-left of its text area at `(x, y)`.
///
/// The background extends `panel_padding` past the text area on every
/// side. An empty slice draws nothing.
pub fn render_slice<C: Canvas + ?Sized>(
    canvas: &mut C,
    slice: &PageSlice,
    x: f64,
    y: f64,
    config: &RenderConfig,
) {
    if slice.is_empty() {
        return;
    }
    let theme = &config.theme;
    let pad = config.panel_padding;
    let font = config.font_name.as_str();
    let size = config.font_size;
    let leading = config.line_leading;
    let number_size = (size - 1.0).max(1.0);

    canvas.fill_rect(
        x - pad,
        y - pad,
        slice.width + 2.0 * pad,
        slice.height + 2.0 * pad,
        theme.background,
    );

    let number_right = x + config.gutter_width - config.inner_padding;
    let code_x = x + config.gutter_width + config.inner_padding;

    for (i, (number, line)) in slice.numbered().enumerate() {
        let baseline = y + size + i as f64 * leading;

        canvas.fill_rect(
            x,
            baseline + 2.0 - leading,
            config.gutter_width,
            leading,
            theme.gutter,
        );
        canvas.draw_right_text(
            number_right,
            baseline,
            &number.to_string(),
            font,
            number_size,
            theme.line_number,
        );

        let mut pen = code_x;
        for run in &line.runs {
            if run.text.is_empty() {
                continue;
            }
            canvas.draw_text(pen, baseline, &run.text, font, size, theme.run_color(run.tag));
            pen += canvas.text_width(&run.text, font, size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{DrawCommand, PageCanvas};
    use crate::model::{ColoredRun, Line};
    use crate::style::ColorTag;

    fn slice(lines: Vec<Line>, first: usize) -> PageSlice {
        let height = lines.len() as f64 * 12.0 + 10.0;
        PageSlice {
            lines,
            first_line_number: first,
            width: 500.0,
            height,
        }
    }

    fn texts(canvas: &PageCanvas) -> Vec<(f64, f64, String, Color)> {
        canvas
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text {
                    x,
                    baseline,
                    text,
                    color,
                    ..
                } => Some((*x, *baseline, text.clone(), *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_panel_geometry() {
        let config = RenderConfig::default();
        let mut canvas = PageCanvas::new();
        let s = slice(vec![Line::plain("a"), Line::plain("b")], 1);
        render_slice(&mut canvas, &s, 30.0, 100.0, &config);

        match &canvas.commands[0] {
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                assert_eq!((*x, *y, *width, *height), (25.0, 95.0, 510.0, 44.0));
                assert_eq!(*color, config.theme.background);
            }
            other => panic!("expected background rect, got {:?}", other),
        }
        // Gutter cell of the first line: baseline 110, top 110 + 2 - 12.
        match &canvas.commands[1] {
            DrawCommand::Rect { x, y, width, height, .. } => {
                assert_eq!((*x, *y, *width, *height), (30.0, 100.0, 30.0, 12.0));
            }
            other => panic!("expected gutter rect, got {:?}", other),
        }
    }

    #[test]
    fn test_runs_advance_and_switch_color() {
        let config = RenderConfig::default();
        let mut canvas = PageCanvas::new();
        let line = Line::new(vec![
            ColoredRun::plain("x = 1  "),
            ColoredRun::new("# comment", Some(ColorTag::Comment)),
        ]);
        render_slice(&mut canvas, &slice(vec![line], 1), 30.0, 100.0, &config);

        let texts = texts(&canvas);
        // Line number, then the two runs.
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0].2, "1");
        let (x1, b1, t1, c1) = &texts[1];
        let (x2, b2, t2, c2) = &texts[2];
        assert_eq!(t1, "x = 1  ");
        assert_eq!(*x1, 30.0 + 30.0 + 5.0);
        assert_eq!(*c1, config.theme.text);
        assert_eq!(t2, "# comment");
        // Courier: 7 chars at 6pt each.
        assert_eq!(*x2, 65.0 + 42.0);
        assert_eq!(*c2, ColorTag::Comment.default_color());
        assert_eq!(*b1, 110.0);
        assert_eq!(b1, b2);
    }

    #[test]
    fn test_numbers_are_right_aligned_and_continue() {
        let config = RenderConfig::default();
        let mut canvas = PageCanvas::new();
        let lines = vec![Line::plain("a"), Line::plain("b")];
        render_slice(&mut canvas, &slice(lines, 99), 30.0, 100.0, &config);

        let numbers: Vec<_> = texts(&canvas)
            .into_iter()
            .filter(|(_, _, t, _)| t.chars().all(|c| c.is_ascii_digit()))
            .collect();
        assert_eq!(numbers.len(), 2);
        assert_eq!(numbers[0].2, "99");
        assert_eq!(numbers[1].2, "100");
        // Courier at 9pt: 5.4 per digit, right edge at 30 + 30 - 5 = 55.
        assert!((numbers[0].0 - (55.0 - 10.8)).abs() < 1e-9);
        assert!((numbers[1].0 - (55.0 - 16.2)).abs() < 1e-9);
        assert_eq!(numbers[1].1, 122.0);
    }

    #[test]
    fn test_empty_slice_draws_nothing() {
        let mut canvas = PageCanvas::new();
        render_slice(&mut canvas, &slice(vec![], 1), 0.0, 0.0, &RenderConfig::default());
        assert!(canvas.commands.is_empty());
    }
}
