//! # Paginating Flow
//!
//! A [`CodeFlow`] owns the not-yet-placed lines of one code panel and hands
//! them out a page at a time. Each [`CodeFlow::measure`] call removes the
//! lines it returns, so a later page can never see a line twice and the
//! caller never has to re-measure what is already on the page.
//!
//! The type is not `Clone`. [`CodeFlow::fork`] copies the remaining state
//! for callers that want to try a layout without committing to it.

use std::collections::VecDeque;

use crate::model::Line;

use super::budget::LineMetrics;

/// The lines placed on one page, ready for the canvas renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice {
    pub lines: Vec<Line>,
    /// 1-based number of the first line, for the gutter.
    pub first_line_number: usize,
    pub width: f64,
    pub height: f64,
}

impl PageSlice {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Gutter numbers paired with their lines.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Line)> {
        (self.first_line_number..).zip(self.lines.iter())
    }
}

#[derive(Debug)]
pub struct CodeFlow {
    remaining: VecDeque<Line>,
    next_line_number: usize,
    metrics: LineMetrics,
    measured: bool,
}

impl CodeFlow {
    pub fn new(lines: Vec<Line>, first_line_number: usize, metrics: LineMetrics) -> Self {
        Self {
            remaining: lines.into(),
            next_line_number: first_line_number,
            metrics,
            measured: false,
        }
    }

    /// Lines that would fit in `available_height`, capped by what remains.
    /// Doesn't change the flow.
    pub fn capacity(&self, available_height: f64) -> usize {
        self.metrics
            .max_lines(available_height)
            .min(self.remaining.len())
    }

    /// Take the prefix that fits in the given space.
    ///
    /// With no room for a single line the returned slice is empty and the
    /// flow is untouched; the caller decides whether to break the page.
    pub fn measure(&mut self, available_width: f64, available_height: f64) -> PageSlice {
        let take = self.capacity(available_height);
        let first_line_number = self.next_line_number;
        if take == 0 {
            return PageSlice {
                lines: Vec::new(),
                first_line_number,
                width: available_width,
                height: 0.0,
            };
        }

        self.measured = true;
        let lines: Vec<Line> = self.remaining.drain(..take).collect();
        self.next_line_number += take;
        tracing::trace!(
            target: "layout",
            taken = take,
            remaining = self.remaining.len(),
            first_line_number,
            "flow_measured"
        );
        PageSlice {
            height: self.metrics.height_of(lines.len()),
            lines,
            first_line_number,
            width: available_width,
        }
    }

    pub fn has_remainder(&self) -> bool {
        !self.remaining.is_empty()
    }

    pub fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    /// Number the next returned line will carry.
    pub fn next_line_number(&self) -> usize {
        self.next_line_number
    }

    /// True once the flow has been measured at least once and nothing is
    /// left. A flow that was empty from the start never becomes exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.measured && self.remaining.is_empty()
    }

    /// An independent flow over the same remaining lines.
    pub fn fork(&self) -> CodeFlow {
        CodeFlow {
            remaining: self.remaining.clone(),
            next_line_number: self.next_line_number,
            metrics: self.metrics,
            measured: self.measured,
        }
    }

    /// Drain the flow page by page at a fixed page height. Stops when the
    /// flow is empty or a page can't take a single line.
    pub fn pages(&mut self, available_width: f64, available_height: f64) -> Pages<'_> {
        Pages {
            flow: self,
            width: available_width,
            height: available_height,
        }
    }
}

/// Iterator returned by [`CodeFlow::pages`].
pub struct Pages<'a> {
    flow: &'a mut CodeFlow,
    width: f64,
    height: f64,
}

impl Iterator for Pages<'_> {
    type Item = PageSlice;

    fn next(&mut self) -> Option<PageSlice> {
        if !self.flow.has_remainder() {
            return None;
        }
        let slice = self.flow.measure(self.width, self.height);
        (!slice.is_empty()).then_some(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_lines(n: usize) -> Vec<Line> {
        (1..=n).map(|i| Line::plain(&format!("line {}", i))).collect()
    }

    fn flow(n: usize) -> CodeFlow {
        CodeFlow::new(numbered_lines(n), 1, LineMetrics::new(10.0, 12.0))
    }

    fn texts(slice: &PageSlice) -> Vec<String> {
        slice.lines.iter().map(Line::text).collect()
    }

    #[test]
    fn test_drains_in_page_sized_slices() {
        let mut f = flow(120);
        let first = f.measure(500.0, 610.0);
        assert_eq!(first.lines.len(), 50);
        assert_eq!(first.first_line_number, 1);
        assert_eq!(first.height, 610.0);
        assert_eq!(texts(&first)[0], "line 1");
        assert_eq!(texts(&first)[49], "line 50");

        let second = f.measure(500.0, 610.0);
        assert_eq!(second.first_line_number, 51);
        assert_eq!(texts(&second)[0], "line 51");
        assert_eq!(texts(&second)[49], "line 100");
        assert!(f.has_remainder());

        let third = f.measure(500.0, 610.0);
        assert_eq!(third.lines.len(), 20);
        assert_eq!(third.first_line_number, 101);
        assert_eq!(third.height, 20.0 * 12.0 + 10.0);
        assert!(!f.has_remainder());
        assert!(f.is_exhausted());
    }

    #[test]
    fn test_every_line_once_in_order() {
        let mut f = flow(97);
        let heights = [100.0, 250.0, 40.0, 610.0, 33.0, 1000.0];
        let mut seen = Vec::new();
        for h in heights.iter().cycle() {
            if !f.has_remainder() {
                break;
            }
            let slice = f.measure(400.0, *h);
            for (n, line) in slice.numbered() {
                assert_eq!(line.text(), format!("line {}", n));
                seen.push(n);
            }
        }
        assert_eq!(seen, (1..=97).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_capacity_leaves_state() {
        let mut f = flow(5);
        let slice = f.measure(400.0, 15.0);
        assert!(slice.is_empty());
        assert_eq!(slice.height, 0.0);
        assert_eq!(slice.first_line_number, 1);
        assert_eq!(f.remaining_len(), 5);
        assert!(!f.is_exhausted());

        let slice = f.measure(400.0, 22.0);
        assert_eq!(texts(&slice), vec!["line 1"]);
    }

    #[test]
    fn test_capacity_does_not_consume() {
        let f = flow(10);
        assert_eq!(f.capacity(610.0), 10);
        assert_eq!(f.capacity(46.0), 3);
        assert_eq!(f.remaining_len(), 10);
    }

    #[test]
    fn test_fork_is_independent() {
        let mut f = flow(10);
        f.measure(400.0, 46.0);
        let mut forked = f.fork();
        let a = forked.measure(400.0, 1000.0);
        assert_eq!(a.first_line_number, 4);
        assert_eq!(a.lines.len(), 7);
        assert!(forked.is_exhausted());
        assert_eq!(f.remaining_len(), 7);
        assert_eq!(f.next_line_number(), 4);
    }

    #[test]
    fn test_pages_iterator() {
        let mut f = flow(120);
        let sizes: Vec<usize> = f.pages(500.0, 610.0).map(|s| s.lines.len()).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        assert!(f.is_exhausted());

        let mut tiny = flow(3);
        assert_eq!(tiny.pages(500.0, 5.0).count(), 0);
        assert_eq!(tiny.remaining_len(), 3);
    }

    #[test]
    fn test_continued_numbering() {
        let mut f = CodeFlow::new(numbered_lines(3), 51, LineMetrics::new(10.0, 12.0));
        let slice = f.measure(400.0, 1000.0);
        let numbers: Vec<usize> = slice.numbered().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![51, 52, 53]);
    }

    #[test]
    fn test_empty_flow_is_not_exhausted() {
        let mut f = flow(0);
        assert!(!f.is_exhausted());
        assert!(f.measure(400.0, 610.0).is_empty());
        assert!(!f.is_exhausted());
        assert!(!f.has_remainder());
    }
}
