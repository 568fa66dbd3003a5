//! # Page Break Decisions
//!
//! The rules for what may be left at the bottom of a page. Code panels
//! split freely, a line at a time, but a file heading must not end a page
//! without at least a few of its lines under it.

use super::budget::LineMetrics;

/// Where an unbreakable item goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// It fits on the current page.
    Place,
    /// Start a new page first.
    MoveToNextPage,
}

/// Decide where a file heading goes.
///
/// The heading stays on the current page only if `min_orphan_lines` code
/// lines (or all of them, when the block is shorter) fit under it together
/// with the panel padding. `notice_height` is whatever is drawn between the
/// heading and the panel (a degraded block's notice), and counts too. On a
/// fresh page the heading is always placed; moving it again wouldn't help.
pub fn decide_heading_break(
    remaining_height: f64,
    heading_height: f64,
    notice_height: f64,
    panel_padding: f64,
    block_lines: usize,
    min_orphan_lines: usize,
    metrics: &LineMetrics,
    on_fresh_page: bool,
) -> BreakDecision {
    if on_fresh_page {
        return BreakDecision::Place;
    }
    let keep = block_lines.min(min_orphan_lines);
    let code_height = if keep == 0 {
        0.0
    } else {
        metrics.height_of(keep) + 2.0 * panel_padding
    };
    if heading_height + notice_height + code_height <= remaining_height {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextPage
    }
}

/// Decide whether an item of fixed height fits in what's left of a page.
pub fn decide_fixed_break(remaining_height: f64, height: f64, on_fresh_page: bool) -> BreakDecision {
    if height <= remaining_height || on_fresh_page {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextPage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: LineMetrics = LineMetrics {
        font_size: 10.0,
        leading: 12.0,
    };

    #[test]
    fn test_heading_with_room_is_placed() {
        // 26 heading + 2 lines (34) + 10 padding = 70
        let d = decide_heading_break(70.0, 26.0, 0.0, 5.0, 100, 2, &METRICS, false);
        assert_eq!(d, BreakDecision::Place);
    }

    #[test]
    fn test_orphaned_heading_moves() {
        let d = decide_heading_break(69.0, 26.0, 0.0, 5.0, 100, 2, &METRICS, false);
        assert_eq!(d, BreakDecision::MoveToNextPage);
    }

    #[test]
    fn test_short_block_needs_only_its_lines() {
        // One line: 26 + 22 + 10 = 58
        let d = decide_heading_break(58.0, 26.0, 0.0, 5.0, 1, 2, &METRICS, false);
        assert_eq!(d, BreakDecision::Place);
    }

    #[test]
    fn test_notice_counts_toward_heading_room() {
        // 26 heading + 18.8 notice + 34 lines + 10 padding = 88.8
        let d = decide_heading_break(80.0, 26.0, 18.8, 5.0, 100, 2, &METRICS, false);
        assert_eq!(d, BreakDecision::MoveToNextPage);
        let d = decide_heading_break(89.0, 26.0, 18.8, 5.0, 100, 2, &METRICS, false);
        assert_eq!(d, BreakDecision::Place);
    }

    #[test]
    fn test_fresh_page_always_places() {
        let d = decide_heading_break(10.0, 26.0, 0.0, 5.0, 100, 2, &METRICS, true);
        assert_eq!(d, BreakDecision::Place);
    }

    #[test]
    fn test_fixed_break() {
        assert_eq!(decide_fixed_break(20.0, 15.0, false), BreakDecision::Place);
        assert_eq!(decide_fixed_break(10.0, 15.0, false), BreakDecision::MoveToNextPage);
        assert_eq!(decide_fixed_break(10.0, 15.0, true), BreakDecision::Place);
    }
}
