//! # Page Budget
//!
//! How many code lines fit in a vertical space. A slice of `n` lines is
//! `n * leading + font_size` tall: every line advances by the leading, and
//! the last one still needs its own ascent below the final baseline gap.

/// Maximum whole lines that fit in `available_height`.
///
/// `floor((available_height - font_size) / line_leading)`, clamped to 0
/// when that is negative or the leading isn't positive.
pub fn max_lines(available_height: f64, font_size: f64, line_leading: f64) -> usize {
    if !(line_leading > 0.0) || !available_height.is_finite() {
        return 0;
    }
    let lines = ((available_height - font_size) / line_leading).floor();
    if lines <= 0.0 {
        0
    } else {
        lines as usize
    }
}

/// Font size and leading of code lines, the two numbers every height
/// computation needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub font_size: f64,
    pub leading: f64,
}

impl LineMetrics {
    pub fn new(font_size: f64, leading: f64) -> Self {
        Self { font_size, leading }
    }

    pub fn max_lines(&self, available_height: f64) -> usize {
        max_lines(available_height, self.font_size, self.leading)
    }

    /// Height of a slice of `lines` lines. An empty slice takes no space.
    pub fn height_of(&self, lines: usize) -> f64 {
        if lines == 0 {
            0.0
        } else {
            lines as f64 * self.leading + self.font_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_fifty_lines() {
        assert_eq!(max_lines(610.0, 10.0, 12.0), 50);
        assert_eq!(max_lines(621.9, 10.0, 12.0), 50);
        assert_eq!(max_lines(622.0, 10.0, 12.0), 51);
    }

    #[test]
    fn test_clamps_to_zero() {
        assert_eq!(max_lines(5.0, 10.0, 12.0), 0);
        assert_eq!(max_lines(21.0, 10.0, 12.0), 0);
        assert_eq!(max_lines(-100.0, 10.0, 12.0), 0);
        assert_eq!(max_lines(500.0, 10.0, 0.0), 0);
        assert_eq!(max_lines(500.0, 10.0, -1.0), 0);
    }

    #[test]
    fn test_height_of() {
        let m = LineMetrics::new(10.0, 12.0);
        assert_eq!(m.height_of(0), 0.0);
        assert_eq!(m.height_of(1), 22.0);
        assert_eq!(m.height_of(50), 610.0);
        assert_eq!(m.max_lines(m.height_of(37)), 37);
    }
}
