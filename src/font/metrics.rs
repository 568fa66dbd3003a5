//! Advance widths for the standard PDF fonts, in 1/1000 em.
//!
//! Tables cover printable ASCII (0x20..=0x7E) and come from the Adobe core
//! font AFM files. Oblique variants share their upright widths. Characters
//! outside the table use the font's default width.

/// Width table for one standard font.
#[derive(Debug)]
pub struct StandardFontMetrics {
    widths: Option<&'static [u16; 95]>,
    default_width: u16,
}

impl StandardFontMetrics {
    /// Every glyph the same width.
    pub const fn monospace(width: u16) -> Self {
        Self {
            widths: None,
            default_width: width,
        }
    }

    pub const fn proportional(widths: &'static [u16; 95], default_width: u16) -> Self {
        Self {
            widths: Some(widths),
            default_width,
        }
    }

    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match self.widths {
            Some(table) => {
                let cp = ch as u32;
                if (0x20..=0x7E).contains(&cp) {
                    table[(cp - 0x20) as usize]
                } else {
                    self.default_width
                }
            }
            None => self.default_width,
        };
        units as f64 * font_size / 1000.0
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

pub static COURIER: StandardFontMetrics = StandardFontMetrics::monospace(600);

pub static HELVETICA: StandardFontMetrics =
    StandardFontMetrics::proportional(&HELVETICA_WIDTHS, 556);

pub static HELVETICA_BOLD: StandardFontMetrics =
    StandardFontMetrics::proportional(&HELVETICA_BOLD_WIDTHS, 556);

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_is_monospace() {
        assert_eq!(COURIER.char_width('i', 10.0), 6.0);
        assert_eq!(COURIER.char_width('W', 10.0), 6.0);
        assert_eq!(COURIER.measure_string("hello", 10.0, 0.0), 30.0);
    }

    #[test]
    fn helvetica_table_lookup() {
        assert!((HELVETICA.char_width(' ', 12.0) - 3.336).abs() < 0.001);
        assert!((HELVETICA.char_width('@', 10.0) - 10.15).abs() < 0.001);
        assert!((HELVETICA.char_width('~', 10.0) - 5.84).abs() < 0.001);
        assert!(HELVETICA_BOLD.char_width('A', 12.0) > HELVETICA.char_width('A', 12.0));
    }

    #[test]
    fn non_ascii_uses_default() {
        assert!((HELVETICA.char_width('é', 10.0) - 5.56).abs() < 0.001);
    }
}
