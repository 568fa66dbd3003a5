//! # Font Management
//!
//! The standard PDF fonts, which need no embedding, and text measurement
//! against their AFM widths. Code is set in Courier by default; headings and
//! notes use Helvetica.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard PDF fonts codepress can set text in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub const ALL: [StandardFont; 8] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierOblique,
        StandardFont::CourierBoldOblique,
    ];

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Look a font up by its PDF name.
    pub fn from_name(name: &str) -> Option<StandardFont> {
        Self::ALL.into_iter().find(|f| f.pdf_name() == name)
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => &metrics::COURIER,
        }
    }
}

/// Shared font context used by layout and rendering.
#[derive(Debug, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a font name, falling back to Helvetica if not found.
    pub fn resolve(&self, name: &str) -> StandardFont {
        StandardFont::from_name(name).unwrap_or(StandardFont::Helvetica)
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, font_name: &str, font_size: f64) -> f64 {
        self.resolve(font_name).metrics().char_width(ch, font_size)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, font_name: &str, font_size: f64) -> f64 {
        self.resolve(font_name)
            .metrics()
            .measure_string(text, font_size, 0.0)
    }
}
