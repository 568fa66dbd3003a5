//! # Render Configuration
//!
//! One explicit struct carries every geometric and visual choice: page size,
//! fonts, leading, gutter, theme. It is threaded by reference through
//! encoding, layout and rendering, so identical inputs and configuration
//! always produce identical pages.
//!
//! Configuration is JSON with camelCase keys. Every field has a default, so
//! `{}` is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CodepressError;
use crate::font::StandardFont;
use crate::layout::budget::LineMetrics;
use crate::model::PageConfig;
use crate::style::Theme;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub page: PageConfig,
    /// Code font. Must be one of the standard PDF fonts.
    pub font_name: String,
    pub font_size: f64,
    /// Baseline-to-baseline distance for code lines.
    pub line_leading: f64,
    /// Width of the line-number column.
    pub gutter_width: f64,
    /// Background panel overhang around the code on every side.
    pub panel_padding: f64,
    /// Gap between the gutter and the code text, and between a line number
    /// and the gutter's right edge.
    pub inner_padding: f64,
    pub heading_font_name: String,
    pub heading_font_size: f64,
    pub note_font_name: String,
    pub note_font_size: f64,
    /// Lines per code panel before a new panel starts.
    pub chunk_lines: usize,
    /// A heading moves to the next page unless this many code lines fit
    /// under it.
    pub min_orphan_lines: usize,
    /// Drop every blank line instead of keeping single blank lines.
    pub drop_blank_lines: bool,
    /// Columns per tab stop when expanding tabs.
    pub tab_width: usize,
    /// Draw a "Page N of M" footer.
    pub page_numbers: bool,
    /// Document title for the PDF metadata.
    pub title: Option<String>,
    pub theme: Theme,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            font_name: "Courier".to_string(),
            font_size: 10.0,
            line_leading: 12.0,
            gutter_width: 30.0,
            panel_padding: 5.0,
            inner_padding: 5.0,
            heading_font_name: "Helvetica-Bold".to_string(),
            heading_font_size: 14.0,
            note_font_name: "Helvetica-Oblique".to_string(),
            note_font_size: 9.0,
            chunk_lines: 50,
            min_orphan_lines: 2,
            drop_blank_lines: false,
            tab_width: 4,
            page_numbers: true,
            title: None,
            theme: Theme::default(),
        }
    }
}

impl RenderConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, CodepressError> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self, CodepressError> {
        let json = fs::read_to_string(path).map_err(|source| CodepressError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject configurations that can't lay out a single line.
    pub fn validate(&self) -> Result<(), CodepressError> {
        let invalid = |msg: String| -> Result<(), CodepressError> {
            Err(CodepressError::Config(msg))
        };

        for (field, name) in [
            ("fontName", &self.font_name),
            ("headingFontName", &self.heading_font_name),
            ("noteFontName", &self.note_font_name),
        ] {
            if StandardFont::from_name(name).is_none() {
                return invalid(format!("{} '{}' is not a standard PDF font", field, name));
            }
        }
        for (field, value) in [
            ("fontSize", self.font_size),
            ("lineLeading", self.line_leading),
            ("headingFontSize", self.heading_font_size),
            ("noteFontSize", self.note_font_size),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{} must be a positive number, got {}", field, value));
            }
        }
        for (field, value) in [
            ("gutterWidth", self.gutter_width),
            ("panelPadding", self.panel_padding),
            ("innerPadding", self.inner_padding),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{} must not be negative, got {}", field, value));
            }
        }
        if self.chunk_lines == 0 {
            return invalid("chunkLines must be at least 1".to_string());
        }
        let (width, height) = self.page.size.dimensions();
        if self.content_width() <= self.gutter_width + 2.0 * self.panel_padding {
            return invalid(format!(
                "page width {} leaves no room for code after margins and gutter",
                width
            ));
        }
        if self.content_height() <= 0.0 {
            return invalid(format!("page height {} leaves no room after margins", height));
        }
        Ok(())
    }

    pub fn line_metrics(&self) -> LineMetrics {
        LineMetrics::new(self.font_size, self.line_leading)
    }

    pub fn page_dimensions(&self) -> (f64, f64) {
        self.page.size.dimensions()
    }

    /// Width between the left and right margins.
    pub fn content_width(&self) -> f64 {
        self.page.size.dimensions().0 - self.page.margin.horizontal()
    }

    /// Height between the top and bottom margins.
    pub fn content_height(&self) -> f64 {
        self.page.size.dimensions().1 - self.page.margin.vertical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSize;
    use crate::style::{Color, ColorTag};

    #[test]
    fn empty_json_is_default() {
        let config = RenderConfig::from_json_str("{}").unwrap();
        assert_eq!(config.font_name, "Courier");
        assert_eq!(config.font_size, 10.0);
        assert_eq!(config.line_leading, 12.0);
        assert_eq!(config.chunk_lines, 50);
    }

    #[test]
    fn partial_overrides() {
        let config = RenderConfig::from_json_str(
            r##"{
                "fontSize": 8,
                "lineLeading": 9.5,
                "page": { "size": "A4" },
                "theme": { "background": "#000", "colors": { "keyword": "#ffffff" } }
            }"##,
        )
        .unwrap();
        assert_eq!(config.font_size, 8.0);
        assert_eq!(config.line_leading, 9.5);
        assert_eq!(config.page_dimensions(), PageSize::A4.dimensions());
        assert_eq!(config.theme.background, Color::BLACK);
        assert_eq!(config.theme.colors.color(ColorTag::Keyword), Color::WHITE);
        assert_eq!(
            config.theme.colors.color(ColorTag::Comment),
            ColorTag::Comment.default_color()
        );
    }

    #[test]
    fn rejects_unknown_font() {
        let err = RenderConfig::from_json_str(r#"{ "fontName": "Comic Sans" }"#).unwrap_err();
        assert!(matches!(err, CodepressError::Config(_)));
        assert!(err.to_string().contains("Comic Sans"));
    }

    #[test]
    fn rejects_zero_leading() {
        let err = RenderConfig::from_json_str(r#"{ "lineLeading": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("lineLeading"));
    }

    #[test]
    fn rejects_page_without_room() {
        let err = RenderConfig::from_json_str(
            r#"{ "page": { "size": { "Custom": { "width": 50, "height": 50 } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CodepressError::Config(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = RenderConfig::from_json_str("{ \"fontSize\": }").unwrap_err();
        assert!(matches!(err, CodepressError::ParseError { .. }));
    }
}
