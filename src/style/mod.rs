//! # Colors and Theme
//!
//! The closed set of semantic color tags, the table that maps them to RGB,
//! and the panel theme. All of it is plain data owned by
//! [`RenderConfig`](crate::config::RenderConfig); nothing here is global.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An RGBA color with components in `0.0..=1.0`.
///
/// Deserializes from either a hex string (`"#7CC379"`, `"#fff"`) or an
/// `{ "r", "g", "b", "a" }` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rgb` or `#rrggbb`. Invalid input yields black.
    pub fn hex(hex: &str) -> Self {
        Self::parse_hex(hex).unwrap_or(Color::BLACK)
    }

    /// Parse `#rgb` or `#rrggbb`, returning `None` on malformed input.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let (r, g, b) = match hex.len() {
            3 => (
                u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?,
            ),
            6 => (
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            ),
            _ => return None,
        };
        Some(Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        })
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Rgba {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default = "opaque")]
        a: f64,
    },
}

fn opaque() -> f64 {
    1.0
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(s) => {
                Color::parse_hex(&s).ok_or_else(|| format!("invalid hex color '{}'", s))
            }
            ColorRepr::Rgba { r, g, b, a } => Ok(Color { r, g, b, a }),
        }
    }
}

/// A semantic token color. The closed set the marker encoding can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorTag {
    Comment,
    String,
    Keyword,
    Name,
    Builtin,
    Function,
    ClassName,
    Namespace,
    Operator,
    OperatorWord,
    Punctuation,
    Number,
}

impl ColorTag {
    pub const ALL: [ColorTag; 12] = [
        ColorTag::Comment,
        ColorTag::String,
        ColorTag::Keyword,
        ColorTag::Name,
        ColorTag::Builtin,
        ColorTag::Function,
        ColorTag::ClassName,
        ColorTag::Namespace,
        ColorTag::Operator,
        ColorTag::OperatorWord,
        ColorTag::Punctuation,
        ColorTag::Number,
    ];

    /// The two-character code used in the textual marker encoding.
    pub fn code(self) -> &'static str {
        match self {
            ColorTag::Comment => "cm",
            ColorTag::String => "st",
            ColorTag::Keyword => "kw",
            ColorTag::Name => "nm",
            ColorTag::Builtin => "bi",
            ColorTag::Function => "fn",
            ColorTag::ClassName => "cl",
            ColorTag::Namespace => "ns",
            ColorTag::Operator => "op",
            ColorTag::OperatorWord => "ow",
            ColorTag::Punctuation => "pu",
            ColorTag::Number => "nu",
        }
    }

    pub fn from_code(code: &str) -> Option<ColorTag> {
        ColorTag::ALL.into_iter().find(|tag| tag.code() == code)
    }

    /// Built-in color for this tag.
    pub fn default_color(self) -> Color {
        match self {
            ColorTag::Comment => Color::hex("#7CC379"),
            ColorTag::String => Color::hex("#E6DB74"),
            ColorTag::Keyword => Color::hex("#FF6188"),
            ColorTag::Name => Color::hex("#78DCE8"),
            ColorTag::Builtin => Color::hex("#A9DC76"),
            ColorTag::Function => Color::hex("#A9DC76"),
            ColorTag::ClassName => Color::hex("#FFB86C"),
            ColorTag::Namespace => Color::hex("#78DCE8"),
            ColorTag::Operator => Color::hex("#FF9D00"),
            ColorTag::OperatorWord => Color::hex("#FF6188"),
            ColorTag::Punctuation => Color::hex("#F8F8F2"),
            ColorTag::Number => Color::hex("#AB9DF2"),
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Maps every [`ColorTag`] to a concrete color.
///
/// Configuration supplies overrides only; tags it doesn't mention keep their
/// built-in color, so a lookup always succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<ColorTag, Color>", into = "BTreeMap<ColorTag, Color>")]
pub struct ColorTable {
    colors: BTreeMap<ColorTag, Color>,
}

impl ColorTable {
    pub fn color(&self, tag: ColorTag) -> Color {
        self.colors
            .get(&tag)
            .copied()
            .unwrap_or_else(|| tag.default_color())
    }

    pub fn set(&mut self, tag: ColorTag, color: Color) {
        self.colors.insert(tag, color);
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            colors: ColorTag::ALL
                .into_iter()
                .map(|tag| (tag, tag.default_color()))
                .collect(),
        }
    }
}

impl From<BTreeMap<ColorTag, Color>> for ColorTable {
    fn from(overrides: BTreeMap<ColorTag, Color>) -> Self {
        let mut table = ColorTable::default();
        table.colors.extend(overrides);
        table
    }
}

impl From<ColorTable> for BTreeMap<ColorTag, Color> {
    fn from(table: ColorTable) -> Self {
        table.colors
    }
}

/// Colors for everything that isn't a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    /// Code panel background.
    pub background: Color,
    /// Line-number cell background.
    pub gutter: Color,
    /// Line-number text.
    pub line_number: Color,
    /// Untagged code text.
    pub text: Color,
    /// File heading.
    pub heading: Color,
    /// Continuation notes and footers.
    pub note: Color,
    /// Error notices.
    pub error: Color,
    /// Token colors.
    pub colors: ColorTable,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::hex("#1e1e1e"),
            gutter: Color::hex("#2a2a2a"),
            line_number: Color::hex("#666666"),
            text: Color::WHITE,
            heading: Color::hex("#0000ff"),
            note: Color::hex("#555555"),
            error: Color::hex("#ff0000"),
            colors: ColorTable::default(),
        }
    }
}

impl Theme {
    /// Color for a run: the tag's mapped color, or the default text color.
    pub fn run_color(&self, tag: Option<ColorTag>) -> Color {
        tag.map(|t| self.colors.color(t)).unwrap_or(self.text)
    }
}
