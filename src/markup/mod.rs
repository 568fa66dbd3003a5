//! # Marker Encoding
//!
//! Turns a highlighter's markup into colored lines.
//!
//! ```text
//! <span class="k">def</span> f():   ──encode──▶  [Line { runs: [("def", kw), (" f():", -)] }]
//!                                                      │
//!                                           to_marker_text / decode
//!                                                      ▼
//!                                   "█kwdef█ f():"  (external boundaries only)
//! ```
//!
//! Inside the crate the encoder hands structured [`Line`]s straight to layout;
//! there is no in-band sentinel to collide with source text. The textual
//! encoding (`SENTINEL + code + text + SENTINEL`) exists for callers that
//! persist or exchange encoded text, and [`decode`] reads it back. Run text
//! in that encoding is entity-escaped (`&lt;`, `&gt;`, `&amp;`), so source
//! text can never be mistaken for a residual tag.

pub mod classes;
pub mod decode;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::highlight::escape_markup;
use crate::model::Line;
use crate::style::ColorTag;

pub use classes::tag_for_class;
pub use decode::{decode, decode_line, strip_artifacts, strip_structural};

/// Delimiter around tagged spans in the textual encoding.
pub const SENTINEL: char = '\u{2588}';

/// Stand-in for sentinel characters found in source text.
pub const SENTINEL_REPLACEMENT: char = '\u{2593}';

/// The result of encoding one file's markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub lines: Vec<Line>,
    /// Set when the markup couldn't be parsed and the lines are uncolored.
    pub malformed: Option<String>,
}

/// Builds lines from a stream of (text, tag) pieces, breaking on newlines.
#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line>,
    current: Line,
}

impl LineBuilder {
    fn push(&mut self, text: &str, tag: Option<ColorTag>) {
        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            self.current.push(first.trim_end_matches('\r'), tag);
        }
        for piece in pieces {
            self.lines.push(std::mem::take(&mut self.current));
            self.current.push(piece.trim_end_matches('\r'), tag);
        }
    }

    fn finish(mut self) -> Vec<Line> {
        if !self.current.runs.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
    }
}

/// Encode highlighter markup into colored lines.
///
/// Nested spans are resolved innermost-first: a piece of text takes the tag
/// of the closest enclosing span whose class maps to one. Spans that cross
/// newlines carry their tag onto every line they cover.
///
/// Malformed markup never fails the encode. The lines fall back to the
/// markup's plain text with no colors and [`Encoded::malformed`] says why.
pub fn encode(markup: &str) -> Encoded {
    let (cleaned, stripped) = strip_structural(markup);
    if stripped > 0 {
        tracing::trace!(target: "markup", stripped, "structural_artifacts_stripped");
    }

    match encode_tagged(&cleaned) {
        Ok(lines) => Encoded {
            lines,
            malformed: None,
        },
        Err(reason) => {
            tracing::warn!(target: "markup", %reason, "malformed_markup_degraded_to_plain");
            Encoded {
                lines: plain_lines(&cleaned),
                malformed: Some(reason),
            }
        }
    }
}

/// The tag of the innermost open element that has one.
fn active(stack: &[Option<ColorTag>]) -> Option<ColorTag> {
    stack.iter().rev().find_map(|t| *t)
}

fn encode_tagged(markup: &str) -> Result<Vec<Line>, String> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = true;

    // One entry per open element: the tag its class maps to, if any.
    let mut stack: Vec<Option<ColorTag>> = Vec::new();
    let mut builder = LineBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = e
                    .try_get_attribute("class")
                    .map_err(|err| err.to_string())?
                    .map(|attr| attr.unescape_value().map(|v| tag_for_class(&v)))
                    .transpose()
                    .map_err(|err| err.to_string())?
                    .flatten();
                stack.push(tag);
            }
            Ok(Event::End(_)) => {
                if stack.pop().is_none() {
                    return Err("closing tag without an opening tag".to_string());
                }
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"br" {
                    builder.push("\n", None);
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|err| err.to_string())?;
                builder.push(&text, active(&stack));
            }
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                builder.push(&text, active(&stack));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(format!(
                    "at byte {}: {}",
                    reader.error_position(),
                    err
                ))
            }
        }
    }

    if !stack.is_empty() {
        return Err(format!("{} unclosed tag(s) at end of input", stack.len()));
    }
    Ok(builder.finish())
}

/// Tag-stripped, entity-decoded text as uncolored lines.
pub fn plain_lines(markup: &str) -> Vec<Line> {
    let (text, _) = strip_artifacts(markup);
    unescape_entities(&text).lines().map(Line::plain).collect()
}

/// Decode the handful of entities highlighters emit. Unknown entities are
/// left as written.
pub(crate) fn unescape_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let ch = match &rest[1..end] {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                entity => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Run text as it appears in the textual encoding: markup characters
/// escaped, and the pagination hint broken up so the decoder's artifact pass
/// leaves it alone.
fn escape_run_text(text: &str) -> String {
    escape_markup(&text.replace(SENTINEL, &SENTINEL_REPLACEMENT.to_string()))
        .replace("(continued on next page", "&#40;continued on next page")
}

/// The textual marker encoding of one line.
///
/// Sentinel characters in the source text are replaced with
/// [`SENTINEL_REPLACEMENT`] so the encoding stays unambiguous. Everything
/// else survives [`decode_line`] unchanged.
pub fn to_marker_text(line: &Line) -> String {
    let mut out = String::new();
    for run in &line.runs {
        let text = escape_run_text(&run.text);
        match run.tag {
            Some(tag) => {
                out.push(SENTINEL);
                out.push_str(tag.code());
                out.push_str(&text);
                out.push(SENTINEL);
            }
            None => out.push_str(&text),
        }
    }
    out
}

/// The textual marker encoding of a sequence of lines, newline-joined.
pub fn lines_to_marker_text(lines: &[Line]) -> String {
    lines.iter().map(to_marker_text).collect::<Vec<_>>().join("\n")
}

/// Encode one plain line with no tags.
pub fn encode_identity(line: &str) -> String {
    to_marker_text(&Line::plain(line))
}
