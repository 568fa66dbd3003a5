//! # Marker Decoder / Line Segmenter
//!
//! Parses the textual marker encoding back into colored runs.
//!
//! Before splitting on the sentinel, residual markup the highlighter may
//! have left behind is stripped: structural wrappers, generated line-number
//! labels, the pagination hint text, and any tag still standing. Stripping is
//! the recovery for these artifacts; it never fails and never touches
//! characters outside the matched markup. Run text is entity-unescaped after
//! the split, so escaped source text comes back exactly as written.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::Line;
use crate::style::ColorTag;

use super::{unescape_entities, SENTINEL};

/// Substitutions safe to apply to markup before it is parsed: each removes a
/// balanced construct, or the open and close tags of a wrapper together.
fn structural_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Table-mode line-number column, contents included.
            r#"(?s)<td[^>]*class="linenos"[^>]*>.*?</td>"#,
            // Inline line-number labels.
            r#"<span[^>]*class="linenos?(?:\s+special)?"[^>]*>[^<]*</span>"#,
            r#"<span[^>]*style="color:\s*#37474F[^"]*"[^>]*>\s*\d+\s*</span>"#,
            // Empty anchor spans some formatters emit per line.
            r#"<a[^>]*></a>"#,
            // Structural wrappers.
            r#"</?(?:div|table|tbody|thead|tr|td|th|pre|code)\b[^>]*>"#,
            // Pagination hint text.
            r#"\(continued on next page\.\.\.\)"#,
        ]
        .iter()
        .map(|p| Regex::new(p).expect("artifact pattern is valid"))
        .collect()
    })
}

fn any_tag() -> &'static Regex {
    static ANY_TAG: OnceLock<Regex> = OnceLock::new();
    // Only tags a highlighter writes, with well-formed attributes, so that
    // comparisons and generics in source text survive.
    ANY_TAG.get_or_init(|| {
        Regex::new(
            r#"</?(?:span|div|pre|code|table|tbody|thead|tr|td|th|a|br|font|b|i|em|strong)(?:\s+[A-Za-z_:][-A-Za-z0-9_:.]*(?:\s*=\s*(?:"[^"]*"|'[^']*'))?)*\s*/?>"#,
        )
        .expect("tag pattern is valid")
    })
}

fn apply<'a, 't>(
    patterns: impl IntoIterator<Item = &'a Regex>,
    text: &'t str,
) -> (Cow<'t, str>, usize) {
    let mut out = Cow::Borrowed(text);
    let mut stripped = 0;
    for re in patterns {
        let count = re.find_iter(&out).count();
        if count > 0 {
            stripped += count;
            out = Cow::Owned(re.replace_all(&out, "").into_owned());
        }
    }
    (out, stripped)
}

/// Remove structural wrappers and generated labels from highlighter markup.
/// Returns the cleaned text and the number of artifacts removed.
pub fn strip_structural(markup: &str) -> (Cow<'_, str>, usize) {
    apply(structural_patterns(), markup)
}

/// Remove every known artifact, then any remaining tag.
pub fn strip_artifacts(text: &str) -> (Cow<'_, str>, usize) {
    if !text.contains('<') && !text.contains("(continued") {
        return (Cow::Borrowed(text), 0);
    }
    apply(structural_patterns().iter().chain([any_tag()]), text)
}

/// Split a segment into its tag code and the rest, if it starts with a known
/// two-character code.
fn split_tag(segment: &str) -> Option<(ColorTag, &str)> {
    let (boundary, _) = segment.char_indices().nth(2).unwrap_or((segment.len(), ' '));
    if segment[..boundary].chars().count() < 2 {
        return None;
    }
    let tag = ColorTag::from_code(&segment[..boundary])?;
    Some((tag, &segment[boundary..]))
}

/// Decode one line of marker-encoded text into runs.
///
/// Sentinels come in pairs around a tagged span, so segments at odd indices
/// of the split may carry a tag code. A segment whose first two characters
/// aren't a known code stays literal, code characters included. Empty
/// segments produce nothing.
pub fn decode_line(encoded: &str) -> Line {
    let (cleaned, stripped) = strip_artifacts(encoded);
    if stripped > 0 {
        tracing::debug!(target: "markup", stripped, "residual_artifacts_stripped");
    }

    let mut line = Line::default();
    for (i, segment) in cleaned.split(SENTINEL).enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i % 2 == 1 {
            if let Some((tag, text)) = split_tag(segment) {
                line.push(&unescape_entities(text), Some(tag));
                continue;
            }
        }
        line.push(&unescape_entities(segment), None);
    }
    line
}

/// Decode a whole marker-encoded text, one [`Line`] per input line.
pub fn decode(encoded: &str) -> Vec<Line> {
    encoded.lines().map(decode_line).collect()
}
