//! Highlighter token classes to [`ColorTag`].
//!
//! Two vocabularies are understood: Pygments short CSS classes (`k`, `s2`,
//! `nf`, ...) and TextMate scope names, either dotted
//! (`keyword.operator.rust`) or space-separated as syntect's classed HTML
//! writes them (`keyword operator rust`). Anything else maps to `None`.

use crate::style::ColorTag;

/// Map a `class` attribute value to a color tag.
pub fn tag_for_class(class: &str) -> Option<ColorTag> {
    let mut atoms = class.split_whitespace().peekable();
    let first = atoms.next()?;
    if atoms.peek().is_none() && !first.contains('.') {
        if let Some(tag) = pygments_tag(first) {
            return Some(tag);
        }
    }
    let scope = class.split_whitespace().collect::<Vec<_>>().join(".");
    scope_tag(&scope)
}

fn pygments_tag(class: &str) -> Option<ColorTag> {
    let tag = match class {
        "c" | "c1" | "cm" | "ch" | "cs" | "cp" | "cpf" => ColorTag::Comment,
        "s" | "s1" | "s2" | "sa" | "sb" | "sc" | "sd" | "se" | "sh" | "si" | "sx" | "sr"
        | "ss" | "dl" => ColorTag::String,
        "k" | "kc" | "kd" | "kn" | "kp" | "kr" | "kt" => ColorTag::Keyword,
        "n" | "na" | "nx" | "nv" | "nl" | "nd" | "vc" | "vg" | "vi" | "vm" => ColorTag::Name,
        "nb" | "bp" => ColorTag::Builtin,
        "nf" | "fm" => ColorTag::Function,
        "nc" | "ne" => ColorTag::ClassName,
        "nn" => ColorTag::Namespace,
        "o" => ColorTag::Operator,
        "ow" => ColorTag::OperatorWord,
        "p" => ColorTag::Punctuation,
        "m" | "mi" | "mf" | "mh" | "mo" | "mb" | "il" => ColorTag::Number,
        _ => return None,
    };
    Some(tag)
}

/// True when `scope` is `prefix` or starts with `prefix.`.
fn in_scope(scope: &str, prefix: &str) -> bool {
    scope
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

fn scope_tag(scope: &str) -> Option<ColorTag> {
    const TABLE: &[(&str, ColorTag)] = &[
        ("comment", ColorTag::Comment),
        ("string", ColorTag::String),
        ("constant.numeric", ColorTag::Number),
        ("constant.language", ColorTag::Keyword),
        ("keyword.operator.word", ColorTag::OperatorWord),
        ("keyword.operator.logical", ColorTag::OperatorWord),
        ("keyword.operator", ColorTag::Operator),
        ("keyword", ColorTag::Keyword),
        ("storage", ColorTag::Keyword),
        ("entity.name.function", ColorTag::Function),
        ("variable.function", ColorTag::Function),
        ("support.function", ColorTag::Builtin),
        ("support.type", ColorTag::Builtin),
        ("support.class", ColorTag::Builtin),
        ("entity.name.class", ColorTag::ClassName),
        ("entity.name.struct", ColorTag::ClassName),
        ("entity.name.type", ColorTag::ClassName),
        ("entity.name.enum", ColorTag::ClassName),
        ("entity.name.trait", ColorTag::ClassName),
        ("entity.name.interface", ColorTag::ClassName),
        ("entity.name.namespace", ColorTag::Namespace),
        ("entity.name.module", ColorTag::Namespace),
        ("entity.other.attribute-name", ColorTag::Name),
        ("variable", ColorTag::Name),
        ("punctuation", ColorTag::Punctuation),
    ];
    TABLE
        .iter()
        .find(|(prefix, _)| in_scope(scope, prefix))
        .map(|&(_, tag)| tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pygments_classes() {
        assert_eq!(tag_for_class("c1"), Some(ColorTag::Comment));
        assert_eq!(tag_for_class("s2"), Some(ColorTag::String));
        assert_eq!(tag_for_class("kd"), Some(ColorTag::Keyword));
        assert_eq!(tag_for_class("nf"), Some(ColorTag::Function));
        assert_eq!(tag_for_class("nc"), Some(ColorTag::ClassName));
        assert_eq!(tag_for_class("ow"), Some(ColorTag::OperatorWord));
        assert_eq!(tag_for_class("mi"), Some(ColorTag::Number));
        assert_eq!(tag_for_class("w"), None);
        assert_eq!(tag_for_class("err"), None);
    }

    #[test]
    fn syntect_spaced_scopes() {
        assert_eq!(tag_for_class("comment line double-slash rust"), Some(ColorTag::Comment));
        assert_eq!(tag_for_class("keyword operator logical python"), Some(ColorTag::OperatorWord));
        assert_eq!(tag_for_class("keyword operator arithmetic rust"), Some(ColorTag::Operator));
        assert_eq!(tag_for_class("storage type function rust"), Some(ColorTag::Keyword));
        assert_eq!(tag_for_class("entity name function rust"), Some(ColorTag::Function));
        assert_eq!(tag_for_class("entity name struct rust"), Some(ColorTag::ClassName));
        assert_eq!(tag_for_class("support function builtin python"), Some(ColorTag::Builtin));
        assert_eq!(tag_for_class("constant numeric integer decimal rust"), Some(ColorTag::Number));
        assert_eq!(tag_for_class("source rust"), None);
        assert_eq!(tag_for_class("meta function rust"), None);
    }

    #[test]
    fn dotted_scopes_need_atom_boundaries() {
        assert_eq!(tag_for_class("string.quoted.double"), Some(ColorTag::String));
        assert_eq!(tag_for_class("keywordish.thing"), None);
        assert_eq!(tag_for_class("punctuation"), Some(ColorTag::Punctuation));
    }

    #[test]
    fn empty_class() {
        assert_eq!(tag_for_class(""), None);
        assert_eq!(tag_for_class("   "), None);
    }
}
