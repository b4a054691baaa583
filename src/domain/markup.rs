//! Element helpers over the parsed markup tree.

use scraper::ElementRef;

pub const CLADE_TABLE_CLASS: &str = "clade";
pub const LABEL_CLASS: &str = "clade-label";
pub const SISTER_LABEL_CLASS: &str = "clade-slabel";
pub const LEAF_CLASS: &str = "clade-leaf";

/// Tag name and class token test, both ASCII case-insensitive.
pub fn is_tagged(el: ElementRef<'_>, tag: &str, class: &str) -> bool {
    el.value().name().eq_ignore_ascii_case(tag) && has_class(el, class)
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c.eq_ignore_ascii_case(class))
}

pub fn class_list(el: ElementRef<'_>) -> String {
    el.value().classes().collect::<Vec<_>>().join(" ")
}

/// Direct element children with the given tag name.
pub fn child_elements<'a>(el: ElementRef<'a>, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name().eq_ignore_ascii_case(tag))
}

/// Descendant elements (excluding `el` itself) with the given tag name.
pub fn descendant_elements<'a>(
    el: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name().eq_ignore_ascii_case(tag))
}

/// Text content of an element with whitespace runs collapsed and trimmed.
pub fn text_of(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

/// Non-whitespace content of the children of `el` other than `keep`.
///
/// Text nodes and the text of sibling elements both count.
pub fn stray_text(el: ElementRef<'_>, keep: ElementRef<'_>) -> Vec<String> {
    el.children()
        .filter(|node| node.id() != keep.id())
        .filter_map(|node| match node.value().as_text() {
            Some(text) => Some(normalize_ws(text)),
            None => ElementRef::wrap(node).map(text_of),
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Collapse sequences of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}
