//! The little bit of HTML element knowledge that serialization and
//! parsing need.

use std::collections::HashSet;

use lazy_static::lazy_static;

// https://html.spec.whatwg.org/multipage/syntax.html#void-elements
const VOID_ELEMENT_NAMES: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "param", "source", "track", "wbr",
];

// Elements whose text content is serialized without escaping.
const RAW_TEXT_ELEMENT_NAMES: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script",
    "style", "xmp",
];

lazy_static!{
    static ref VOID_ELEMENTS: HashSet<&'static str> =
        VOID_ELEMENT_NAMES.iter().copied().collect();
    static ref RAW_TEXT_ELEMENTS: HashSet<&'static str> =
        RAW_TEXT_ELEMENT_NAMES.iter().copied().collect();
}

/// Elements without closing tag (and without body).
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(tag)
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(tag)
}
