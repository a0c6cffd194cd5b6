//! The template directives, recognized by element name.

use anode::{Element, Node};

pub const V_ATTR: &str = "v";
pub const VAR_ATTR: &str = "var";
pub const VAL_ATTR: &str = "val";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `<if v="path">`: children if the value is truthy.
    If,
    /// `<nif v="path">`: children if it is not.
    Nif,
    /// `<for v="path">`: children once per item, `.` bound to the item.
    For,
    /// `<let var="name" val="path">`: children with `name` bound.
    Let,
    /// `<v>path</v>`: the value as text.
    V,
}

impl Directive {
    /// Namespaces are not looked at.
    pub fn of(e: &Element) -> Option<Directive> {
        match e.tag() {
            "if" => Some(Directive::If),
            "nif" => Some(Directive::Nif),
            "for" => Some(Directive::For),
            "let" => Some(Directive::Let),
            "v" => Some(Directive::V),
            _ => None
        }
    }
}

/// The path of a `v` element: the text of its first child, if that
/// is a text node.
pub fn value_path(e: &Element) -> Option<&str> {
    match e.body().first()? {
        Node::Text(s) => Some(s.as_str()),
        _ => None
    }
}

/// The path in the `v` attribute of `if`, `nif` and `for`; a missing
/// attribute counts as an empty (unresolvable) path.
pub fn v_attr(e: &Element) -> &str {
    e.get_attr(V_ATTR).unwrap_or("")
}
