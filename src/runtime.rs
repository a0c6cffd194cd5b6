//! Truthiness and stringification, shared by the interpreter and by
//! the code that the compiler generates (which calls the `fmt_*`
//! functions here, so that both print compound values alike).

use std::fmt::Display;

use anode::{Node, Print};
use itertools::Itertools;

use crate::value::Value;

/// Absent values are false, sequences are true when non-empty, maps,
/// records, channels and nodes always, other values when non-zero or
/// non-empty.
pub fn is_truthy(v: &Value) -> bool {
    match v.unwrapped() {
        None => false,
        Some(v) => match v {
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Seq(items) => !items.is_empty(),
            Value::Markup(nodes) => !nodes.is_empty(),
            Value::Map(_) | Value::Record(_) | Value::Channel(_) | Value::Node(_) => true,
            Value::Invalid | Value::Optional(_) => false,
        }
    }
}

/// The text that `<v>` puts into the output for `v`.
pub fn stringify(v: &Value) -> String {
    match v.unwrapped() {
        None => String::new(),
        Some(v) => match v {
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.to_string(),
            Value::Seq(items) => fmt_seq(items.iter().map(stringify)),
            Value::Markup(nodes) => render_markup(nodes),
            Value::Node(node) => render_markup(std::iter::once(&**node)),
            Value::Map(m) => fmt_map(m.iter().map(|(k, v)| (k.to_string(), stringify(v)))),
            Value::Record(r) => fmt_record(r.fields().iter().map(|(_, v)| stringify(v))),
            Value::Channel(_) => fmt_channel(),
            Value::Invalid | Value::Optional(_) => String::new(),
        }
    }
}

/// `[a b c]`
pub fn fmt_seq<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    format!("[{}]", items.into_iter().join(" "))
}

/// `map[k1:v1 k2:v2]`, sorted by key.
pub fn fmt_map(entries: impl IntoIterator<Item = (String, String)>) -> String {
    let entries = entries.into_iter()
        .sorted()
        .map(|(k, v)| format!("{k}:{v}"))
        .join(" ");
    format!("map[{entries}]")
}

/// `{v1 v2}`, field values in declaration order.
pub fn fmt_record<T: Display>(fields: impl IntoIterator<Item = T>) -> String {
    format!("{{{}}}", fields.into_iter().join(" "))
}

pub fn fmt_channel() -> String {
    String::from("<channel>")
}

/// Nodes serialized as HTML.
pub fn render_markup<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> String {
    nodes.into_iter().map(|n| n.to_html_fragment_string()).collect()
}


#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use anode::ks;
    use serde_json::json;

    use super::*;
    use crate::value::{ToValue, Record};

    #[test]
    fn t_is_truthy() {
        let t = |j| is_truthy(&Value::from(j));
        assert!(!t(json!(null)));
        assert!(!t(json!(false)));
        assert!(t(json!(true)));
        assert!(!t(json!(0)));
        assert!(!t(json!(0.0)));
        assert!(t(json!(-1)));
        assert!(!t(json!("")));
        assert!(t(json!("0")));
        assert!(!t(json!([])));
        assert!(t(json!([0])));
        assert!(t(json!({})));
        assert!(is_truthy(&Value::Record(Record::new("Empty", vec![]))));
        assert!(!is_truthy(&None::<u8>.to_value()));
        assert!(is_truthy(&Some(1).to_value()));
        assert!(!is_truthy(&Vec::<Node>::new().to_value()));
        assert!(is_truthy(&Node::text("").to_value()));
    }

    #[test]
    fn t_stringify() {
        let s = |j| stringify(&Value::from(j));
        assert_eq!(s(json!(null)), "");
        assert_eq!(s(json!(42)), "42");
        assert_eq!(s(json!(7.0)), "7");
        assert_eq!(s(json!(1.5)), "1.5");
        assert_eq!(s(json!("<b>")), "<b>");
        assert_eq!(s(json!(true)), "true");
        assert_eq!(s(json!([1, "a", [2, 3]])), "[1 a [2 3]]");
        assert_eq!(s(json!([])), "[]");
        assert_eq!(s(json!({"b": 2, "a": [1]})), "map[a:[1] b:2]");
        assert_eq!(s(json!([null, 1])), "[ 1]");
        let r = Value::Record(Record::new("P", vec![(ks("x"), 1.to_value()),
                                                    (ks("y"), "z".to_value())]));
        assert_eq!(stringify(&r), "{1 z}");
        let mut m = BTreeMap::new();
        m.insert("k", vec![Node::element("b", "", vec![], vec![Node::text("x")])]);
        assert_eq!(stringify(&m.to_value()), "map[k:<b>x</b>]");
    }
}
