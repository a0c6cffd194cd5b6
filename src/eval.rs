//! The interpreter: walks a template tree together with dynamic data.

use std::{borrow::Cow, convert::Infallible};

use anode::{Element, Node, ks, trace};

use crate::{directive::{Directive, value_path, v_attr, VAR_ATTR, VAL_ATTR},
            path::{Path, Navigator, resolve},
            runtime::{is_truthy, stringify},
            scope::ScopeStack,
            value::{Value, unwrap_cow}};

/// Expand `template` with `.` and `$` bound to `dot`. Non-directive
/// elements are copied (with their attributes), directives replaced
/// by what they produce.
pub fn evaluate(template: &Node, dot: Value) -> Vec<Node> {
    Evaluator::new(dot).eval(template)
}

struct ValueNavigator;

impl<'s> Navigator<'s> for ValueNavigator {
    type Binding = Value;
    type Item = Cow<'s, Value>;
    type Error = Infallible;

    fn bound(&self, binding: &'s Value) -> Result<Option<Cow<'s, Value>>, Infallible> {
        Ok(binding.unwrapped().map(Cow::Borrowed))
    }

    fn key(&self, base: Cow<'s, Value>, key: &str) -> Result<Option<Cow<'s, Value>>, Infallible> {
        Ok(match base {
            Cow::Borrowed(b) => b.index(key),
            Cow::Owned(o) => o.index(key).map(|v| Cow::Owned(v.into_owned())),
        })
    }

    fn dynamic_key(&self, base: Cow<'s, Value>, key: Option<Cow<'s, Value>>)
                   -> Result<Option<Cow<'s, Value>>, Infallible> {
        let key = key.as_deref().map(stringify).unwrap_or_default();
        self.key(base, &key)
    }
}

pub struct Evaluator {
    scope: ScopeStack<Value>,
}

impl Evaluator {
    pub fn new(dot: Value) -> Evaluator {
        Evaluator { scope: ScopeStack::with_root(dot) }
    }

    /// The value at `path`, unwrapped; `Value::Invalid` if there is
    /// nothing there.
    pub fn get(&self, path: &str) -> Value {
        let found = match Path::parse(path) {
            Some(p) => match resolve(&ValueNavigator, &self.scope, &p) {
                Ok(v) => v,
                Err(e) => match e {}
            },
            None => None
        };
        match found.and_then(unwrap_cow) {
            Some(v) => v.into_owned(),
            None => {
                trace!("path {path:?} resolves to nothing");
                Value::Invalid
            }
        }
    }

    fn with_bound<R>(&mut self, name: &str, v: Value, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scope.push(name, v);
        let r = f(self);
        self.scope.pop(name);
        r
    }

    pub fn eval(&mut self, node: &Node) -> Vec<Node> {
        let mut out = Vec::new();
        self.eval_into(node, &mut out);
        out
    }

    fn eval_children(&mut self, body: &[Node], out: &mut Vec<Node>) {
        for node in body {
            self.eval_into(node, out);
        }
    }

    fn eval_into(&mut self, node: &Node, out: &mut Vec<Node>) {
        match node {
            Node::Document(body) => self.eval_children(body, out),
            Node::Element(e) => match Directive::of(e) {
                Some(Directive::If) => {
                    if is_truthy(&self.get(v_attr(e))) {
                        self.eval_children(e.body(), out);
                    }
                }
                Some(Directive::Nif) => {
                    if !is_truthy(&self.get(v_attr(e))) {
                        self.eval_children(e.body(), out);
                    }
                }
                Some(Directive::For) => {
                    let v = self.get(v_attr(e));
                    self.eval_for(e, v, out);
                }
                Some(Directive::Let) => {
                    let var = e.get_attr(VAR_ATTR).unwrap_or("");
                    let v = self.get(e.get_attr(VAL_ATTR).unwrap_or(""));
                    self.with_bound(var, v, |this| this.eval_children(e.body(), out));
                }
                Some(Directive::V) => {
                    if let Some(path) = value_path(e) {
                        let s = stringify(&self.get(path));
                        out.push(Node::Text(ks(s)));
                    }
                }
                None => {
                    let mut elt = e.shallow_clone();
                    self.eval_children(e.body(), &mut elt.body);
                    out.push(Node::Element(elt));
                }
            },
            Node::Text(_) | Node::Comment(_) | Node::Doctype(_) => out.push(node.clone()),
        }
    }

    fn eval_for(&mut self, e: &Element, v: Value, out: &mut Vec<Node>) {
        let mut each = |this: &mut Self, item: Value| {
            this.with_bound(".", item, |this| this.eval_children(e.body(), out))
        };
        match v {
            Value::Invalid | Value::Optional(_) => (),
            Value::Seq(items) => for item in items {
                each(self, item)
            },
            Value::Markup(nodes) => for node in nodes {
                each(self, Value::Node(Box::new(node)))
            },
            Value::Map(m) => for k in m.into_keys() {
                each(self, Value::String(k))
            },
            Value::Record(r) => for k in r.field_names() {
                each(self, Value::String(k.clone()))
            },
            Value::Channel(ch) => while let Some(item) = ch.recv() {
                each(self, item)
            },
            // basic values: one round with `.` bound to the value
            v @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Node(_)) =>
                each(self, v),
        }
    }
}


#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::mpsc, thread};

    use anode::{Print, parse_fragment};
    use serde_json::json;

    use super::*;
    use crate::value::{ToValue, Channel};

    fn render(template: &str, data: Value) -> String {
        let t = parse_fragment(template).unwrap();
        evaluate(&t, data).to_html_fragment_string()
    }

    fn render_json(template: &str, data: serde_json::Value) -> String {
        render(template, Value::from(data))
    }

    fn eval_json(template: &str, data: serde_json::Value) -> Vec<Node> {
        evaluate(&parse_fragment(template).unwrap(), Value::from(data))
    }

    #[test]
    fn t_scenarios() {
        assert_eq!(eval_json("<v>.foo</v><v>.baz</v>", json!({"foo": "bar", "baz": "quux"})),
                   vec![Node::text("bar"), Node::text("quux")]);
        assert_eq!(eval_json("<for v=\".\"><v>.</v></for>", json!(["Bob", "Jim", "Fred"])),
                   vec![Node::text("Bob"), Node::text("Jim"), Node::text("Fred")]);
        assert_eq!(eval_json("<if v=\".t\">A</if><if v=\".f\">B</if>", json!({"t": true, "f": false})),
                   vec![Node::text("A")]);
        assert_eq!(eval_json("<for v=\".\">X</for>", json!([])), vec![]);
    }

    #[test]
    fn t_plain_markup() {
        assert_eq!(render_json("<div class=\"c\">hi <b>x</b></div><!--c-->", json!({})),
                   "<div class=\"c\">hi <b>x</b></div><!--c-->");
        // structurally unchanged, whatever the data
        let t = parse_fragment("<!DOCTYPE html><ul id=\"a\"><li>1</li><br></ul>").unwrap();
        assert_eq!(evaluate(&t, Value::from(json!([1, 2]))), t.children().to_vec());
    }

    #[test]
    fn t_static_script() {
        assert_eq!(render_json("", json!(null)), "");
        let t = "\n<div>\n  <script>\n    <v>abc</v>\n    <if v=\"foo\">\n    </if>\n  \
                 </script>\n</div>\n";
        assert_eq!(render_json(t, json!(null)), t);
        assert_eq!(render_json(t, json!({"foo": true, "abc": 1})), t);
    }

    #[test]
    fn t_v() {
        let d = json!({"foo": "bar", "n": 3, "nested": {"a": [10, 20]}});
        assert_eq!(render_json("<p><v>.foo</v></p>", d.clone()), "<p>bar</p>");
        assert_eq!(render_json("<v>.n</v>", d.clone()), "3");
        assert_eq!(render_json("<v>.nested.a.1</v>", d.clone()), "20");
        assert_eq!(render_json("<v>.nested.a.2</v>", d.clone()), "");
        assert_eq!(render_json("<v>.missing.x</v>", d.clone()), "");
        assert_eq!(render_json("<v> .foo\n</v>", d.clone()), "bar");
        assert_eq!(render_json("<v>.nested.a</v>", d.clone()), "[10 20]");
        assert_eq!(render_json("<v></v>", d), "");
    }

    #[test]
    fn t_v_escapes() {
        assert_eq!(render_json("<v>.</v>", json!("<b>&")), "&lt;b&gt;&amp;");
        let nodes = vec![Node::element("b", "", vec![], vec![Node::text("x")])];
        // markup values are embedded as text, too
        assert_eq!(render("<v>.</v>", nodes.to_value()), "&lt;b&gt;x&lt;/b&gt;");
    }

    #[test]
    fn t_if_nif() {
        let d = json!({"yes": true, "no": false, "empty": [], "zero": 0, "s": "x"});
        let t = |tmpl| render_json(tmpl, d.clone());
        assert_eq!(t("<if v=\".yes\">A</if><nif v=\".yes\">B</nif>"), "A");
        assert_eq!(t("<if v=\".no\">A</if><nif v=\".no\">B</nif>"), "B");
        assert_eq!(t("<if v=\".empty\">A</if><nif v=\".empty\">B</nif>"), "B");
        assert_eq!(t("<if v=\".zero\">A</if>"), "");
        assert_eq!(t("<if v=\".s\">A</if>"), "A");
        assert_eq!(t("<if v=\".missing\">A</if><nif v=\".missing\">B</nif>"), "B");
        assert_eq!(t("<if>A</if><nif>B</nif>"), "B");
        assert_eq!(t("<if v=\".\">A</if>"), "A");
    }

    #[test]
    fn t_for_seq() {
        let d = json!({"items": ["a", "b", "c"]});
        assert_eq!(render_json("<ul><for v=\".items\"><li><v>.</v></li></for></ul>", d),
                   "<ul><li>a</li><li>b</li><li>c</li></ul>");
        assert_eq!(render_json("<for v=\".\"><v>.</v></for>", json!([])), "");
        assert_eq!(render_json("<for v=\".x\">A</for>", json!({})), "");
    }

    #[test]
    fn t_for_map_dynamic_index() {
        let d = json!({"b": 2, "a": 1});
        // map iteration binds the keys, in sorted order
        assert_eq!(render_json("<for v=\".\"><v>.</v>=<v>$[.]</v>;</for>", d),
                   "a=1;b=2;");
        let d = json!({"map": {"x": "X", "y": "Y"}});
        assert_eq!(render_json("<for v=\".map\"><v>$.map[.]</v></for>", d), "XY");
    }

    #[test]
    fn t_for_basic_binds_value() {
        assert_eq!(render_json("<for v=\".n\"><v>.</v>!</for>", json!({"n": 5})), "5!");
        assert_eq!(render_json("<for v=\".s\">[<v>.</v>]</for>", json!({"s": ""})), "[]");
    }

    #[test]
    fn t_for_record_binds_field_names() {
        struct P { x: i32, y: i32 }
        crate::impl_to_value!(P { x, y });
        assert_eq!(render("<for v=\".\"><v>.</v>=<v>$[.]</v> </for>", P { x: 1, y: 2 }.to_value()),
                   "x=1 y=2 ");
    }

    #[test]
    fn t_for_channel() {
        let (tx, rx) = mpsc::channel();
        let sender = thread::spawn(move || {
            for i in 0..3 {
                tx.send(Value::from(json!(i))).unwrap();
            }
        });
        let out = render("<for v=\".\"><i><v>.</v></i></for>", Value::Channel(Channel::new(rx)));
        sender.join().unwrap();
        assert_eq!(out, "<i>0</i><i>1</i><i>2</i>");
    }

    #[test]
    fn t_let() {
        let d = json!({"user": {"name": "Ann"}, "list": [1, 2]});
        assert_eq!(render_json("<let var=\"u\" val=\".user\"><v>u.name</v></let>", d.clone()),
                   "Ann");
        // shadowing, and restoring afterwards
        assert_eq!(render_json("<let var=\"x\" val=\".list\">\
                                <for v=\"x\"><let var=\"x\" val=\".\"><v>x</v></let></for>\
                                <v>x</v></let><v>x</v>",
                               d.clone()),
                   "12[1 2]");
        // binding `.` itself
        assert_eq!(render_json("<let var=\".\" val=\".user\"><v>.name</v></let><v>.list</v>", d.clone()),
                   "Ann[1 2]");
        // `$` stays the root inside loops
        assert_eq!(render_json("<for v=\".list\"><v>$.user.name</v></for>", d.clone()),
                   "AnnAnn");
        // binding to nothing
        assert_eq!(render_json("<let var=\"z\" val=\".nope\"><if v=\"z\">A</if><v>z</v>.</let>", d),
                   ".");
    }

    #[test]
    fn t_nested_directives_in_elements() {
        let d = json!({"rows": [{"cells": [1, 2]}, {"cells": []}]});
        assert_eq!(
            render_json("<table><for v=\".rows\"><tr class=\"r\"><for v=\".cells\">\
                         <td><v>.</v></td></for><nif v=\".cells\"><td>-</td></nif>\
                         </tr></for></table>", d),
            "<table><tr class=\"r\"><td>1</td><td>2</td></tr><tr class=\"r\"><td>-</td></tr></table>");
    }

    #[test]
    fn t_dynamic_keys() {
        let d = json!({"order": ["b", "a"], "vals": {"a": 1, "b": 2}, "i": 1, "seq": [7, 8, 9]});
        let t = |tmpl| render_json(tmpl, d.clone());
        assert_eq!(t("<for v=\".order\"><v>$.vals[.]</v></for>"), "21");
        assert_eq!(t("<v>.seq[$.i]</v>"), "8");
        assert_eq!(t("<v>.seq[.order]</v>"), "");
        assert_eq!(t("<v>.vals[.nope]</v>"), "");
        assert_eq!(t("<v>.vals[]</v>"), "");
        assert_eq!(t("<v>.vals[.order.1]</v>"), "1");
    }

    #[test]
    fn t_markup_values() {
        let mut m: HashMap<&str, Vec<Node>> = HashMap::new();
        m.insert("body", vec![Node::element("b", "", vec![], vec![Node::text("x")]),
                              Node::text("y")]);
        let d = m.to_value();
        assert_eq!(render("<for v=\".body\"><if v=\".\">+</if></for>", d.clone()), "++");
        assert_eq!(render("<v>.body.1</v>", d), "y");
    }

    #[test]
    fn t_options_are_transparent() {
        struct Page { title: Option<String>, sub: Option<Box<Page>> }
        crate::impl_to_value!(Page { title, sub });
        let p = Page {
            title: Some("top".into()),
            sub: Some(Box::new(Page { title: None, sub: None })),
        };
        let d = p.to_value();
        assert_eq!(render("<v>.title</v>|<v>.sub.title</v>|<v>.sub.sub.title</v>", d.clone()),
                   "top||");
        assert_eq!(render("<if v=\".sub\">S</if><if v=\".sub.title\">T</if>", d), "S");
    }

    #[test]
    fn t_attributes_survive() {
        assert_eq!(render_json("<a href=\"/x\" id=\"i\"><v>.</v></a>", json!("t")),
                   "<a href=\"/x\" id=\"i\">t</a>");
    }
}
