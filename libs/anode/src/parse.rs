//! Build a `Node` tree from an HTML fragment, using the html5gum
//! tokenizer.
//!
//! This is not an HTML5 tree builder: there are no implicit end tags
//! (except for void elements and when closing an outer element), and
//! no foster parenting. The content of `script`, `style`, `textarea`
//! and the like is tokenized as text (html5gum's naive state
//! switching), so it never contains elements. Attributes come out
//! sorted by name, since that's how the tokenizer hands them over.

use anyhow::Result;
use html5gum::{DefaultEmitter, HtmlString, Token, Tokenizer};
use kstring::KString;

use crate::{Attribute, Element, Node, meta::is_void_element, warn};

/// This can't be replaced with `ks` or the MyFrom trait, because it
/// can fail.
fn kstring(s: HtmlString) -> Result<KString> {
    Ok(KString::from_string(String::from_utf8(s.0)?))
}

struct Frame {
    tag: KString,
    attr: Vec<Attribute>,
    body: Vec<Node>,
}

impl Frame {
    fn into_node(self) -> Node {
        Node::Element(Element {
            tag: self.tag,
            namespace: KString::from_static(""),
            attr: self.attr,
            body: self.body,
        })
    }
}

fn push_text(body: &mut Vec<Node>, s: KString) {
    if let Some(Node::Text(prev)) = body.last_mut() {
        let mut joined = String::from(prev.as_str());
        joined.push_str(&s);
        *prev = KString::from_string(joined);
    } else {
        body.push(Node::Text(s));
    }
}

/// Parse `s` into a `Node::Document` holding the top-level nodes.
pub fn parse_fragment(s: &str) -> Result<Node> {
    let mut toplevel: Vec<Node> = Vec::new();
    let mut context: Vec<Frame> = Vec::new();

    macro_rules! current_body {
        () => {
            match context.last_mut() {
                Some(frame) => &mut frame.body,
                None => &mut toplevel,
            }
        }
    }

    let mut emitter = DefaultEmitter::default();
    emitter.switch_states(true);
    for token in Tokenizer::new_with_emitter(s, emitter).infallible() {
        match token {
            Token::StartTag(starttag) => {
                let tag = kstring(starttag.name)?;
                let mut attr = Vec::new();
                for (k, v) in starttag.attributes {
                    attr.push(Attribute {
                        namespace: KString::from_static(""),
                        key: kstring(k)?,
                        val: kstring(v)?,
                    });
                }
                let frame = Frame { tag, attr, body: Vec::new() };
                if starttag.self_closing || is_void_element(&frame.tag) {
                    current_body!().push(frame.into_node());
                } else {
                    context.push(frame);
                }
            }
            Token::EndTag(endtag) => {
                let tag = kstring(endtag.name)?;
                if let Some(pos) = context.iter().rposition(|f| f.tag == tag) {
                    while context.len() > pos {
                        let frame = context.pop().expect("len > pos >= 0");
                        current_body!().push(frame.into_node());
                    }
                } else if !is_void_element(&tag) {
                    warn!("ignoring end tag </{}> without matching start tag", tag.as_str());
                }
            }
            Token::String(s) => {
                push_text(current_body!(), kstring(s)?);
            }
            Token::Comment(s) => {
                current_body!().push(Node::Comment(kstring(s)?));
            }
            Token::Doctype(doctype) => {
                current_body!().push(Node::Doctype(kstring(doctype.name)?));
            }
            Token::Error(e) => {
                warn!("HTML5 parsing error: {e}, continuing");
            }
        }
    }

    while let Some(frame) = context.pop() {
        current_body!().push(frame.into_node());
    }
    Ok(Node::Document(toplevel))
}
