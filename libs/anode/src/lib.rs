//! Markup dom abstraction: owned node trees, serialization to HTML,
//! and (via `parse`) building trees from HTML fragments.
//!
//! Every `Node` owns its children; trees can be cloned and compared
//! freely. Templating output is always freshly built.

pub mod myfrom;
pub mod env;
pub mod warn;
pub mod meta;
pub mod parse;

use std::io::Write;

use anyhow::Result;
use kstring::KString;

pub use crate::parse::parse_fragment;
use crate::{meta::{is_void_element, is_raw_text_element}, myfrom::MyFrom};

pub fn ks<T>(s: T) -> KString
where KString: MyFrom<T>
{
    KString::myfrom(s)
}

/// An attribute of an `Element`. `namespace` is empty for plain HTML
/// attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: KString,
    pub key: KString,
    pub val: KString,
}

impl Attribute {
    pub fn new<N, K, V>(namespace: N, key: K, val: V) -> Attribute
    where KString: MyFrom<N> + MyFrom<K> + MyFrom<V>
    {
        Attribute {
            namespace: ks(namespace),
            key: ks(key),
            val: ks(val),
        }
    }
}

/// Attribute without a namespace.
pub fn att<K, V>(key: K, val: V) -> Attribute
where KString: MyFrom<K> + MyFrom<V>
{
    Attribute::new("", key, val)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: KString,
    pub namespace: KString,
    pub attr: Vec<Attribute>,
    pub body: Vec<Node>,
}

impl Element {
    pub fn tag(&self) -> &str { &self.tag }
    pub fn attr(&self) -> &[Attribute] { &self.attr }
    pub fn body(&self) -> &[Node] { &self.body }

    /// First attribute with the given key, ignoring namespaces.
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attr.iter().find(|a| a.key == key).map(|a| a.val.as_str())
    }

    /// Same tag, namespace and attributes, but an empty body.
    pub fn shallow_clone(&self) -> Element {
        Element {
            tag: self.tag.clone(),
            namespace: self.namespace.clone(),
            attr: self.attr.clone(),
            body: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Document(Vec<Node>),
    Element(Element),
    Text(KString),
    Comment(KString),
    /// The name part of a `<!DOCTYPE name>` declaration.
    Doctype(KString),
}

impl Node {
    pub fn element<T, N>(tag: T, namespace: N, attr: Vec<Attribute>, body: Vec<Node>) -> Node
    where KString: MyFrom<T> + MyFrom<N>
    {
        Node::Element(Element {
            tag: ks(tag),
            namespace: ks(namespace),
            attr,
            body,
        })
    }

    pub fn text<T>(s: T) -> Node
    where KString: MyFrom<T>
    {
        Node::Text(ks(s))
    }

    pub fn comment<T>(s: T) -> Node
    where KString: MyFrom<T>
    {
        Node::Comment(ks(s))
    }

    pub fn doctype<T>(s: T) -> Node
    where KString: MyFrom<T>
    {
        Node::Doctype(ks(s))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None
        }
    }

    /// The children of documents and elements; empty for the other
    /// node types.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document(body) => body,
            Node::Element(e) => &e.body,
            Node::Text(_) | Node::Comment(_) | Node::Doctype(_) => &[],
        }
    }
}


/// Write `bytes` to `out`, replacing the characters that are special
/// in HTML text and attribute values. `bytes` must be UTF-8.
pub fn html_escape(bytes: &[u8], out: &mut impl Write) -> std::io::Result<()> {
    let mut start = 0;
    for (i, b) in bytes.iter().enumerate() {
        let rep: &[u8] = match b {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' => b"&quot;",
            b'\'' => b"&#39;",
            _ => continue
        };
        out.write_all(&bytes[start..i])?;
        out.write_all(rep)?;
        start = i + 1;
    }
    out.write_all(&bytes[start..])
}

pub trait Print {
    /// Print serialized HTML.
    fn print_html_fragment(&self, out: &mut impl Write) -> Result<()>;

    /// Print plain text, completely *ignoring* markup (comments and
    /// doctypes are dropped, too).
    fn print_plain(&self, out: &mut String);

    fn to_html_fragment_string(&self) -> String {
        let mut v = Vec::new();
        self.print_html_fragment(&mut v).expect("no I/O errors can happen");
        // Safe because v was filled from bytes derived from str
        // values and ASCII byte string literals that were simply
        // concatenated together.
        unsafe { String::from_utf8_unchecked(v) }
    }

    fn to_plain_string(&self) -> String {
        let mut s = String::new();
        self.print_plain(&mut s);
        s
    }
}

impl Attribute {
    /// Print as `key="val"`, with the namespace prefixed if present.
    pub fn print_html(&self, out: &mut impl Write) -> Result<()> {
        if !self.namespace.is_empty() {
            out.write_all(self.namespace.as_bytes())?;
            out.write_all(b":")?;
        }
        out.write_all(self.key.as_bytes())?; // XX no escape ever needed?
        out.write_all(b"=\"")?;
        html_escape(self.val.as_bytes(), out)?;
        out.write_all(b"\"")?;
        Ok(())
    }
}

impl Print for Node {
    fn print_html_fragment(&self, out: &mut impl Write) -> Result<()> {
        match self {
            Node::Document(body) => body.print_html_fragment(out)?,
            Node::Element(e) => e.print_html_fragment(out)?,
            Node::Text(s) => html_escape(s.as_bytes(), out)?,
            Node::Comment(s) => {
                out.write_all(b"<!--")?;
                out.write_all(s.as_bytes())?;
                out.write_all(b"-->")?;
            }
            Node::Doctype(s) => {
                out.write_all(b"<!DOCTYPE ")?;
                out.write_all(s.as_bytes())?;
                out.write_all(b">")?;
            }
        }
        Ok(())
    }

    fn print_plain(&self, out: &mut String) {
        match self {
            Node::Document(body) => body.print_plain(out),
            Node::Element(e) => e.print_plain(out),
            Node::Text(s) => out.push_str(s),
            Node::Comment(_) | Node::Doctype(_) => (),
        }
    }
}

impl Print for Element {
    fn print_html_fragment(&self, out: &mut impl Write) -> Result<()> {
        out.write_all(b"<")?;
        out.write_all(self.tag.as_bytes())?;
        for att in &self.attr {
            out.write_all(b" ")?;
            att.print_html(out)?;
        }
        out.write_all(b">")?;
        if is_void_element(&self.tag) {
            return Ok(())
        }
        if is_raw_text_element(&self.tag) {
            for node in &self.body {
                match node {
                    Node::Text(s) => out.write_all(s.as_bytes())?,
                    _ => node.print_html_fragment(out)?,
                }
            }
        } else {
            self.body.print_html_fragment(out)?;
        }
        out.write_all(b"</")?;
        out.write_all(self.tag.as_bytes())?;
        out.write_all(b">")?;
        Ok(())
    }

    fn print_plain(&self, out: &mut String) {
        self.body.print_plain(out)
    }
}

impl Print for [Node] {
    fn print_html_fragment(&self, out: &mut impl Write) -> Result<()> {
        for node in self {
            node.print_html_fragment(out)?;
        }
        Ok(())
    }

    fn print_plain(&self, out: &mut String) {
        for node in self {
            node.print_plain(out);
        }
    }
}

impl Print for Vec<Node> {
    fn print_html_fragment(&self, out: &mut impl Write) -> Result<()> {
        self.as_slice().print_html_fragment(out)
    }

    fn print_plain(&self, out: &mut String) {
        self.as_slice().print_plain(out)
    }
}
