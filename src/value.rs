//! Dynamic data for the interpreter.
//!
//! Host data is converted into `Value` trees via the `ToValue` trait
//! (implemented for the std types, `Node`, and, via `impl_to_value!`,
//! for user structs) or from JSON.

use std::{borrow::Cow,
          collections::{BTreeMap, HashMap, VecDeque},
          fmt::{self, Display},
          rc::Rc,
          sync::{Arc, Mutex, mpsc::Receiver}};

use anode::{Node, ks, myfrom::MyFrom};
use kstring::KString;

use crate::types::{BasicKind, Category};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    pub fn is_zero(&self) -> bool {
        match *self {
            Number::Int(i) => i == 0,
            Number::UInt(u) => u == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    pub fn kind(&self) -> BasicKind {
        match self {
            Number::Int(_) | Number::UInt(_) => BasicKind::Int,
            Number::Float(_) => BasicKind::Float,
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => i.fmt(f),
            Number::UInt(u) => u.fmt(f),
            Number::Float(x) => x.fmt(f),
        }
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Number {
        if let Some(i) = n.as_i64() {
            Number::Int(i)
        } else if let Some(u) = n.as_u64() {
            Number::UInt(u)
        } else {
            Number::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// A struct value: named fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: KString,
    fields: Vec<(KString, Value)>,
}

impl Record {
    pub fn new<T>(name: T, fields: Vec<(KString, Value)>) -> Record
    where KString: MyFrom<T>
    {
        Record { name: ks(name), fields }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn fields(&self) -> &[(KString, Value)] { &self.fields }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &KString> {
        self.fields.iter().map(|(k, _)| k)
    }
}

/// The receiving end of a channel; iteration takes values until all
/// senders are gone.
#[derive(Clone)]
pub struct Channel(Arc<Mutex<Receiver<Value>>>);

impl Channel {
    pub fn new(receiver: Receiver<Value>) -> Channel {
        Channel(Arc::new(Mutex::new(receiver)))
    }

    /// Blocks until a value arrives; `None` once the channel is
    /// closed.
    pub fn recv(&self) -> Option<Value> {
        self.0.lock().ok()?.recv().ok()
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Channel(..)")
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent value.
    Invalid,
    Bool(bool),
    Number(Number),
    String(KString),
    Seq(Vec<Value>),
    /// Maps always have string keys.
    Map(BTreeMap<KString, Value>),
    Record(Record),
    Channel(Channel),
    Optional(Option<Box<Value>>),
    Node(Box<Node>),
    /// A sequence of nodes; indexes like `Seq`, prints as markup.
    Markup(Vec<Node>),
}

impl Default for Value {
    fn default() -> Value { Value::Invalid }
}

impl Value {
    /// Strip `Optional` layers; `None` if the value is absent.
    pub fn unwrapped(&self) -> Option<&Value> {
        let mut v = self;
        loop {
            match v {
                Value::Optional(Some(inner)) => v = inner,
                Value::Optional(None) | Value::Invalid => return None,
                _ => return Some(v)
            }
        }
    }

    pub fn into_unwrapped(self) -> Option<Value> {
        let mut v = self;
        loop {
            match v {
                Value::Optional(Some(inner)) => v = *inner,
                Value::Optional(None) | Value::Invalid => return None,
                _ => return Some(v)
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.unwrapped().is_some()
    }

    /// The category of the unwrapped value, `None` if absent.
    pub fn category(&self) -> Option<Category> {
        Some(match self.unwrapped()? {
            Value::Bool(_) => Category::Basic(BasicKind::Bool),
            Value::Number(n) => Category::Basic(n.kind()),
            Value::String(_) => Category::Basic(BasicKind::String),
            Value::Node(_) => Category::Basic(BasicKind::Markup),
            Value::Seq(_) | Value::Markup(_) => Category::Sequence,
            Value::Map(_) => Category::Map,
            Value::Record(_) => Category::Record,
            Value::Channel(_) => Category::Channel,
            Value::Invalid | Value::Optional(_) => unreachable!("unwrapped"),
        })
    }

    /// Access by string key, dispatching on the category: sequences
    /// take decimal indices, maps keys, records field names. The
    /// result is unwrapped; `None` if there is nothing there.
    pub fn index(&self, key: &str) -> Option<Cow<'_, Value>> {
        let found = match self.unwrapped()? {
            Value::Seq(items) => Cow::Borrowed(items.get(key.parse::<usize>().ok()?)?),
            Value::Markup(nodes) => {
                let node = nodes.get(key.parse::<usize>().ok()?)?;
                Cow::Owned(Value::Node(Box::new(node.clone())))
            }
            Value::Map(m) => Cow::Borrowed(m.get(key)?),
            Value::Record(r) => Cow::Borrowed(r.field(key)?),
            _ => return None
        };
        unwrap_cow(found)
    }
}

pub fn unwrap_cow(v: Cow<'_, Value>) -> Option<Cow<'_, Value>> {
    match v {
        Cow::Borrowed(b) => b.unwrapped().map(Cow::Borrowed),
        Cow::Owned(o) => o.into_unwrapped().map(Cow::Owned),
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Value {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Invalid,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => Value::Number(Number::from(&n)),
            J::String(s) => Value::String(KString::from_string(s)),
            J::Array(a) => Value::Seq(a.into_iter().map(Value::from).collect()),
            J::Object(o) => Value::Map(
                o.into_iter()
                    .map(|(k, v)| (KString::from_string(k), Value::from(v)))
                    .collect()),
        }
    }
}


/// Conversion of host data into `Value`s.
pub trait ToValue {
    fn to_value(&self) -> Value;

    /// How a sequence of `Self` is represented; only `Node` differs
    /// from the default.
    fn seq_to_value<'a>(items: impl Iterator<Item = &'a Self>) -> Value
    where Self: Sized + 'a
    {
        Value::Seq(items.map(|v| v.to_value()).collect())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value { self.clone() }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value { Value::from(self.clone()) }
}

impl ToValue for bool {
    fn to_value(&self) -> Value { Value::Bool(*self) }
}

macro_rules! number_to_value {
    { $variant:ident, $as:ty, $($t:ident)* } => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::Number(Number::$variant(*self as $as))
                }
            }
        )*
    }
}
number_to_value!{Int, i64, i8 i16 i32 i64 isize}
number_to_value!{UInt, u64, u8 u16 u32 u64 usize}

impl ToValue for f64 {
    fn to_value(&self) -> Value { Value::Number(Number::Float(*self)) }
}

impl ToValue for f32 {
    // Go via the shortest decimal representation so that the value
    // prints the same as the f32 does.
    fn to_value(&self) -> Value {
        Value::Number(Number::Float(self.to_string().parse().unwrap_or(f64::NAN)))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value { Value::String(KString::from_ref(self)) }
}

impl ToValue for String {
    fn to_value(&self) -> Value { Value::String(KString::from_ref(self)) }
}

impl ToValue for KString {
    fn to_value(&self) -> Value { Value::String(self.clone()) }
}

impl<'t> ToValue for Cow<'t, str> {
    fn to_value(&self) -> Value { Value::String(KString::from_ref(self)) }
}

impl ToValue for Node {
    fn to_value(&self) -> Value { Value::Node(Box::new(self.clone())) }

    fn seq_to_value<'a>(items: impl Iterator<Item = &'a Self>) -> Value
    where Self: Sized + 'a
    {
        Value::Markup(items.cloned().collect())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        Value::Optional(self.as_ref().map(|v| Box::new(v.to_value())))
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value { (**self).to_value() }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value { (**self).to_value() }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self) -> Value { (**self).to_value() }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value { (**self).to_value() }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value { T::seq_to_value(self.iter()) }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value { T::seq_to_value(self.iter()) }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value { T::seq_to_value(self.iter()) }
}

impl<T: ToValue> ToValue for VecDeque<T> {
    fn to_value(&self) -> Value { T::seq_to_value(self.iter()) }
}

impl<K: AsRef<str>, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter()
                   .map(|(k, v)| (KString::from_ref(k.as_ref()), v.to_value()))
                   .collect())
    }
}

impl<K: AsRef<str>, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter()
                   .map(|(k, v)| (KString::from_ref(k.as_ref()), v.to_value()))
                   .collect())
    }
}

/// Implement `ToValue` for a struct, listing the fields that
/// templates may access (usually all of them, in declaration order,
/// to match what the compiler sees).
///
/// ```
/// struct Item { title: String, count: u32 }
/// htmpl::impl_to_value!(Item { title, count });
/// ```
#[macro_export]
macro_rules! impl_to_value {
    { $ty:ident { $($field:tt),* $(,)? } } => {
        impl $crate::ToValue for $ty {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::Record($crate::Record::new(
                    stringify!($ty),
                    vec![
                        $(($crate::KString::from_static(stringify!($field)),
                           $crate::ToValue::to_value(&self.$field))),*
                    ]))
            }
        }
    }
}
