//! Path resolution at compile time: instead of values, the results
//! are Rust expressions together with the (structural) type of what
//! they evaluate to.

use std::collections::HashSet;

use anode::trace;
use itertools::Itertools;
use lazy_static::lazy_static;

use crate::{error::CompileError,
            path::Navigator,
            types::{BasicKind, TypeDesc, TypeResolver}};

/// A Rust expression: of type `&T` (with `T` described by `ty`), or
/// `Option<&T>` if `fallible`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub code: String,
    pub ty: TypeDesc,
    pub fallible: bool,
}

impl Resolved {
    pub fn new(code: impl Into<String>, ty: TypeDesc) -> Resolved {
        Resolved { code: code.into(), ty, fallible: false }
    }
}

/// What template variables are bound to during compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A `let` whose value could not be resolved.
    Absent,
    Bound(Resolved),
}

/// Wrap `code` in parentheses unless it's a plain identifier.
pub fn paren(code: &str) -> String {
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        code.to_string()
    } else {
        format!("({code})")
    }
}

lazy_static!{
    /// Keywords that need the `r#` prefix when used as field names.
    static ref KEYWORDS: HashSet<&'static str> = [
        "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match",
        "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "trait",
        "true", "type", "unsafe", "use", "where", "while", "abstract", "become",
        "box", "do", "final", "macro", "override", "priv", "try", "typeof",
        "unsized", "virtual", "yield",
    ].into_iter().collect();
}

/// How a field named `name` is written in a field access.
pub fn field_ident(name: &str) -> String {
    if KEYWORDS.contains(name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// A Rust identifier for the template variable `name` (which may be
/// `.` or `$` or anything else).
pub fn var_ident(name: &str) -> String {
    let mut s = String::from("var_");
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            s.push(c);
        } else if c == '_' {
            s.push_str("__");
        } else {
            s.push_str(&format!("_{:x}_", c as u32));
        }
    }
    s
}

/// Apply an access to `base`. `f` receives the (parenthesized)
/// expression for the `&T`, and returns an expression for the `&U`,
/// or `Option<&U>` if `yields_option`.
fn lift(base: &Resolved, ty: TypeDesc, yields_option: bool,
        f: impl Fn(&str) -> String) -> Resolved {
    let code = match (base.fallible, yields_option) {
        (false, _) => f(&paren(&base.code)),
        (true, false) => format!("{}.map(|v| {})", paren(&base.code), f("v")),
        (true, true) => format!("{}.and_then(|v| {})", paren(&base.code), f("v")),
    };
    Resolved { code, ty, fallible: base.fallible || yields_option }
}

fn unexpected(ty: &TypeDesc, what: &str) -> CompileError {
    CompileError::Internal(format!("{what} on type that was not unwrapped: {ty:?}"))
}

pub fn opaque(name: &str, what: &str) -> CompileError {
    CompileError::Unsupported(format!("can't {what} values of type {name}, \
                                       which templates can't look into"))
}

pub struct ExprNavigator<'r> {
    pub resolver: &'r dyn TypeResolver,
    /// Path of the runtime crate in the generated code.
    pub rt: &'r str,
}

impl<'r> ExprNavigator<'r> {
    /// Strip optionals, pointers and names, until a type with a
    /// category is reached.
    pub fn unwrap(&self, mut r: Resolved) -> Result<Resolved, CompileError> {
        loop {
            r = match r.ty.clone() {
                TypeDesc::Named(name) => Resolved {
                    ty: TypeDesc::Named(name).resolve_names(self.resolver)?,
                    ..r
                },
                TypeDesc::Optional(inner) =>
                    lift(&r, *inner, true, |b| format!("{b}.as_ref()")),
                TypeDesc::Pointer(inner) =>
                    lift(&r, *inner, false, |b| format!("&**{b}")),
                _ => return Ok(r)
            }
        }
    }

    /// Whether map keys of type `key` can be looked up by `&str`;
    /// paths into other maps are absent.
    fn string_keyed(&self, key: &TypeDesc) -> Result<bool, CompileError> {
        let mut key = key.resolve_names(self.resolver)?;
        while let TypeDesc::Pointer(inner) = key {
            key = inner.resolve_names(self.resolver)?;
        }
        if key == TypeDesc::Basic(BasicKind::String) {
            Ok(true)
        } else {
            trace!("map with {key:?} keys is not accessible by path");
            Ok(false)
        }
    }

    /// Expression for the truthiness (a `bool`) of `r`.
    pub fn truthy(&self, r: &Resolved) -> Result<String, CompileError> {
        if r.fallible {
            let cond = truthy_of("v", &r.ty)?;
            Ok(if cond == "true" {
                format!("{}.is_some()", paren(&r.code))
            } else {
                format!("{}.map_or(false, |v| {cond})", paren(&r.code))
            })
        } else {
            truthy_of(&r.code, &r.ty)
        }
    }

    /// Expression for the text of `r` (a `String`), printing the same
    /// as `runtime::stringify` does for the corresponding `Value`.
    pub fn stringify(&self, r: &Resolved) -> Result<String, CompileError> {
        let mut visiting = Vec::new();
        if r.fallible {
            let s = self.stringify_of("v", &r.ty, &mut visiting)?;
            Ok(format!("{}.map(|v| {s}).unwrap_or_default()", paren(&r.code)))
        } else {
            self.stringify_of(&r.code, &r.ty, &mut visiting)
        }
    }

    fn stringify_of(&self, x: &str, ty: &TypeDesc, visiting: &mut Vec<String>)
                    -> Result<String, CompileError> {
        let rt = self.rt;
        let x = paren(x);
        Ok(match ty {
            TypeDesc::Basic(BasicKind::Markup) =>
                format!("{rt}::runtime::render_markup(std::iter::once({x}))"),
            TypeDesc::Basic(_) =>
                format!("{x}.to_string()"),
            TypeDesc::Array { elem, .. } | TypeDesc::Slice(elem) => {
                if ty.is_markup_seq(self.resolver)? {
                    format!("{rt}::runtime::render_markup({x}.iter())")
                } else {
                    let s = self.stringify_of("v", elem, visiting)?;
                    format!("{rt}::runtime::fmt_seq({x}.iter().map(|v| {s}))")
                }
            }
            TypeDesc::Map { elem, .. } => {
                let s = self.stringify_of("v", elem, visiting)?;
                format!("{rt}::runtime::fmt_map({x}.iter().map(|(k, v)| (k.to_string(), {s})))")
            }
            TypeDesc::Record { fields, .. } => {
                if fields.is_empty() {
                    format!("{rt}::runtime::fmt_record(Vec::<String>::new())")
                } else {
                    let parts: Vec<String> = fields.iter().map(|f| {
                        let access = format!("&{x}.{}", field_ident(&f.name));
                        self.stringify_of(&access, &f.ty, visiting)
                    }).collect::<Result<_, _>>()?;
                    format!("{rt}::runtime::fmt_record([{}])", parts.join(", "))
                }
            }
            TypeDesc::Channel(_) =>
                format!("{rt}::runtime::fmt_channel()"),
            TypeDesc::Opaque(name) => return Err(opaque(name, "print")),
            TypeDesc::Optional(inner) => {
                let s = self.stringify_of("v", inner, visiting)?;
                format!("{x}.as_ref().map(|v| {s}).unwrap_or_default()")
            }
            TypeDesc::Pointer(inner) =>
                self.stringify_of(&format!("&**{x}"), inner, visiting)?,
            TypeDesc::Named(name) => {
                if visiting.contains(name) {
                    return Err(CompileError::Unsupported(
                        format!("can't print values of the recursive type {name}")))
                }
                visiting.push(name.clone());
                let s = self.stringify_of(&x, &self.resolver.named(name)?, visiting);
                visiting.pop();
                s?
            }
        })
    }
}

fn truthy_of(x: &str, ty: &TypeDesc) -> Result<String, CompileError> {
    let x = paren(x);
    Ok(match ty {
        TypeDesc::Array { .. } | TypeDesc::Slice(_) => format!("!{x}.is_empty()"),
        TypeDesc::Map { .. } | TypeDesc::Record { .. } | TypeDesc::Channel(_) =>
            "true".into(),
        TypeDesc::Basic(kind) => match kind {
            BasicKind::Bool => format!("*{x}"),
            BasicKind::Int => format!("*{x} != 0"),
            BasicKind::Float => format!("*{x} != 0.0"),
            BasicKind::String => format!("!{x}.is_empty()"),
            BasicKind::Markup => "true".into(),
        },
        TypeDesc::Opaque(name) => return Err(opaque(name, "test")),
        TypeDesc::Optional(_) | TypeDesc::Pointer(_) | TypeDesc::Named(_) =>
            return Err(unexpected(ty, "truthiness")),
    })
}

impl<'s, 'r> Navigator<'s> for ExprNavigator<'r> {
    type Binding = Binding;
    type Item = Resolved;
    type Error = CompileError;

    fn bound(&self, binding: &'s Binding) -> Result<Option<Resolved>, CompileError> {
        match binding {
            Binding::Absent => Ok(None),
            Binding::Bound(r) => Ok(Some(self.unwrap(r.clone())?)),
        }
    }

    fn key(&self, base: Resolved, key: &str) -> Result<Option<Resolved>, CompileError> {
        let r = match &base.ty {
            TypeDesc::Array { len, elem } => match key.parse::<usize>() {
                Ok(i) if i < *len =>
                    lift(&base, (**elem).clone(), false, |b| format!("&{b}[{i}]")),
                _ => return Ok(None)
            },
            TypeDesc::Slice(elem) => match key.parse::<usize>() {
                Ok(i) => lift(&base, (**elem).clone(), true, |b| format!("{b}.get({i})")),
                Err(_) => return Ok(None)
            },
            TypeDesc::Map { key: kty, elem } => {
                if !self.string_keyed(kty)? {
                    return Ok(None)
                }
                lift(&base, (**elem).clone(), true, |b| format!("{b}.get({key:?})"))
            }
            TypeDesc::Record { fields, .. } => match fields.iter().find(|f| f.name == key) {
                Some(f) => {
                    let ident = field_ident(&f.name);
                    lift(&base, f.ty.clone(), false, |b| format!("&{b}.{ident}"))
                }
                None => return Ok(None)
            },
            TypeDesc::Basic(_) | TypeDesc::Channel(_) => return Ok(None),
            TypeDesc::Opaque(name) => {
                trace!("no access into values of type {name}");
                return Ok(None)
            }
            TypeDesc::Optional(_) | TypeDesc::Pointer(_) | TypeDesc::Named(_) =>
                return Err(unexpected(&base.ty, "access")),
        };
        Ok(Some(self.unwrap(r)?))
    }

    fn dynamic_key(&self, base: Resolved, key: Option<Resolved>)
                   -> Result<Option<Resolved>, CompileError> {
        let k = match key {
            Some(k) => self.stringify(&k)?,
            None => "String::new()".into(),
        };
        let r = match &base.ty {
            TypeDesc::Array { elem, .. } | TypeDesc::Slice(elem) =>
                lift(&base, (**elem).clone(), true, |b| format!(
                    "{k}.parse::<usize>().ok().and_then(|i| {b}.get(i))")),
            TypeDesc::Map { key: kty, elem } => {
                if !self.string_keyed(kty)? {
                    return Ok(None)
                }
                lift(&base, (**elem).clone(), true, |b| format!("{b}.get({k}.as_str())"))
            }
            TypeDesc::Record { name, fields } => {
                let first = match fields.first() {
                    Some(f) => &f.ty,
                    None => return Ok(None)
                };
                if fields.iter().any(|f| f.ty != *first) {
                    return Err(CompileError::Unsupported(format!(
                        "dynamic access into {name}, whose fields are of different types")))
                }
                lift(&base, first.clone(), true, |b| {
                    let arms = fields.iter()
                        .map(|f| format!("{:?} => Some(&{b}.{}),", f.name, field_ident(&f.name)))
                        .join(" ");
                    format!("match {k}.as_str() {{ {arms} _ => None }}")
                })
            }
            TypeDesc::Basic(_) | TypeDesc::Channel(_) => return Ok(None),
            TypeDesc::Opaque(name) => {
                trace!("no access into values of type {name}");
                return Ok(None)
            }
            TypeDesc::Optional(_) | TypeDesc::Pointer(_) | TypeDesc::Named(_) =>
                return Err(unexpected(&base.ty, "dynamic access")),
        };
        Ok(Some(self.unwrap(r)?))
    }
}
