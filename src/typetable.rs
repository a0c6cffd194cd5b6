//! Type information read from Rust source code (the crate that will
//! contain the generated code), via `syn`.

use std::{collections::HashMap, path::Path};

use anode::trace;
use anyhow::{Context, Result, anyhow};
use quote::ToTokens;
use syn::{Fields, GenericArgument, Item, PathArguments, Type};

use crate::{error::CompileError,
            types::{BasicKind, Field, TypeDesc, TypeResolver}};

#[derive(Debug, Clone)]
enum Decl {
    Struct(Vec<(String, Type)>),
    Alias(Type),
    Described(TypeDesc),
    /// Declared, but in a form the compiler can't handle.
    Unsupported(&'static str),
}

/// Struct and type alias declarations by name. Modules are flattened,
/// i.e. names have to be unique across the source given.
#[derive(Debug, Default)]
pub struct TypeTable {
    decls: HashMap<String, Decl>,
}

fn type_str(ty: &Type) -> String {
    ty.to_token_stream().to_string()
}

fn unraw(s: String) -> String {
    match s.strip_prefix("r#") {
        Some(s) => s.to_string(),
        None => s
    }
}

impl TypeTable {
    pub fn new() -> TypeTable {
        Self::default()
    }

    pub fn from_source(src: &str) -> Result<TypeTable> {
        let mut t = TypeTable::new();
        t.add_source(src)?;
        Ok(t)
    }

    pub fn from_file(path: &Path) -> Result<TypeTable> {
        let mut t = TypeTable::new();
        t.add_file(path)?;
        Ok(t)
    }

    pub fn add_source(&mut self, src: &str) -> Result<()> {
        let file = syn::parse_file(src).map_err(|e| anyhow!("parsing Rust source: {e}"))?;
        self.add_items(&file.items);
        Ok(())
    }

    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let src = std::fs::read_to_string(path)
            .with_context(|| anyhow!("reading {path:?}"))?;
        self.add_source(&src).with_context(|| anyhow!("in {path:?}"))
    }

    /// Declare a record type directly.
    pub fn insert_record(&mut self, name: &str, fields: Vec<Field>) {
        self.decls.insert(
            name.to_string(),
            Decl::Described(TypeDesc::Record { name: name.to_string(), fields }));
    }

    fn add_items(&mut self, items: &[Item]) {
        for item in items {
            let (name, decl) = match item {
                Item::Struct(s) => {
                    let decl = if !s.generics.params.is_empty() {
                        Decl::Unsupported("generic struct")
                    } else {
                        Decl::Struct(match &s.fields {
                            Fields::Named(f) => f.named.iter().filter_map(|f| {
                                Some((unraw(f.ident.as_ref()?.to_string()), f.ty.clone()))
                            }).collect(),
                            Fields::Unnamed(f) => f.unnamed.iter().enumerate()
                                .map(|(i, f)| (i.to_string(), f.ty.clone()))
                                .collect(),
                            Fields::Unit => Vec::new(),
                        })
                    };
                    (s.ident.to_string(), decl)
                }
                Item::Type(t) => {
                    let decl = if !t.generics.params.is_empty() {
                        Decl::Unsupported("generic type alias")
                    } else {
                        Decl::Alias((*t.ty).clone())
                    };
                    (t.ident.to_string(), decl)
                }
                Item::Enum(e) => (e.ident.to_string(), Decl::Unsupported("enum")),
                Item::Union(u) => (u.ident.to_string(), Decl::Unsupported("union")),
                Item::Mod(m) => {
                    if let Some((_, items)) = &m.content {
                        self.add_items(items);
                    }
                    continue
                }
                _ => continue
            };
            self.decls.insert(name, decl);
        }
    }

    fn type_args(&self, args: &PathArguments, lenient: bool)
                 -> Result<Vec<TypeDesc>, CompileError> {
        match args {
            PathArguments::AngleBracketed(a) => a.args.iter().filter_map(|arg| match arg {
                GenericArgument::Type(t) => Some(self.convert(t, lenient)),
                _ => None
            }).collect(),
            _ => Ok(Vec::new())
        }
    }

    /// Describe `ty`. If `lenient`, the parts that can't be described
    /// become `TypeDesc::Opaque` instead of failing the whole type.
    fn convert(&self, ty: &Type, lenient: bool) -> Result<TypeDesc, CompileError> {
        let unsupported = || if lenient {
            trace!("type {} is opaque to templates", type_str(ty));
            Ok(TypeDesc::Opaque(type_str(ty)))
        } else {
            Err(CompileError::UnsupportedType(type_str(ty)))
        };
        match ty {
            Type::Paren(p) => self.convert(&p.elem, lenient),
            Type::Group(g) => self.convert(&g.elem, lenient),
            Type::Reference(r) =>
                Ok(TypeDesc::Pointer(Box::new(self.convert(&r.elem, lenient)?))),
            Type::Slice(s) => Ok(TypeDesc::Slice(Box::new(self.convert(&s.elem, lenient)?))),
            Type::Array(a) => {
                let len = match &a.len {
                    syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Int(i), .. }) =>
                        match i.base10_parse::<usize>() {
                            Ok(len) => len,
                            Err(_) => return unsupported()
                        },
                    _ => return unsupported()
                };
                Ok(TypeDesc::Array { len, elem: Box::new(self.convert(&a.elem, lenient)?) })
            }
            Type::Path(p) if p.qself.is_none() => {
                let seg = match p.path.segments.last() {
                    Some(seg) => seg,
                    None => return unsupported()
                };
                let name = seg.ident.to_string();
                let args = self.type_args(&seg.arguments, lenient)?;
                let one = |mk: fn(Box<TypeDesc>) -> TypeDesc| -> Result<TypeDesc, CompileError> {
                    match <[TypeDesc; 1]>::try_from(args.clone()) {
                        Ok([t]) => Ok(mk(Box::new(t))),
                        Err(_) => unsupported(),
                    }
                };
                match name.as_str() {
                    "bool" => Ok(TypeDesc::Basic(BasicKind::Bool)),
                    "i8" | "i16" | "i32" | "i64" | "isize"
                        | "u8" | "u16" | "u32" | "u64" | "usize" =>
                        Ok(TypeDesc::Basic(BasicKind::Int)),
                    "f32" | "f64" => Ok(TypeDesc::Basic(BasicKind::Float)),
                    "str" | "String" | "KString" => Ok(TypeDesc::Basic(BasicKind::String)),
                    "Node" => Ok(TypeDesc::Basic(BasicKind::Markup)),
                    "Vec" | "VecDeque" => one(TypeDesc::Slice),
                    "Option" => one(TypeDesc::Optional),
                    "Box" | "Rc" | "Arc" | "Cow" => one(TypeDesc::Pointer),
                    "Receiver" => one(TypeDesc::Channel),
                    "HashMap" | "BTreeMap" => match <[TypeDesc; 2]>::try_from(args.clone()) {
                        Ok([key, elem]) => Ok(TypeDesc::Map {
                            key: Box::new(key), elem: Box::new(elem)
                        }),
                        Err(_) => unsupported(),
                    },
                    _ => match self.decls.get(&name) {
                        Some(Decl::Unsupported(_)) => unsupported(),
                        Some(_) if args.is_empty() => Ok(TypeDesc::Named(name)),
                        _ => unsupported()
                    }
                }
            }
            _ => unsupported()
        }
    }
}

impl TypeResolver for TypeTable {
    fn resolve(&self, type_expr: &str) -> Result<TypeDesc, CompileError> {
        let ty: Type = syn::parse_str(type_expr).map_err(|e| CompileError::UnresolvedType {
            type_expr: type_expr.to_string(),
            reason: e.to_string(),
        })?;
        self.convert(&ty, false)
    }

    fn named(&self, name: &str) -> Result<TypeDesc, CompileError> {
        match self.decls.get(name) {
            Some(Decl::Struct(fields)) => Ok(TypeDesc::Record {
                name: name.to_string(),
                fields: fields.iter().map(|(fname, ty)| {
                    Ok(Field { name: fname.clone(), ty: self.convert(ty, true)? })
                }).collect::<Result<_, CompileError>>()?,
            }),
            Some(Decl::Alias(ty)) => self.convert(ty, true),
            Some(Decl::Described(desc)) => Ok(desc.clone()),
            Some(Decl::Unsupported(what)) =>
                Err(CompileError::UnsupportedType(format!("{name} ({what})"))),
            None => Err(CompileError::UnresolvedType {
                type_expr: name.to_string(),
                reason: "no such struct or type alias".into(),
            }),
        }
    }
}
