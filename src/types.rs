//! Structural descriptions of host types, as the compiler sees them.

use serde::{Serialize, Deserialize};

use crate::error::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicKind {
    Bool,
    /// All signed and unsigned integer types.
    Int,
    Float,
    String,
    /// A markup node, i.e. `anode::Node`.
    Markup,
}

/// How a value (after unwrapping optionals and indirections) is
/// treated by path access, truthiness and iteration. Both the
/// interpreter (`Value::category`) and the compiler
/// (`TypeDesc::category`) classify into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Basic(BasicKind),
    Sequence,
    Map,
    Record,
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// The name as used in paths (`0`, `1`, .. for tuple structs, no
    /// `r#` prefix).
    pub name: String,
    pub ty: TypeDesc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDesc {
    /// Fixed length array, `[T; N]`.
    Array { len: usize, elem: Box<TypeDesc> },
    /// Growable or borrowed sequence: `Vec<T>`, `VecDeque<T>`, `[T]`.
    Slice(Box<TypeDesc>),
    Map { key: Box<TypeDesc>, elem: Box<TypeDesc> },
    Record { name: String, fields: Vec<Field> },
    /// `std::sync::mpsc::Receiver<T>`.
    Channel(Box<TypeDesc>),
    Basic(BasicKind),
    /// `Option<T>`.
    Optional(Box<TypeDesc>),
    /// References and smart pointers (`&T`, `Box<T>`, `Rc<T>`,
    /// `Arc<T>`, `Cow<T>`); transparent for templates.
    Pointer(Box<TypeDesc>),
    /// A declared type, looked up via `TypeResolver::named` when
    /// needed (which is what makes recursive types possible).
    Named(String),
    /// A type with no structure the compiler knows about (`PathBuf`,
    /// `char`, tuples, foreign types), kept as written. Paths into it
    /// are absent; printing it, testing it or looping over it is an
    /// error.
    Opaque(String),
}

impl TypeDesc {
    /// The category of a concrete type; `None` for `Optional`,
    /// `Pointer` and `Named`, which have to be unwrapped first, and
    /// for `Opaque`.
    pub fn category(&self) -> Option<Category> {
        match self {
            TypeDesc::Array { .. } | TypeDesc::Slice(_) => Some(Category::Sequence),
            TypeDesc::Map { .. } => Some(Category::Map),
            TypeDesc::Record { .. } => Some(Category::Record),
            TypeDesc::Channel(_) => Some(Category::Channel),
            TypeDesc::Basic(k) => Some(Category::Basic(*k)),
            TypeDesc::Optional(_) | TypeDesc::Pointer(_) | TypeDesc::Named(_)
                | TypeDesc::Opaque(_) => None,
        }
    }

    /// Strip `Named` layers only (`Optional` and `Pointer` need code
    /// to be generated and are left alone).
    pub fn resolve_names(&self, resolver: &dyn TypeResolver) -> Result<TypeDesc, CompileError> {
        let mut ty = self.clone();
        let mut seen: Vec<String> = Vec::new();
        while let TypeDesc::Named(name) = &ty {
            if seen.contains(name) {
                return Err(CompileError::UnsupportedType(
                    format!("{name} (alias cycle)")));
            }
            seen.push(name.clone());
            ty = resolver.named(name)?;
        }
        Ok(ty)
    }

    /// Whether this is literally a sequence of markup nodes (like
    /// `Vec<Node>`), which is rendered as markup instead of as a list.
    pub fn is_markup_seq(&self, resolver: &dyn TypeResolver) -> Result<bool, CompileError> {
        Ok(match self {
            TypeDesc::Array { elem, .. } | TypeDesc::Slice(elem) =>
                elem.resolve_names(resolver)? == TypeDesc::Basic(BasicKind::Markup),
            _ => false
        })
    }
}

/// Source of type information for the compiler.
pub trait TypeResolver {
    /// The descriptor for a Rust type expression like `Page` or
    /// `Vec<Item>`.
    fn resolve(&self, type_expr: &str) -> Result<TypeDesc, CompileError>;

    /// The descriptor behind `TypeDesc::Named(name)`.
    fn named(&self, name: &str) -> Result<TypeDesc, CompileError>;
}
