//! HTML templating: templates are markup with a few directive
//! elements (`if`, `nif`, `for`, `let`, `v`) that refer to data via
//! path expressions. Templates can be interpreted against dynamic
//! data (`evaluate`), or compiled to Rust source for a given type
//! (`generate`); the generated code refers back to this crate for
//! the runtime parts.

pub mod error;
pub mod types;
pub mod value;
pub mod runtime;
pub mod scope;
pub mod path;
pub mod directive;
pub mod eval;
pub mod typetable;
pub mod gen;
pub mod config;

pub use anode::{Attribute, Element, Node, Print, att, parse_fragment};
pub use kstring::KString;

pub use crate::{config::GenOptions,
                error::CompileError,
                eval::evaluate,
                gen::generate,
                types::{BasicKind, Category, Field, TypeDesc, TypeResolver},
                typetable::TypeTable,
                value::{Channel, Number, Record, ToValue, Value}};
