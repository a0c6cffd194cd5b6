//! Settings for code generation.
//!
//! `HTMPL_RUNTIME_CRATE` (default `htmpl`) sets the path under which
//! the generated code refers to this crate's runtime items. Tracing
//! is switched on via `HTMPL_TRACE=true` (see `anode::warn`).

use anode::env::getenv_or;
use anyhow::Result;

pub const DEFAULT_RUNTIME_CRATE: &str = "htmpl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenOptions {
    /// Name of the generated function.
    pub function_name: String,
    /// Path of the runtime crate in the generated code, e.g. `htmpl`
    /// or `crate::htmpl`.
    pub runtime_crate: String,
    /// Whether the function is `pub`.
    pub public: bool,
}

impl GenOptions {
    pub fn new(function_name: &str) -> GenOptions {
        GenOptions {
            function_name: function_name.to_string(),
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            public: true,
        }
    }

    /// Like `new`, but taking the runtime crate path from the
    /// environment.
    pub fn from_env(function_name: &str) -> Result<GenOptions> {
        Ok(GenOptions {
            runtime_crate: getenv_or("HTMPL_RUNTIME_CRATE", DEFAULT_RUNTIME_CRATE)?,
            ..GenOptions::new(function_name)
        })
    }
}
