//! Errors of the compiler. The interpreter has none: data that
//! doesn't fit the template just yields less output.

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("could not resolve type {type_expr:?}: {reason}")]
    UnresolvedType { type_expr: String, reason: String },

    #[error("unsupported type {0}")]
    UnsupportedType(String),

    /// A template construct that is valid but can't be compiled for
    /// the given types.
    #[error("{0}")]
    Unsupported(String),

    #[error("not a valid Rust identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A type category reached a place that should never see it,
    /// i.e. a bug in the compiler.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("in <{tag}> with path {path:?}: {source}")]
    At {
        tag: String,
        path: String,
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub fn at(self, tag: &str, path: &str) -> CompileError {
        CompileError::At {
            tag: tag.to_string(),
            path: path.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, without the location wrappers.
    pub fn root_cause(&self) -> &CompileError {
        match self {
            CompileError::At { source, .. } => source.root_cause(),
            e => e
        }
    }
}
