//! The state of a compilation run: the Rust source written so far
//! and the compile-time scope.

use anode::trace;

use crate::{error::CompileError,
            path::{Path, resolve},
            scope::ScopeStack};
use super::expr::{Binding, ExprNavigator, Resolved};

pub struct Emitter<'r> {
    buf: String,
    indent: usize,
    counter: usize,
    pub scope: ScopeStack<Binding>,
    pub nav: ExprNavigator<'r>,
}

impl<'r> Emitter<'r> {
    pub fn new(nav: ExprNavigator<'r>) -> Emitter<'r> {
        Emitter {
            buf: String::new(),
            indent: 0,
            counter: 0,
            scope: ScopeStack::new(),
            nav,
        }
    }

    pub fn rt(&self) -> &'r str {
        self.nav.rt
    }

    /// Write one line at the current indentation.
    pub fn line(&mut self, s: &str) {
        if !s.is_empty() {
            for _ in 0..self.indent {
                self.buf.push_str("    ");
            }
            self.buf.push_str(s);
        }
        self.buf.push('\n');
    }

    /// Write a line that opens a block.
    pub fn open(&mut self, s: &str) {
        self.line(s);
        self.indent += 1;
    }

    /// Write the line closing the block.
    pub fn close(&mut self, s: &str) {
        self.indent -= 1;
        self.line(s);
    }

    /// A fresh identifier.
    pub fn gensym(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}_{}", self.counter)
    }

    pub fn with_bound<R>(&mut self, name: &str, b: Binding,
                         f: impl FnOnce(&mut Self) -> R) -> R {
        self.scope.push(name, b);
        let r = f(self);
        self.scope.pop(name);
        r
    }

    /// `Ok(None)` if the path can't be resolved in the current scope;
    /// the generated code then must do what the interpreter does for
    /// absent values.
    pub fn resolve(&self, path: &str) -> Result<Option<Resolved>, CompileError> {
        let r = match Path::parse(path) {
            Some(p) => resolve(&self.nav, &self.scope, &p)?,
            None => None
        };
        if r.is_none() {
            trace!("path {path:?} does not resolve at compile time");
        }
        Ok(r)
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
