//! Variable scoping: every name maps to a stack of bindings, the
//! innermost one wins.

use std::collections::HashMap;

use kstring::KString;

#[derive(Debug)]
pub struct ScopeStack<B> {
    vars: HashMap<KString, Vec<B>>,
}

impl<B> Default for ScopeStack<B> {
    fn default() -> Self {
        ScopeStack { vars: HashMap::new() }
    }
}

impl<B> ScopeStack<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope with `.` and `$` both bound to `root`.
    pub fn with_root(root: B) -> Self
    where B: Clone
    {
        let mut s = Self::new();
        s.push("$", root.clone());
        s.push(".", root);
        s
    }

    pub fn push(&mut self, name: &str, binding: B) {
        match self.vars.get_mut(name) {
            Some(stack) => stack.push(binding),
            None => {
                self.vars.insert(KString::from_ref(name), vec![binding]);
            }
        }
    }

    /// Remove the innermost binding of `name`. Panics if there is
    /// none, since that means pushes and pops don't pair up.
    pub fn pop(&mut self, name: &str) -> B {
        let stack = self.vars.get_mut(name)
            .unwrap_or_else(|| panic!("pop of unbound variable {name:?}"));
        let b = stack.pop().expect("stacks are removed when emptied");
        if stack.is_empty() {
            self.vars.remove(name);
        }
        b
    }

    pub fn get(&self, name: &str) -> Option<&B> {
        self.vars.get(name)?.last()
    }

    /// Number of bindings of `name` currently in effect.
    pub fn depth(&self, name: &str) -> usize {
        self.vars.get(name).map_or(0, |s| s.len())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_scope_stack() {
        let mut s = ScopeStack::with_root(0);
        assert_eq!(s.get("."), Some(&0));
        assert_eq!(s.get("$"), Some(&0));
        assert_eq!(s.get("x"), None);
        s.push(".", 1);
        s.push("x", 2);
        assert_eq!(s.get("."), Some(&1));
        assert_eq!(s.get("$"), Some(&0));
        assert_eq!(s.depth("."), 2);
        assert_eq!(s.pop("x"), 2);
        assert_eq!(s.get("x"), None);
        assert_eq!(s.depth("x"), 0);
        assert_eq!(s.pop("."), 1);
        assert_eq!(s.get("."), Some(&0));
    }

    #[test]
    #[should_panic]
    fn t_unbalanced_pop() {
        let mut s: ScopeStack<u8> = ScopeStack::new();
        s.pop("x");
    }
}
