//! Path expressions: `.`, `$`, `.a.b`, `name.0`, `$[.key]`, `.m[$.k]`.
//!
//! A path starts with a head naming a variable (`.` when the path
//! starts with a dot, or with a `[`), followed by steps: `.key`
//! steps, and `[path]` steps whose key is the stringified value of
//! the nested path. A token directly before `[` or `]` that is not
//! the head is a key step, too (so `$.map[.]` first accesses `map`).

use kstring::KString;

use crate::scope::ScopeStack;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Key(KString),
    Index(Path),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// `None` only for empty nested paths (`[]`), which resolve to
    /// nothing.
    head: Option<KString>,
    steps: Vec<Step>,
}

const SEPARATORS: &[char] = &['.', '[', ']'];
const WHITESPACE: &[char] = &[' ', '\t', '\r', '\n'];

/// Split off the token up to the next separator.
fn split_token(s: &str) -> (&str, &str) {
    match s.find(SEPARATORS) {
        Some(i) => s.split_at(i),
        None => (s, "")
    }
}

fn dot() -> KString {
    KString::from_static(".")
}

/// Parse a path up to its end (top level) or up to and including the
/// closing `]` (nested); returns the rest of the input.
fn parse_path(s: &str, nested: bool) -> Option<(Path, &str)> {
    let mut steps = Vec::new();
    let (head, mut rest) = match s.strip_prefix('.') {
        Some(r) => {
            let (token, rest) = split_token(r);
            if !token.is_empty() {
                steps.push(Step::Key(KString::from_ref(token)));
            }
            (Some(dot()), rest)
        }
        None => {
            let (token, rest) = split_token(s);
            let head =
                if !token.is_empty() {
                    Some(KString::from_ref(token))
                } else if rest.starts_with('[') {
                    Some(dot())
                } else {
                    None
                };
            (head, rest)
        }
    };
    loop {
        match rest.chars().next() {
            None => {
                // unmatched `[`
                return if nested { None } else { Some((Path { head, steps }, "")) }
            }
            Some(']') => {
                return if nested { Some((Path { head, steps }, &rest[1..])) } else { None }
            }
            Some('[') => {
                let (p, r) = parse_path(&rest[1..], true)?;
                steps.push(Step::Index(p));
                rest = r;
            }
            Some('.') => {
                let (token, r) = split_token(&rest[1..]);
                steps.push(Step::Key(KString::from_ref(token)));
                rest = r;
            }
            Some(_) => {
                // text right after a `]`
                let (token, r) = split_token(rest);
                steps.push(Step::Key(KString::from_ref(token)));
                rest = r;
            }
        }
    }
}

impl Path {
    /// Parse `s`, ignoring surrounding whitespace. `None` for empty
    /// or malformed (unbalanced brackets) paths.
    pub fn parse(s: &str) -> Option<Path> {
        let s = s.trim_matches(WHITESPACE);
        if s.is_empty() {
            return None
        }
        parse_path(s, false).map(|(p, _)| p)
    }

    pub fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}


/// What a `resolve` run does at each point, for a particular
/// representation of the values (dynamic data, or generated code).
pub trait Navigator<'s> {
    /// What variables are bound to in the scope.
    type Binding: 's;
    /// Intermediate and final results.
    type Item;
    type Error;

    /// Start from the head variable's binding.
    fn bound(&self, binding: &'s Self::Binding) -> Result<Option<Self::Item>, Self::Error>;

    /// A `.key` step.
    fn key(&self, base: Self::Item, key: &str) -> Result<Option<Self::Item>, Self::Error>;

    /// A `[path]` step, `key` being the nested path's result.
    fn dynamic_key(&self, base: Self::Item, key: Option<Self::Item>)
                   -> Result<Option<Self::Item>, Self::Error>;
}

/// Resolve `path` in `scope`; `Ok(None)` if any part of it is absent.
pub fn resolve<'s, N: Navigator<'s>>(
    nav: &N,
    scope: &'s ScopeStack<N::Binding>,
    path: &Path,
) -> Result<Option<N::Item>, N::Error> {
    let head = match path.head() {
        Some(h) => h,
        None => return Ok(None)
    };
    let binding = match scope.get(head) {
        Some(b) => b,
        None => return Ok(None)
    };
    let mut cur = match nav.bound(binding)? {
        Some(c) => c,
        None => return Ok(None)
    };
    for step in path.steps() {
        let next = match step {
            Step::Key(k) => nav.key(cur, k)?,
            Step::Index(p) => {
                let key = resolve(nav, scope, p)?;
                nav.dynamic_key(cur, key)?
            }
        };
        cur = match next {
            Some(n) => n,
            None => return Ok(None)
        };
    }
    Ok(Some(cur))
}
