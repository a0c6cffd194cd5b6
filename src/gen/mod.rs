//! The compiler: turns a template into the Rust source of a function
//! that builds the same nodes as `eval::evaluate` would, for a value
//! of a type known at compile time.
//!
//! The generated function has the signature
//! `fn NAME(dot: &TYPE) -> Vec<RT::Node>`, where `RT` is the runtime
//! crate path from `GenOptions`. Paths are resolved against the type
//! while compiling; what can't be resolved compiles to what the
//! interpreter does with absent values.

pub mod expr;
pub mod emit;
#[cfg(test)]
mod parity;

use anode::{Element, Node};
use itertools::Itertools;

use crate::{config::GenOptions,
            directive::{Directive, value_path, v_attr, VAR_ATTR, VAL_ATTR},
            error::CompileError,
            types::{BasicKind, TypeDesc, TypeResolver}};
use self::{emit::Emitter,
           expr::{Binding, ExprNavigator, Resolved, opaque, paren, var_ident}};

fn check_ident(s: &str) -> Result<(), CompileError> {
    syn::parse_str::<syn::Ident>(s)
        .map(|_| ())
        .map_err(|_| CompileError::InvalidIdentifier(s.to_string()))
}

/// Compile `template` for values of the Rust type `type_expr` (as
/// understood by `resolver`).
pub fn generate(
    template: &Node,
    type_expr: &str,
    resolver: &dyn TypeResolver,
    opts: &GenOptions,
) -> Result<String, CompileError> {
    check_ident(&opts.function_name)?;
    syn::parse_str::<syn::Path>(&opts.runtime_crate)
        .map_err(|_| CompileError::InvalidIdentifier(opts.runtime_crate.clone()))?;
    let root = resolver.resolve(type_expr)?;
    if let TypeDesc::Opaque(name) = root.resolve_names(resolver)? {
        return Err(CompileError::UnsupportedType(name))
    }

    let rt = opts.runtime_crate.as_str();
    let mut em = Emitter::new(ExprNavigator { resolver, rt });
    em.line("// This file was auto-generated by htmpl-gen, from a template for");
    em.line(&format!("// type `{type_expr}`. Do not edit."));
    em.line("");
    em.line("#[allow(unused_variables, unused_mut, unused_braces, unused_parens, non_snake_case, \
             clippy::all)]");
    let vis = if opts.public { "pub " } else { "" };
    em.open(&format!("{vis}fn {}(dot: &{type_expr}) -> Vec<{rt}::Node> {{",
                     opts.function_name));
    em.line("let dollar = dot;");
    em.line(&format!("let mut out: Vec<{rt}::Node> = Vec::new();"));
    em.scope.push("$", Binding::Bound(Resolved::new("dollar", root.clone())));
    em.scope.push(".", Binding::Bound(Resolved::new("dot", root)));
    em.gen_node(template)?;
    em.line("out");
    em.close("}");
    Ok(em.finish())
}

impl<'r> Emitter<'r> {
    fn gen_children(&mut self, body: &[Node]) -> Result<(), CompileError> {
        for node in body {
            self.gen_node(node)?;
        }
        Ok(())
    }

    fn gen_node(&mut self, node: &Node) -> Result<(), CompileError> {
        let rt = self.rt();
        match node {
            Node::Document(body) => self.gen_children(body)?,
            Node::Element(e) => match Directive::of(e) {
                Some(Directive::If) => self.gen_cond(e, false)?,
                Some(Directive::Nif) => self.gen_cond(e, true)?,
                Some(Directive::For) => self.gen_for(e)?,
                Some(Directive::Let) => self.gen_let(e)?,
                Some(Directive::V) => self.gen_v(e)?,
                None => self.gen_element(e)?,
            },
            Node::Text(s) =>
                self.line(&format!("out.push({rt}::Node::text({:?}));", s.as_str())),
            Node::Comment(s) =>
                self.line(&format!("out.push({rt}::Node::comment({:?}));", s.as_str())),
            Node::Doctype(s) =>
                self.line(&format!("out.push({rt}::Node::doctype({:?}));", s.as_str())),
        }
        Ok(())
    }

    /// Resolve `path` for element `e`, attaching the location to
    /// errors.
    fn resolve_at(&self, e: &Element, path: &str) -> Result<Option<Resolved>, CompileError> {
        self.resolve(path).map_err(|err| err.at(e.tag(), path))
    }

    fn gen_element(&mut self, e: &Element) -> Result<(), CompileError> {
        let rt = self.rt();
        self.open("out.push({");
        self.line(&format!("let mut out: Vec<{rt}::Node> = Vec::new();"));
        self.gen_children(e.body())?;
        let attrs = e.attr().iter().map(|a| format!(
            "{rt}::Attribute::new({:?}, {:?}, {:?})",
            a.namespace.as_str(), a.key.as_str(), a.val.as_str())).join(", ");
        self.line(&format!("{rt}::Node::element({:?}, {:?}, vec![{attrs}], out)",
                           e.tag(), e.namespace.as_str()));
        self.close("});");
        Ok(())
    }

    fn gen_cond(&mut self, e: &Element, negate: bool) -> Result<(), CompileError> {
        let path = v_attr(e);
        match self.resolve_at(e, path)? {
            Some(r) => {
                let cond = self.nav.truthy(&r).map_err(|err| err.at(e.tag(), path))?;
                let cond = if negate { format!("!({cond})") } else { cond };
                self.open(&format!("if {cond} {{"));
                self.gen_children(e.body())?;
                self.close("}");
            }
            None => if negate {
                // absent values are false
                self.open("{");
                self.gen_children(e.body())?;
                self.close("}");
            }
        }
        Ok(())
    }

    fn gen_for(&mut self, e: &Element) -> Result<(), CompileError> {
        let path = v_attr(e);
        let r = match self.resolve_at(e, path)? {
            Some(r) => r,
            None => return Ok(())
        };
        if r.fallible {
            let x = self.gensym("x");
            self.open(&format!("if let Some({x}) = {} {{", r.code));
            self.gen_loop(e, path, Resolved::new(x, r.ty))?;
            self.close("}");
        } else {
            self.gen_loop(e, path, r)?;
        }
        Ok(())
    }

    /// Loop over `r` (which is not fallible) with `.` bound to each
    /// item.
    fn gen_loop(&mut self, e: &Element, path: &str, r: Resolved) -> Result<(), CompileError> {
        let code = paren(&r.code);
        let (header, item_ty) = match r.ty {
            TypeDesc::Array { elem, .. } | TypeDesc::Slice(elem) =>
                (format!("for dot in {code}.iter() {{"), *elem),
            TypeDesc::Map { key, .. } =>
                (format!("for dot in {code}.keys() {{"), *key),
            TypeDesc::Record { fields, .. } => {
                if fields.is_empty() {
                    return Ok(())
                }
                let names = fields.iter().map(|f| format!("{:?}", f.name)).join(", ");
                (format!("for dot in [{names}].iter() {{"), TypeDesc::Basic(BasicKind::String))
            }
            TypeDesc::Channel(elem) => {
                let item = self.gensym("item");
                self.open(&format!("for {item} in {code}.iter() {{"));
                self.line(&format!("let dot = &{item};"));
                self.gen_loop_body(e, *elem)?;
                self.close("}");
                return Ok(())
            }
            TypeDesc::Basic(kind) => {
                self.open("{");
                self.line(&format!("let dot = {};", r.code));
                self.gen_loop_body(e, TypeDesc::Basic(kind))?;
                self.close("}");
                return Ok(())
            }
            TypeDesc::Opaque(name) =>
                return Err(opaque(&name, "loop over").at(e.tag(), path)),
            ty @ (TypeDesc::Optional(_) | TypeDesc::Pointer(_) | TypeDesc::Named(_)) =>
                return Err(CompileError::Internal(
                    format!("iteration over type that was not unwrapped: {ty:?}"))
                           .at(e.tag(), path)),
        };
        self.open(&header);
        self.gen_loop_body(e, item_ty)?;
        self.close("}");
        Ok(())
    }

    fn gen_loop_body(&mut self, e: &Element, item_ty: TypeDesc) -> Result<(), CompileError> {
        self.with_bound(".", Binding::Bound(Resolved::new("dot", item_ty)),
                        |this| this.gen_children(e.body()))
    }

    fn gen_let(&mut self, e: &Element) -> Result<(), CompileError> {
        let var = e.get_attr(VAR_ATTR).unwrap_or("");
        let val = e.get_attr(VAL_ATTR).unwrap_or("");
        let binding = match self.resolve_at(e, val)? {
            Some(r) => {
                let ident = var_ident(var);
                self.open("{");
                self.line(&format!("let {ident} = {};", r.code));
                Binding::Bound(Resolved { code: ident, ..r })
            }
            None => {
                self.open("{");
                Binding::Absent
            }
        };
        self.with_bound(var, binding, |this| this.gen_children(e.body()))?;
        self.close("}");
        Ok(())
    }

    fn gen_v(&mut self, e: &Element) -> Result<(), CompileError> {
        let rt = self.rt();
        let path = match value_path(e) {
            Some(p) => p,
            None => return Ok(())
        };
        let s = match self.resolve_at(e, path)? {
            Some(r) => self.nav.stringify(&r).map_err(|err| err.at(e.tag(), path))?,
            None => "String::new()".into(),
        };
        self.line(&format!("out.push({rt}::Node::text({s}));"));
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use anode::parse_fragment;

    use super::*;
    use crate::{eval::Evaluator,
                path::{Path, resolve},
                scope::ScopeStack,
                typetable::TypeTable,
                value::{ToValue, Value}};

    const SRC: &str = r#"
        pub struct Page {
            pub title: String,
            pub draft: bool,
            pub items: Vec<Item>,
            pub tags: HashMap<String, u32>,
            pub sub: Option<Box<Page>>,
            pub body: Vec<Node>,
            pub point: [f64; 2],
        }
        pub struct Item { pub name: &'static str, pub count: i32 }
        pub struct Pair { pub a: String, pub b: String }
    "#;

    struct Item { name: &'static str, count: i32 }
    crate::impl_to_value!(Item { name, count });

    fn table() -> TypeTable {
        TypeTable::from_source(SRC).unwrap()
    }

    fn gen(template: &str, ty: &str) -> Result<String, CompileError> {
        let t = parse_fragment(template).unwrap();
        generate(&t, ty, &table(), &GenOptions::new("render"))
    }

    #[test]
    fn t_function_shape() {
        let code = gen("<p class=\"x\">hi</p>", "Page").unwrap();
        assert!(code.starts_with("// This file was auto-generated by htmpl-gen"));
        assert!(code.contains("pub fn render(dot: &Page) -> Vec<htmpl::Node> {\n"));
        assert!(code.contains("    let dollar = dot;\n"));
        assert!(code.contains(
            "        out.push(htmpl::Node::text(\"hi\"));\n        \
             htmpl::Node::element(\"p\", \"\", \
             vec![htmpl::Attribute::new(\"\", \"class\", \"x\")], out)\n    });\n"));
        assert!(code.ends_with("    out\n}\n"));
    }

    #[test]
    fn t_directives_code() {
        let code = gen("<if v=\".draft\">D</if><nif v=\".sub\">N</nif>\
                        <for v=\".items\"><v>.name</v></for>\
                        <let var=\"s\" val=\".sub\"><v>s.title</v></let>", "Page").unwrap();
        assert!(code.contains("if *(&dot.draft) {"));
        assert!(code.contains("if !((((&dot.sub).as_ref()).map(|v| &**v)).is_some()) {"),
                "{code}");
        assert!(code.contains("for dot in (&dot.items).iter() {"));
        assert!(code.contains("out.push(htmpl::Node::text((&**(&dot.name)).to_string()));"),
                "{code}");
        assert!(code.contains("let var_s = ((&dot.sub).as_ref()).map(|v| &**v);"), "{code}");
        assert!(code.contains("out.push(htmpl::Node::text((var_s.map(|v| &v.title))\
                               .map(|v| v.to_string()).unwrap_or_default()));"), "{code}");
    }

    #[test]
    fn t_unresolvable_paths() {
        let code = gen("<if v=\".nope\">A</if><nif v=\".nope\">B</nif>\
                        <for v=\".title.x\">C</for><v>.nope</v>\
                        <let var=\"z\" val=\".nope\"><if v=\"z\">E</if></let>", "Page").unwrap();
        assert!(!code.contains("\"A\""));
        assert!(code.contains("\"B\""));
        assert!(!code.contains("\"C\""));
        assert!(!code.contains("\"E\""));
        assert!(code.contains("out.push(htmpl::Node::text(String::new()));"));
    }

    #[test]
    fn t_loops_over_categories() {
        let code = gen("<for v=\".tags\"><v>$.tags[.]</v></for>\
                        <for v=\".items.0\"><v>.</v></for>\
                        <for v=\".title\"><v>.</v></for>\
                        <for v=\".point\"><v>.</v></for>", "Page").unwrap();
        assert!(code.contains("for dot in (&dot.tags).keys() {"), "{code}");
        assert!(code.contains("if let Some(x_1) = (&dot.items).get(0) {"), "{code}");
        assert!(code.contains("for dot in [\"name\", \"count\"].iter() {"), "{code}");
        assert!(code.contains("let dot = &dot.title;"), "{code}");
        assert!(code.contains("for dot in (&dot.point).iter() {"), "{code}");
    }

    #[test]
    fn t_errors() {
        let err = gen("<div><for v=\".\"><v>$[.]</v></for></div>", "Page").unwrap_err();
        match &err {
            CompileError::At { tag, path, .. } => {
                assert_eq!(tag, "v");
                assert_eq!(path, "$[.]");
            }
            e => panic!("unexpected error {e:?}")
        }
        assert!(matches!(err.root_cause(), CompileError::Unsupported(_)));
        // printing a value of a recursive type
        assert!(gen("<v>.</v>", "Page").is_err());
        assert!(matches!(gen("x", "Nope"), Err(CompileError::UnsupportedType(_))));
        let t = parse_fragment("x").unwrap();
        assert!(matches!(generate(&t, "Page", &table(), &GenOptions::new("not valid")),
                         Err(CompileError::InvalidIdentifier(_))));
        // records with uniformly typed fields can be indexed dynamically
        assert!(gen("<for v=\".\"><v>$[.]</v></for>", "Pair").is_ok());
    }

    const ODD_SRC: &str = r#"
        use std::{collections::HashMap, path::PathBuf};
        pub struct R {
            pub title: String,
            pub path: PathBuf,
            pub c: char,
            pub m: HashMap<u32, String>,
        }
    "#;

    fn gen_odd(template: &str) -> Result<String, CompileError> {
        let types = TypeTable::from_source(ODD_SRC).unwrap();
        generate(&parse_fragment(template).unwrap(), "R", &types, &GenOptions::new("render"))
    }

    #[test]
    fn t_opaque_fields() {
        // fields of types templates can't look into don't matter
        // unless they are used
        let code = gen_odd("<v>.title</v><v>.path.x</v><if v=\".c.0\">A</if>").unwrap();
        assert!(code.contains("out.push(htmpl::Node::text((&dot.title).to_string()));"),
                "{code}");
        assert!(code.contains("out.push(htmpl::Node::text(String::new()));"), "{code}");
        assert!(!code.contains("\"A\""));

        let err = gen_odd("<p><v>.path</v></p>").unwrap_err();
        match &err {
            CompileError::At { tag, path, .. } => {
                assert_eq!(tag, "v");
                assert_eq!(path, ".path");
            }
            e => panic!("unexpected error {e:?}")
        }
        assert!(matches!(err.root_cause(), CompileError::Unsupported(_)));
        assert!(gen_odd("<if v=\".c\">x</if>").is_err());
        assert!(gen_odd("<for v=\".c\">x</for>").is_err());
    }

    #[test]
    fn t_non_string_map_keys() {
        let code = gen_odd("<v>.m.5</v><if v=\".m.x\">A</if><v>.m[.title]</v>\
                            <for v=\".m\"><v>.</v></for>").unwrap();
        assert!(!code.contains("\"A\""));
        assert!(!code.contains(".get("), "{code}");
        assert!(code.contains("for dot in (&dot.m).keys() {"), "{code}");
    }

    #[test]
    fn t_let_var_names() {
        let code = gen("<let var=\"myVar\" val=\".title\"><v>myVar</v></let>\
                        <let var=\".\" val=\".draft\"><v>.</v></let>", "Page").unwrap();
        assert!(code.contains("let var_myVar = &dot.title;"), "{code}");
        assert!(code.contains("let var__2e_ = &dot.draft;"), "{code}");
        assert!(code.contains("non_snake_case"));
    }

    /// The category the interpreter sees at `path` must be the one
    /// the compiler resolves.
    #[test]
    fn t_category_parity() {
        struct Page {
            title: String,
            draft: bool,
            items: Vec<Item>,
            tags: std::collections::HashMap<String, u32>,
            sub: Option<Box<Page>>,
            body: Vec<Node>,
            point: [f64; 2],
        }
        crate::impl_to_value!(Page { title, draft, items, tags, sub, body, point });

        let page = Page {
            title: "t".into(),
            draft: false,
            items: vec![Item { name: "a", count: 2 }],
            tags: [("k".to_string(), 1)].into_iter().collect(),
            sub: Some(Box::new(Page {
                title: "s".into(), draft: true, items: vec![], tags: Default::default(),
                sub: None, body: vec![], point: [0.0, 1.0],
            })),
            body: vec![Node::text("b")],
            point: [1.5, 2.5],
        };
        let value = page.to_value();
        let types = table();
        let nav = ExprNavigator { resolver: &types, rt: "htmpl" };
        let scope = ScopeStack::with_root(
            Binding::Bound(Resolved::new("dot", types.resolve("Page").unwrap())));
        let ev = Evaluator::new(value);

        for path in [".", ".title", ".draft", ".items", ".items.0", ".items.0.name",
                     ".items.0.count", ".tags", ".tags.k", ".sub", ".sub.title",
                     ".sub.draft", ".body", ".body.0", ".point", ".point.1"] {
            let r = resolve(&nav, &scope, &Path::parse(path).unwrap()).unwrap();
            let r = r.unwrap_or_else(|| panic!("{path} resolves at compile time"));
            assert_eq!(r.ty.category(), ev.get(path).category(), "category of {path}");
        }
        assert_eq!(ev.get(".sub.sub"), Value::Invalid);
    }
}
