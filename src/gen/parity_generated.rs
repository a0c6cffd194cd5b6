// This file was auto-generated by htmpl-gen, from a template for
// type `Shop`. Do not edit.

#[allow(unused_variables, unused_mut, unused_braces, unused_parens, non_snake_case, clippy::all)]
pub fn render_shop(dot: &Shop) -> Vec<crate::Node> {
    let dollar = dot;
    let mut out: Vec<crate::Node> = Vec::new();
    out.push({
        let mut out: Vec<crate::Node> = Vec::new();
        out.push(crate::Node::text((&dot.name).to_string()));
        crate::Node::element("h1", "", vec![crate::Attribute::new("", "class", "n")], out)
    });
    if ((&dot.open).as_ref()).map_or(false, |v| *v) {
        out.push(crate::Node::text("O"));
    }
    if !(((&dot.open).as_ref()).map_or(false, |v| *v)) {
        out.push(crate::Node::text("C"));
    }
    for dot in (&dot.items).iter() {
        out.push({
            let mut out: Vec<crate::Node> = Vec::new();
            out.push(crate::Node::text((&dot.title).to_string()));
            out.push(crate::Node::text(":"));
            out.push(crate::Node::text((&dot.price).to_string()));
            crate::Node::element("li", "", vec![], out)
        });
    }
    for dot in (&dot.stock).keys() {
        out.push(crate::Node::text(dot.to_string()));
        out.push(crate::Node::text("="));
        out.push(crate::Node::text(((&dollar.stock).get(dot.to_string().as_str())).map(|v| v.to_string()).unwrap_or_default()));
        out.push(crate::Node::text(";"));
    }
    out.push(crate::Node::text(crate::runtime::fmt_map((&dot.stock).iter().map(|(k, v)| (k.to_string(), v.to_string())))));
    if let Some(x_1) = ((&dot.owner).as_ref()).map(|v| &**v) {
        for dot in ["first", "last"].iter() {
            out.push(crate::Node::text("["));
            out.push(crate::Node::text(dot.to_string()));
            out.push(crate::Node::text("]"));
        }
    }
    {
        let var_o = ((&dot.owner).as_ref()).map(|v| &**v);
        out.push(crate::Node::text((var_o.map(|v| &v.first)).map(|v| v.to_string()).unwrap_or_default()));
        out.push(crate::Node::text("/"));
        out.push(crate::Node::text(var_o.map(|v| crate::runtime::fmt_record([(&v.first).to_string(), (&v.last).to_string()])).unwrap_or_default()));
    }
    for dot in (&dot.sizes).iter() {
        out.push(crate::Node::text(dot.to_string()));
    }
    out.push(crate::Node::text((((&dollar.pick).to_string().parse::<usize>().ok().and_then(|i| (&dot.items).get(i))).map(|v| &v.title)).map(|v| v.to_string()).unwrap_or_default()));
    {
        let dot = &dot.pick;
        out.push(crate::Node::text("#"));
        out.push(crate::Node::text(dot.to_string()));
    }
    out.push(crate::Node::text(crate::runtime::render_markup((&dot.blurb).iter())));
    out.push(crate::Node::text(crate::runtime::render_markup(std::iter::once((&dot.logo)))));
    if !(&dot.blurb).is_empty() {
        out.push(crate::Node::text("B"));
    }
    out.push(crate::Node::text(crate::runtime::fmt_seq((&dot.items).iter().map(|v| crate::runtime::fmt_record([(&v.title).to_string(), (&v.price).to_string()])))));
    out
}

// This file was auto-generated by htmpl-gen, from a template for
// type `Feed`. Do not edit.

#[allow(unused_variables, unused_mut, unused_braces, unused_parens, non_snake_case, clippy::all)]
pub fn render_feed(dot: &Feed) -> Vec<crate::Node> {
    let dollar = dot;
    let mut out: Vec<crate::Node> = Vec::new();
    for item_1 in (&dot.rx).iter() {
        let dot = &item_1;
        out.push({
            let mut out: Vec<crate::Node> = Vec::new();
            out.push(crate::Node::text(dot.to_string()));
            crate::Node::element("i", "", vec![], out)
        });
    }
    out.push(crate::Node::text((match (&dot.which).to_string().as_str() { "a" => Some(&(&dot.names).a), "b" => Some(&(&dot.names).b), _ => None }).map(|v| v.to_string()).unwrap_or_default()));
    for dot in ["a", "b"].iter() {
        out.push(crate::Node::text((match dot.to_string().as_str() { "a" => Some(&(&dollar.names).a), "b" => Some(&(&dollar.names).b), _ => None }).map(|v| v.to_string()).unwrap_or_default()));
        out.push(crate::Node::text(","));
    }
    if ((&dot.flag).as_ref()).map_or(false, |v| *v) {
        out.push(crate::Node::text("F"));
    }
    if !(((&dot.flag).as_ref()).map_or(false, |v| *v)) {
        out.push(crate::Node::text("N"));
    }
    for dot in (&dot.nodes).iter() {
        out.push({
            let mut out: Vec<crate::Node> = Vec::new();
            out.push(crate::Node::text(crate::runtime::render_markup(std::iter::once(dot))));
            crate::Node::element("b", "", vec![], out)
        });
    }
    out.push(crate::Node::text(crate::runtime::fmt_channel()));
    out
}
