//! The functions in `parity_generated.rs` are compiled into the
//! tests. They must be what `generate` currently produces, and must
//! render the same HTML as the interpreter does for the same data.

use std::{collections::BTreeMap, sync::mpsc::{self, Receiver}};

use anode::{Print, att, ks, parse_fragment};

use crate::{Node, eval::evaluate, config::GenOptions, gen::generate, typetable::TypeTable,
            value::{Channel, Record, ToValue, Value}};

macro_rules! host_types {
    { $($item:item)* } => {
        $($item)*
        const HOST_SRC: &str = stringify!($($item)*);
    }
}

host_types! {
    pub struct Shop {
        pub name: String,
        pub open: Option<bool>,
        pub items: Vec<Item>,
        pub stock: BTreeMap<String, u32>,
        pub owner: Option<Box<Person>>,
        pub sizes: [u8; 2],
        pub pick: usize,
        pub blurb: Vec<Node>,
        pub logo: Node,
    }
    pub struct Item { pub title: String, pub price: f64 }
    pub struct Person { pub first: String, pub last: String }
    pub struct Feed {
        pub rx: Receiver<u32>,
        pub flag: Option<bool>,
        pub names: Pair,
        pub which: String,
        pub nodes: Vec<Node>,
    }
    pub struct Pair { pub a: String, pub b: String }
}

crate::impl_to_value!(Shop { name, open, items, stock, owner, sizes, pick, blurb, logo });
crate::impl_to_value!(Item { title, price });
crate::impl_to_value!(Person { first, last });
crate::impl_to_value!(Pair { a, b });

include!("parity_generated.rs");

const SHOP_TEMPLATE: &str = "\
    <h1 class=\"n\"><v>.name</v></h1>\
    <if v=\".open\">O</if><nif v=\".open\">C</nif>\
    <for v=\".items\"><li><v>.title</v>:<v>.price</v></li></for>\
    <for v=\".stock\"><v>.</v>=<v>$.stock[.]</v>;</for>\
    <v>.stock</v>\
    <for v=\".owner\">[<v>.</v>]</for>\
    <let var=\"o\" val=\".owner\"><v>o.first</v>/<v>o</v></let>\
    <for v=\".sizes\"><v>.</v></for>\
    <v>.items[$.pick].title</v>\
    <for v=\".pick\">#<v>.</v></for>\
    <v>.blurb</v><v>.logo</v><if v=\".blurb\">B</if>\
    <v>.items</v>";

const FEED_TEMPLATE: &str = "\
    <for v=\".rx\"><i><v>.</v></i></for>\
    <v>.names[.which]</v>\
    <for v=\".names\"><v>$.names[.]</v>,</for>\
    <if v=\".flag\">F</if><nif v=\".flag\">N</nif>\
    <for v=\".nodes\"><b><v>.</v></b></for>\
    <v>.rx</v>";

fn compile(template: &str, ty: &str, function_name: &str) -> String {
    let types = TypeTable::from_source(HOST_SRC).unwrap();
    let opts = GenOptions { runtime_crate: "crate".into(), ..GenOptions::new(function_name) };
    generate(&parse_fragment(template).unwrap(), ty, &types, &opts).unwrap()
}

fn interpret(template: &str, v: Value) -> String {
    evaluate(&parse_fragment(template).unwrap(), v).to_html_fragment_string()
}

#[test]
fn t_generated_is_current() {
    let code = format!("{}\n{}",
                       compile(SHOP_TEMPLATE, "Shop", "render_shop"),
                       compile(FEED_TEMPLATE, "Feed", "render_feed"));
    assert_eq!(code, include_str!("parity_generated.rs"));
}

#[test]
fn t_shop_parity() {
    let shop = Shop {
        name: "Corner <shop>".into(),
        open: Some(false),
        items: vec![Item { title: "Tea".into(), price: 2.5 },
                    Item { title: "Cake".into(), price: 3.0 }],
        stock: [("tea".to_string(), 4), ("cake".to_string(), 0)].into_iter().collect(),
        owner: Some(Box::new(Person { first: "Ada".into(), last: "Lovelace".into() })),
        sizes: [1, 20],
        pick: 1,
        blurb: vec![Node::text("fresh & "),
                    Node::element("b", "", vec![], vec![Node::text("hot")])],
        logo: Node::element("img", "", vec![att("src", "a.png")], vec![]),
    };
    let compiled = render_shop(&shop).to_html_fragment_string();
    assert_eq!(compiled, interpret(SHOP_TEMPLATE, shop.to_value()));
    assert_eq!(compiled,
               "<h1 class=\"n\">Corner &lt;shop&gt;</h1>C\
                <li>Tea:2.5</li><li>Cake:3</li>\
                cake=0;tea=4;map[cake:0 tea:4]\
                [first][last]Ada/{Ada Lovelace}120Cake#1\
                fresh &amp;amp; &lt;b&gt;hot&lt;/b&gt;&lt;img src=&quot;a.png&quot;&gt;B\
                [{Tea 2.5} {Cake 3}]");

    // absent optionals and out of range indices
    let bare = Shop { open: Some(true), owner: None, pick: 7, blurb: vec![], ..shop };
    let compiled = render_shop(&bare).to_html_fragment_string();
    assert_eq!(compiled, interpret(SHOP_TEMPLATE, bare.to_value()));
    assert!(compiled.contains("</h1>O<li>"), "{compiled}");
    assert!(compiled.contains("tea=4;map[cake:0 tea:4]/120#7&lt;img"), "{compiled}");
}

#[test]
fn t_feed_parity() {
    let (tx, rx) = mpsc::channel();
    let (vtx, vrx) = mpsc::channel();
    for i in [3u32, 4] {
        tx.send(i).unwrap();
        vtx.send(i.to_value()).unwrap();
    }
    drop((tx, vtx));
    let names = Pair { a: "x".into(), b: "y".into() };
    let nodes = vec![Node::text("n1"), Node::element("br", "", vec![], vec![])];
    let value = Value::Record(Record::new("Feed", vec![
        (ks("rx"), Value::Channel(Channel::new(vrx))),
        (ks("flag"), None::<bool>.to_value()),
        (ks("names"), names.to_value()),
        (ks("which"), "b".to_value()),
        (ks("nodes"), nodes.to_value()),
    ]));
    let feed = Feed { rx, flag: None, names, which: "b".into(), nodes };

    let compiled = render_feed(&feed).to_html_fragment_string();
    assert_eq!(compiled, interpret(FEED_TEMPLATE, value));
    assert_eq!(compiled,
               "<i>3</i><i>4</i>yx,y,N<b>n1</b><b>&lt;br&gt;</b>&lt;channel&gt;");
}
