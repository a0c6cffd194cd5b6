use std::path::PathBuf;

use anyhow::{Result, Context, anyhow, bail};
use clap::Parser as ClapParser;
use htmpl::{GenOptions, TypeResolver, TypeTable, generate, parse_fragment};

#[derive(clap::Parser, Debug)]
/// Compile a template into a Rust function taking a reference to the
/// given type and returning the nodes that the template produces.
struct Args {
    /// Path to the template file
    #[clap(short('t'), long)]
    template: PathBuf,

    /// The type of the data, as a Rust type expression (e.g. `Page`
    /// or `Vec<Item>`)
    #[clap(long("type"))]
    type_expr: String,

    /// Rust source file(s) declaring the structs and type aliases
    /// that the type refers to
    #[clap(long)]
    source: Vec<PathBuf>,

    /// Name of the generated function
    #[clap(long, default_value("render"))]
    function: String,

    /// Where to write the generated code (default: stdout)
    #[clap(short('o'), long)]
    output: Option<PathBuf>,

    /// Path to the runtime crate in the generated code (default:
    /// HTMPL_RUNTIME_CRATE env var, or "htmpl")
    #[clap(long)]
    runtime_crate: Option<String>,

    /// Make the generated function private
    #[clap(long)]
    private: bool,

    /// Instead of generating code, print the structure of the type
    /// as JSON
    #[clap(long)]
    dump_type: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut types = TypeTable::new();
    for path in &args.source {
        types.add_file(path)?;
    }

    if args.dump_type {
        let ty = types.resolve(&args.type_expr)?;
        println!("{}", serde_json::to_string_pretty(&ty)?);
        return Ok(())
    }

    let mut opts = GenOptions::from_env(&args.function)?;
    if let Some(rt) = args.runtime_crate {
        opts.runtime_crate = rt;
    }
    opts.public = !args.private;

    let template_str = std::fs::read_to_string(&args.template)
        .with_context(|| anyhow!("reading template {:?}", args.template))?;
    let template = parse_fragment(&template_str)
        .with_context(|| anyhow!("parsing template {:?}", args.template))?;

    let code = generate(&template, &args.type_expr, &types, &opts)
        .with_context(|| anyhow!("compiling template {:?}", args.template))?;

    match &args.output {
        Some(path) => {
            if path.is_dir() {
                bail!("output path {path:?} is a directory")
            }
            std::fs::write(path, code).with_context(|| anyhow!("writing {path:?}"))?
        }
        None => print!("{code}"),
    }
    Ok(())
}
