use std::{io::{BufWriter, Write}, path::PathBuf};

use anyhow::{Result, Context, anyhow};
use clap::Parser as ClapParser;
use htmpl::{Print, Value, evaluate, parse_fragment};

#[derive(clap::Parser, Debug)]
/// Render a template with JSON data, printing the resulting HTML to
/// stdout.
struct Args {
    /// Path to the template file
    #[clap(short('t'), long)]
    template: PathBuf,

    /// The data, as JSON; read from stdin if not given
    #[clap(short('d'), long)]
    data: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let template_str = std::fs::read_to_string(&args.template)
        .with_context(|| anyhow!("reading template {:?}", args.template))?;
    let template = parse_fragment(&template_str)
        .with_context(|| anyhow!("parsing template {:?}", args.template))?;

    let data: serde_json::Value = match &args.data {
        Some(s) => serde_json::from_str(s).with_context(|| anyhow!("parsing --data"))?,
        None => serde_json::from_reader(std::io::stdin().lock())
            .with_context(|| anyhow!("parsing JSON from stdin"))?,
    };

    let nodes = evaluate(&template, Value::from(data));
    let mut outp = BufWriter::new(std::io::stdout().lock());
    nodes.print_html_fragment(&mut outp)?;
    writeln!(&mut outp)?;
    outp.flush()?;
    Ok(())
}
