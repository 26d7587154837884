use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(version, about = "Print the box tree of an MP4/ISOBMFF file as JSON")]
struct Args {
    /// MP4/ISOBMFF file path
    path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // stdout carries the JSON, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let Some(path) = args.path else {
        println!("[Usage] $ mp4dump target.mp4");
        return Ok(());
    };

    let tree = mp4tree::parse(&path).with_context(|| format!("while parsing {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&tree)?);

    Ok(())
}
