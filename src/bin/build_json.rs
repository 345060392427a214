//! GL API JSON Builder
//!
//! Expands includes, builds the deduplicated API model and prints its
//! canonical JSON form on stdout. The first conflicting definition aborts the
//! run with a nonzero exit status.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glapi_model::{load_document, Api, ConverterConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glapi-build-json")]
#[command(about = "Convert the GL API XML description to canonical JSON")]
struct Cli {
    /// Top-level API description (e.g. gl_API.xml)
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConverterConfig::load().context("failed to load configuration")?;

    let root = load_document(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let api = Api::from_xml(&root)?;

    println!("{}", api.to_json_with(config.output.format)?);
    Ok(())
}
