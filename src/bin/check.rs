//! GL API Checker
//!
//! Lints the API description and prints every violation found. Exits with a
//! nonzero status only after the whole document has been scanned.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glapi_model::{load_document, ApiLinter, ConverterConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glapi-check")]
#[command(about = "Check the GL API XML description for structural and naming problems")]
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

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = ConverterConfig::load().context("failed to load configuration")?;

    let root = load_document(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let linter = ApiLinter::new(&config)?;
    let report = linter.lint(&root);

    println!("{}", report.stats);
    for violation in &report.violations {
        println!("{}", violation);
    }

    if report.is_clean() {
        println!("✅ No problems found");
    } else {
        println!("❌ {} problem(s) found", report.violations.len());
    }
    Ok(report.is_clean())
}
