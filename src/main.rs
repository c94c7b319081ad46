use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gcodemeta::{init_logging, render_text, AttributeRegistry, Extractor, MatcherRegistry, Settings};

#[derive(Parser)]
#[command(name = "gcodemeta", version)]
#[command(about = "Extract print metadata from slicer-generated G-code", long_about = None)]
struct Cli {
    /// G-code files to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Settings file (.toml or .json); defaults to the per-user config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print one JSON object per file
    #[arg(long)]
    json: bool,

    /// Skip decoding embedded thumbnails
    #[arg(long)]
    no_thumbnails: bool,

    /// Attributes that must be present before the full parse is skipped
    #[arg(long = "require", value_name = "ATTRIBUTE")]
    required: Vec<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn load_settings(cli: &Cli, registry: &AttributeRegistry) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_file(path, registry)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::load_or_default(registry)?,
    };
    if cli.no_thumbnails {
        settings.scan.thumbnails = false;
    }
    if !cli.required.is_empty() {
        settings.scan.required = cli.required.clone();
    }
    Ok(settings)
}

fn run(cli: &Cli) -> Result<bool> {
    let registry = Arc::new(AttributeRegistry::standard());
    let settings = load_settings(cli, &registry)?;
    init_logging(&settings.log_filter, cli.log_json)?;

    let extractor = Extractor::new(registry, settings.scan, MatcherRegistry::builtin())?;

    let mut all_ok = true;
    for path in &cli.files {
        match extractor.extract_path(path) {
            Ok(extraction) if cli.json => {
                let json = serde_json::json!({
                    "path": path,
                    "extraction": extraction,
                });
                println!("{}", serde_json::to_string(&json)?);
            }
            Ok(extraction) => print!("{}", render_text(path, &extraction)),
            Err(e) => {
                eprintln!("gcodemeta: {}", e);
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if run(&cli)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
