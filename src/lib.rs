//! # gcodemeta
//!
//! Fast metadata extraction from slicer-generated G-code files.
//!
//! ## Architecture
//!
//! gcodemeta is organized as a workspace with multiple crates:
//!
//! 1. **gcodemeta-core** - Attribute registry, values, units, records, scan config, errors
//! 2. **gcodemeta-parser** - Comment block scanning, slicer dialects, quick/full parsers, merge
//! 3. **gcodemeta-settings** - Settings files (TOML or JSON)
//! 4. **gcodemeta** - Command line front end that ties the crates together

use std::fmt::Write as _;
use std::path::Path;

pub use gcodemeta_core::{
    attr, AttributeRegistry, AttributeSpec, AttributeValue, ConfigError, ExtractError,
    MetadataRecord, Result, ScanConfig, Unit, ValueKind,
};
pub use gcodemeta_parser::{
    merge, DialectMatcher, Extraction, Extractor, FilenameHeuristics, MatcherRegistry,
    ParseStage, Thumbnail, ThumbnailFormat,
};
pub use gcodemeta_settings::{Settings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging
///
/// `RUST_LOG` takes precedence over `default_filter`. Output goes to stderr
/// so it never mixes with extracted metadata on stdout.
pub fn init_logging(default_filter: &str, json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

fn stage_label(stage: ParseStage) -> &'static str {
    match stage {
        ParseStage::QuickAttempted => "quick",
        ParseStage::FullAttempted => "full",
    }
}

/// Render an extraction as indented `name: value` lines
pub fn render_text(path: &Path, extraction: &Extraction) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", path.display(), stage_label(extraction.stage));
    for (name, value) in extraction.record.values() {
        let _ = writeln!(out, "  {}: {}", name, value);
    }
    if !extraction.thumbnails.is_empty() {
        let keys: Vec<String> = extraction.thumbnails.iter().map(Thumbnail::key).collect();
        let _ = writeln!(out, "  thumbnails: {}", keys.join(", "));
    }
    if !extraction.missing_required.is_empty() {
        let _ = writeln!(out, "  missing: {}", extraction.missing_required.join(", "));
    }
    out
}
