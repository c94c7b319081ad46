//! Metadata guessed from a file name
//!
//! PrusaSlicer's default output name template is
//! `{name}_{layer_height}mm_{material}_{printer}_{print_time}.gcode`. Names
//! following it yield five attributes at once. Other names are split into
//! tokens that are checked one by one against a few recognizable shapes: a
//! material, a duration, a layer height.

use std::path::Path;
use std::sync::OnceLock;

use gcodemeta_core::units::{parse_duration, parse_number};
use gcodemeta_core::{attr, AttributeRegistry, AttributeValue, MetadataRecord, Unit};
use regex::Regex;

/// Extensions accepted as G-code, compared case-insensitively
pub const GCODE_EXTENSIONS: &[&str] = &["gcode", "gc", "g", "gco"];

/// Filament materials recognized as stand-alone name tokens
const MATERIALS: &[&str] = &[
    "PLA", "PETG", "PET", "ABS", "ASA", "TPU", "FLEX", "PC", "PA", "NYLON", "PVA", "HIPS",
    "PP", "CPE", "PVB",
];

/// Layer heights above this are taken to be part dimensions
const MAX_LAYER_HEIGHT_MM: f64 = 2.0;

fn prusa_name_regex() -> &'static Regex {
    static PRUSA_NAME: OnceLock<Regex> = OnceLock::new();
    PRUSA_NAME.get_or_init(|| {
        Regex::new(
            r"^(?P<name>.*?)_(?P<height>[0-9.]+)mm_(?P<material>\w+)_(?P<printer>\w+)_(?P<time>.*)\.",
        )
        .expect("invalid PrusaSlicer file name pattern")
    })
}

fn layer_token_regex() -> &'static Regex {
    static LAYER_TOKEN: OnceLock<Regex> = OnceLock::new();
    LAYER_TOKEN.get_or_init(|| {
        Regex::new(r"^(?P<height>\d+(?:\.\d+)?)mm$").expect("invalid layer height token pattern")
    })
}

/// Check whether a path carries one of [`GCODE_EXTENSIONS`]
pub fn is_gcode_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            GCODE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Extracts attributes from a bare file name; never fails
pub struct FilenameHeuristics<'a> {
    registry: &'a AttributeRegistry,
}

impl<'a> FilenameHeuristics<'a> {
    pub fn new(registry: &'a AttributeRegistry) -> Self {
        Self { registry }
    }

    /// Build a record from `file_name`
    ///
    /// Directory components, if any slipped through, are ignored.
    pub fn parse(&self, file_name: &str) -> MetadataRecord {
        let mut record = MetadataRecord::new(self.registry);
        let base = file_name.rsplit(&['/', '\\'][..]).next().unwrap_or(file_name);
        if base.is_empty() {
            return record;
        }

        self.apply_prusa_template(base, &mut record);
        self.apply_tokens(strip_extension(base), &mut record);

        tracing::trace!("File name {:?} gave {} values", base, record.present_count());
        record
    }

    fn apply_prusa_template(&self, base: &str, record: &mut MetadataRecord) {
        let Some(caps) = prusa_name_regex().captures(base) else {
            return;
        };

        if !caps["name"].is_empty() {
            record.set_if_absent(attr::NAME, AttributeValue::Text(caps["name"].to_string()));
        }
        if let Some(height) = parse_number(&caps["height"]) {
            record.set_if_absent(attr::LAYER_HEIGHT, AttributeValue::quantity(height, Unit::Millimeter));
        }
        record.set_if_absent(attr::MATERIAL, AttributeValue::Text(caps["material"].to_string()));
        record.set_if_absent(attr::PRINTER_MODEL, AttributeValue::Text(caps["printer"].to_string()));
        if let Some(time) = parse_duration(&caps["time"]) {
            record.set_if_absent(attr::ESTIMATED_TIME, AttributeValue::Duration(time));
        }
    }

    fn apply_tokens(&self, stem: &str, record: &mut MetadataRecord) {
        let tokens = stem
            .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|token| !token.is_empty());

        for token in tokens {
            let upper = token.to_ascii_uppercase();
            if let Some(material) = MATERIALS.iter().find(|m| **m == upper) {
                record.set_if_absent(attr::MATERIAL, AttributeValue::Text(material.to_string()));
                continue;
            }

            if let Some(caps) = layer_token_regex().captures(token) {
                if let Some(height) = parse_number(&caps["height"])
                    .filter(|h| *h > 0.0 && *h <= MAX_LAYER_HEIGHT_MM)
                {
                    record.set_if_absent(
                        attr::LAYER_HEIGHT,
                        AttributeValue::quantity(height, Unit::Millimeter),
                    );
                }
                continue;
            }

            if token.starts_with(|c: char| c.is_ascii_digit()) {
                if let Some(time) = parse_duration(token) {
                    record.set_if_absent(attr::ESTIMATED_TIME, AttributeValue::Duration(time));
                }
            }
        }
    }
}

/// Drop a trailing `.ext` when it looks like an extension rather than a decimal
fn strip_extension(base: &str) -> &str {
    match base.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && ext.starts_with(|c: char| c.is_ascii_alphabetic())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => base,
    }
}
