//! Cura dialect
//!
//! Cura writes `;KEY:value` headers. Plain Marlin flavour carries `;TIME:`,
//! `;Filament used:` and `;Layer height:`; the Griffin flavour used by
//! Ultimaker printers adds dotted keys such as `;PRINT.TIME:` and
//! `;EXTRUDER_TRAIN.0.NOZZLE.DIAMETER:`.

use std::sync::OnceLock;

use gcodemeta_core::units::{parse_length_mm, parse_number, parse_seconds};
use gcodemeta_core::{attr, AttributeValue, Unit};
use regex::Regex;

use super::{parse_tool_list, Capture, DialectMatcher};

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^;(?P<key>[A-Za-z][A-Za-z0-9_. ]*?):\s*(?P<value>.*?)\s*$")
            .expect("invalid Cura header pattern")
    })
}

fn generator_regex() -> &'static Regex {
    static GENERATOR: OnceLock<Regex> = OnceLock::new();
    GENERATOR.get_or_init(|| {
        Regex::new(r"^;\s*Generated with Cura_SteamEngine\b").expect("invalid Cura generator pattern")
    })
}

/// Matcher for Cura `;KEY:value` headers
#[derive(Debug, Default, Clone, Copy)]
pub struct CuraMatcher;

impl CuraMatcher {
    pub fn new() -> Self {
        Self
    }

    fn header(&self, key: &str, value: &str) -> Vec<Capture> {
        let quantity = |unit: Unit| parse_number(value).map(|v| AttributeValue::quantity(v, unit));

        let found = match key {
            "TIME" | "PRINT.TIME" => {
                Some((attr::ESTIMATED_TIME, parse_seconds(value).map(AttributeValue::Duration)))
            }
            "Filament used" => return filament_used(value),
            "Layer height" => Some((attr::LAYER_HEIGHT, quantity(Unit::Millimeter))),
            "LAYER_COUNT" => Some((attr::LAYER_COUNT, quantity(Unit::Count))),
            "TARGET_MACHINE.NAME" => {
                let name = value.trim();
                Some((
                    attr::PRINTER_MODEL,
                    (!name.is_empty()).then(|| AttributeValue::Text(name.to_string())),
                ))
            }
            "EXTRUDER_TRAIN.0.NOZZLE.DIAMETER" => {
                Some((attr::NOZZLE_DIAMETER, quantity(Unit::Millimeter)))
            }
            "EXTRUDER_TRAIN.0.INITIAL_TEMPERATURE" => {
                Some((attr::TEMPERATURE, quantity(Unit::Celsius)))
            }
            "BUILD_PLATE.INITIAL_TEMPERATURE" => {
                Some((attr::BED_TEMPERATURE, quantity(Unit::Celsius)))
            }
            // reported in cubic millimeters
            "EXTRUDER_TRAIN.0.MATERIAL.VOLUME_USED" => Some((
                attr::FILAMENT_USED_CM3,
                parse_number(value).map(|v| AttributeValue::quantity(v / 1000.0, Unit::CubicCentimeter)),
            )),
            _ => None,
        };

        match found {
            Some((attribute, Some(parsed))) => vec![Capture::new(attribute, parsed, value)],
            _ => Vec::new(),
        }
    }
}

/// `;Filament used: 1.2345m` or `;Filament used: 1.2m, 0.5m` for dual extrusion
fn filament_used(raw: &str) -> Vec<Capture> {
    let Some(values) = parse_tool_list(raw, ',', |part| parse_length_mm(part, 1000.0)) else {
        return Vec::new();
    };
    let total: f64 = values.iter().sum();
    vec![
        Capture::new(
            attr::FILAMENT_USED_MM,
            AttributeValue::quantity(total, Unit::Millimeter),
            raw,
        ),
        Capture::new(
            attr::FILAMENT_USED_MM_PER_TOOL,
            AttributeValue::PerTool {
                values,
                unit: Unit::Millimeter,
            },
            raw,
        ),
    ]
}

impl DialectMatcher for CuraMatcher {
    fn name(&self) -> &str {
        "cura"
    }

    fn description(&self) -> &str {
        "Ultimaker Cura `;KEY:value` headers (Marlin and Griffin flavours)"
    }

    fn matches(&self, line: &str) -> Vec<Capture> {
        let line = line.trim_start();

        if generator_regex().is_match(line) {
            return vec![Capture::new(
                attr::SLICER,
                AttributeValue::Choice("Cura".to_string()),
                "Cura_SteamEngine",
            )];
        }

        match header_regex().captures(line) {
            Some(caps) => self.header(caps["key"].trim(), &caps["value"]),
            None => Vec::new(),
        }
    }
}
