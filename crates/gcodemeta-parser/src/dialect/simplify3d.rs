//! Simplify3D dialect
//!
//! Simplify3D dumps its profile as `;   key,value` lines in the header and
//! appends a build summary (`;   Build time: 1 hours 2 minutes`) at the end
//! of the file.

use std::sync::OnceLock;

use gcodemeta_core::units::{parse_duration, parse_flag, parse_length_mm, parse_number, parse_percent};
use gcodemeta_core::{attr, AttributeValue, Unit};
use regex::Regex;

use super::{Capture, DialectMatcher};

fn setting_regex() -> &'static Regex {
    static SETTING: OnceLock<Regex> = OnceLock::new();
    SETTING.get_or_init(|| {
        Regex::new(r"^;\s+(?P<key>[A-Za-z][A-Za-z0-9]*),(?P<value>.*)$")
            .expect("invalid Simplify3D setting pattern")
    })
}

fn summary_regex() -> &'static Regex {
    static SUMMARY: OnceLock<Regex> = OnceLock::new();
    SUMMARY.get_or_init(|| {
        Regex::new(
            r"^;\s+(?P<key>Build time|Filament length|Plastic volume|Plastic weight|Material cost):\s*(?P<value>.*?)\s*$",
        )
        .expect("invalid Simplify3D summary pattern")
    })
}

fn generator_regex() -> &'static Regex {
    static GENERATOR: OnceLock<Regex> = OnceLock::new();
    GENERATOR.get_or_init(|| {
        Regex::new(r"^;\s*G-Code generated by Simplify3D").expect("invalid Simplify3D generator pattern")
    })
}

/// Strip a trailing parenthesized conversion, `3.70 g (0.01 lb)` -> `3.70 g`
fn primary(value: &str) -> &str {
    value.split('(').next().unwrap_or(value).trim()
}

/// Matcher for Simplify3D profile dumps and build summaries
#[derive(Debug, Default, Clone, Copy)]
pub struct Simplify3dMatcher;

impl Simplify3dMatcher {
    pub fn new() -> Self {
        Self
    }

    fn setting(&self, key: &str, value: &str) -> Option<(&'static str, AttributeValue)> {
        // multi-extruder profiles list one value per extruder; the first is the primary tool
        let first = value.split(',').next().unwrap_or(value).trim();
        match key {
            "layerHeight" => parse_number(first)
                .map(|v| (attr::LAYER_HEIGHT, AttributeValue::quantity(v, Unit::Millimeter))),
            "extruderDiameter" => parse_number(first)
                .map(|v| (attr::NOZZLE_DIAMETER, AttributeValue::quantity(v, Unit::Millimeter))),
            "infillPercentage" => parse_percent(first)
                .map(|v| (attr::FILL_DENSITY, AttributeValue::quantity(v, Unit::Percent))),
            "generateSupport" => {
                parse_flag(first).map(|v| (attr::SUPPORT_MATERIAL, AttributeValue::Flag(v)))
            }
            "filamentType" | "materialName" => (!first.is_empty())
                .then(|| (attr::MATERIAL, AttributeValue::Text(first.to_string()))),
            _ => None,
        }
    }

    fn summary(&self, key: &str, value: &str) -> Option<(&'static str, AttributeValue)> {
        let value = primary(value);
        match key {
            "Build time" => parse_duration(value).map(|d| (attr::ESTIMATED_TIME, AttributeValue::Duration(d))),
            "Filament length" => parse_length_mm(value, 1.0)
                .map(|v| (attr::FILAMENT_USED_MM, AttributeValue::quantity(v, Unit::Millimeter))),
            "Plastic volume" => parse_number(value.trim_end_matches("mm^3")).map(|v| {
                (
                    attr::FILAMENT_USED_CM3,
                    AttributeValue::quantity(v / 1000.0, Unit::CubicCentimeter),
                )
            }),
            "Plastic weight" => parse_number(value.trim_end_matches('g'))
                .map(|v| (attr::FILAMENT_USED_G, AttributeValue::quantity(v, Unit::Gram))),
            "Material cost" => parse_number(value)
                .map(|v| (attr::FILAMENT_COST, AttributeValue::quantity(v, Unit::Currency))),
            _ => None,
        }
    }
}

impl DialectMatcher for Simplify3dMatcher {
    fn name(&self) -> &str {
        "simplify3d"
    }

    fn description(&self) -> &str {
        "Simplify3D profile dump and build summary"
    }

    fn matches(&self, line: &str) -> Vec<Capture> {
        let line = line.trim_start();

        if generator_regex().is_match(line) {
            return vec![Capture::new(
                attr::SLICER,
                AttributeValue::Choice("Simplify3D".to_string()),
                "Simplify3D",
            )];
        }

        let found = if let Some(caps) = summary_regex().captures(line) {
            self.summary(&caps["key"], &caps["value"])
                .map(|(attribute, value)| Capture::new(attribute, value, &caps["value"]))
        } else if let Some(caps) = setting_regex().captures(line) {
            self.setting(&caps["key"], &caps["value"])
                .map(|(attribute, value)| Capture::new(attribute, value, &caps["value"]))
        } else {
            None
        };

        found.into_iter().collect()
    }
}
