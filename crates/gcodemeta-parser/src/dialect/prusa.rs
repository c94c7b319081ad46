//! PrusaSlicer family dialect (PrusaSlicer, SuperSlicer, Slic3r)
//!
//! Metadata is written as `; key = value` comments. Multi-material printers
//! emit one comma or semicolon separated value per tool; those produce a
//! per-tool list plus a single value reduced from it.

use std::sync::OnceLock;

use gcodemeta_core::units::{parse_duration, parse_flag, parse_number, parse_percent};
use gcodemeta_core::{attr, AttributeValue, Unit};
use regex::Regex;

use super::{parse_tool_list, same_or_nothing, Capture, DialectMatcher};

fn key_value_regex() -> &'static Regex {
    static KEY_VALUE: OnceLock<Regex> = OnceLock::new();
    KEY_VALUE.get_or_init(|| {
        Regex::new(r"^;\s*(?P<key>.*?) = (?P<value>.*)$").expect("invalid key/value pattern")
    })
}

fn generator_regex() -> &'static Regex {
    static GENERATOR: OnceLock<Regex> = OnceLock::new();
    GENERATOR.get_or_init(|| {
        Regex::new(r"^;\s*generated by (?P<slicer>PrusaSlicer|SuperSlicer|Slic3r)\b")
            .expect("invalid generator pattern")
    })
}

fn layer_change_regex() -> &'static Regex {
    static LAYER_CHANGE: OnceLock<Regex> = OnceLock::new();
    LAYER_CHANGE.get_or_init(|| Regex::new(r"^;Z:\d+\.\d+$").expect("invalid layer change pattern"))
}

/// How a per-tool list collapses into the single value
#[derive(Debug, Clone, Copy)]
enum Reduction {
    /// Consumption adds up across tools
    Sum,
    /// Settings only have a single value when every tool agrees
    Same,
}

struct ToolQuantity {
    key: &'static str,
    single: &'static str,
    per_tool: &'static str,
    unit: Unit,
    reduction: Reduction,
}

const TOOL_QUANTITIES: &[ToolQuantity] = &[
    ToolQuantity {
        key: "filament used [mm]",
        single: attr::FILAMENT_USED_MM,
        per_tool: attr::FILAMENT_USED_MM_PER_TOOL,
        unit: Unit::Millimeter,
        reduction: Reduction::Sum,
    },
    ToolQuantity {
        key: "filament used [g]",
        single: attr::FILAMENT_USED_G,
        per_tool: attr::FILAMENT_USED_G_PER_TOOL,
        unit: Unit::Gram,
        reduction: Reduction::Sum,
    },
    ToolQuantity {
        key: "filament used [cm3]",
        single: attr::FILAMENT_USED_CM3,
        per_tool: attr::FILAMENT_USED_CM3_PER_TOOL,
        unit: Unit::CubicCentimeter,
        reduction: Reduction::Sum,
    },
    ToolQuantity {
        key: "filament cost",
        single: attr::FILAMENT_COST,
        per_tool: attr::FILAMENT_COST_PER_TOOL,
        unit: Unit::Currency,
        reduction: Reduction::Sum,
    },
    ToolQuantity {
        key: "temperature",
        single: attr::TEMPERATURE,
        per_tool: attr::TEMPERATURE_PER_TOOL,
        unit: Unit::Celsius,
        reduction: Reduction::Same,
    },
    ToolQuantity {
        key: "bed_temperature",
        single: attr::BED_TEMPERATURE,
        per_tool: attr::BED_TEMPERATURE_PER_TOOL,
        unit: Unit::Celsius,
        reduction: Reduction::Same,
    },
    ToolQuantity {
        key: "nozzle_diameter",
        single: attr::NOZZLE_DIAMETER,
        per_tool: attr::NOZZLE_DIAMETER_PER_TOOL,
        unit: Unit::Millimeter,
        reduction: Reduction::Same,
    },
];

/// Matcher for `; key = value` comments written by the Slic3r family
#[derive(Debug, Default, Clone, Copy)]
pub struct PrusaSlicerMatcher;

impl PrusaSlicerMatcher {
    pub fn new() -> Self {
        Self
    }

    fn key_value(&self, key: &str, value: &str) -> Vec<Capture> {
        if let Some(spec) = TOOL_QUANTITIES.iter().find(|q| q.key == key) {
            return tool_quantity(spec, value);
        }

        let single = |attribute: &'static str, parsed: Option<AttributeValue>| {
            parsed
                .map(|v| vec![Capture::new(attribute, v, value)])
                .unwrap_or_default()
        };
        let mm = |text: &str| parse_number(text).map(|v| AttributeValue::quantity(v, Unit::Millimeter));

        match key {
            "estimated printing time (normal mode)" => {
                single(attr::ESTIMATED_TIME, parse_duration(value).map(AttributeValue::Duration))
            }
            "estimated printing time (silent mode)" => single(
                attr::ESTIMATED_TIME_SILENT,
                parse_duration(value).map(AttributeValue::Duration),
            ),
            "printer_model" => single(attr::PRINTER_MODEL, non_empty(value).map(AttributeValue::Text)),
            "layer_height" => single(attr::LAYER_HEIGHT, mm(value)),
            // percentages relative to layer_height are not normalized
            "first_layer_height" => single(attr::FIRST_LAYER_HEIGHT, mm(value)),
            "fill_density" => single(
                attr::FILL_DENSITY,
                parse_percent(value).map(|v| AttributeValue::quantity(v, Unit::Percent)),
            ),
            "brim_width" => single(attr::BRIM_WIDTH, mm(value)),
            "support_material" => single(attr::SUPPORT_MATERIAL, parse_flag(value).map(AttributeValue::Flag)),
            "ironing" => single(attr::IRONING, parse_flag(value).map(AttributeValue::Flag)),
            "filament_type" => text_list(value, attr::MATERIAL_PER_TOOL, Some(attr::MATERIAL)),
            "extruder_colour" => text_list(value, attr::EXTRUDER_COLOUR_PER_TOOL, None),
            _ => Vec::new(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_matches('"');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn tool_quantity(spec: &ToolQuantity, raw: &str) -> Vec<Capture> {
    let Some(values) = parse_tool_list(raw, ',', parse_number) else {
        return Vec::new();
    };

    let reduced = match spec.reduction {
        Reduction::Sum => Some(values.iter().sum::<f64>()),
        Reduction::Same => same_or_nothing(&values),
    };

    let mut captures = Vec::with_capacity(2);
    if let Some(value) = reduced {
        captures.push(Capture::new(spec.single, AttributeValue::quantity(value, spec.unit), raw));
    }
    captures.push(Capture::new(
        spec.per_tool,
        AttributeValue::PerTool {
            values,
            unit: spec.unit,
        },
        raw,
    ));
    captures
}

fn text_list(raw: &str, per_tool: &'static str, single: Option<&'static str>) -> Vec<Capture> {
    let Some(items) = parse_tool_list(raw, ';', non_empty) else {
        return Vec::new();
    };

    let mut captures = Vec::with_capacity(2);
    if let Some((name, value)) = single.zip(same_or_nothing(&items)) {
        captures.push(Capture::new(name, AttributeValue::Text(value), raw));
    }
    captures.push(Capture::new(per_tool, AttributeValue::TextList(items), raw));
    captures
}

impl DialectMatcher for PrusaSlicerMatcher {
    fn name(&self) -> &str {
        "prusaslicer"
    }

    fn description(&self) -> &str {
        "PrusaSlicer, SuperSlicer and Slic3r `; key = value` comments"
    }

    fn matches(&self, line: &str) -> Vec<Capture> {
        let line = line.trim_start();

        if let Some(caps) = generator_regex().captures(line) {
            let slicer = &caps["slicer"];
            return vec![Capture::new(attr::SLICER, AttributeValue::Choice(slicer.to_string()), slicer)];
        }

        if layer_change_regex().is_match(line) {
            return vec![Capture::new(attr::LAYER_INFO_PRESENT, AttributeValue::Flag(true), line)];
        }

        match key_value_regex().captures(line) {
            Some(caps) => self.key_value(caps["key"].trim(), caps["value"].trim()),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(line: &str) -> Vec<(&'static str, AttributeValue)> {
        PrusaSlicerMatcher::new()
            .matches(line)
            .into_iter()
            .map(|c| (c.attribute, c.value))
            .collect()
    }

    #[test]
    fn test_estimated_times() {
        assert_eq!(
            captured("; estimated printing time (normal mode) = 2h 6m 5s"),
            vec![(attr::ESTIMATED_TIME, AttributeValue::seconds(7565))]
        );
        assert_eq!(
            captured("; estimated printing time (silent mode) = 2h 10m 9s"),
            vec![(attr::ESTIMATED_TIME_SILENT, AttributeValue::seconds(7809))]
        );
        assert!(captured("; estimated printing time (normal mode) = soon").is_empty());
    }

    #[test]
    fn test_single_tool_usage() {
        assert_eq!(
            captured("; filament used [mm] = 4427.38"),
            vec![
                (attr::FILAMENT_USED_MM, AttributeValue::quantity(4427.38, Unit::Millimeter)),
                (
                    attr::FILAMENT_USED_MM_PER_TOOL,
                    AttributeValue::PerTool {
                        values: vec![4427.38],
                        unit: Unit::Millimeter
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_multi_tool_usage_is_summed() {
        let found = captured("; filament cost = 0.26, 0.10");
        assert_eq!(found[0].0, attr::FILAMENT_COST);
        let total = found[0].1.as_f64().unwrap();
        assert!((total - 0.36).abs() < 1e-9);
        assert_eq!(found[1].0, attr::FILAMENT_COST_PER_TOOL);
    }

    #[test]
    fn test_disagreeing_tools_have_no_single_value() {
        assert_eq!(
            captured("; temperature = 280,-280,280,280,280"),
            vec![(
                attr::TEMPERATURE_PER_TOOL,
                AttributeValue::PerTool {
                    values: vec![280.0, -280.0, 280.0, 280.0, 280.0],
                    unit: Unit::Celsius
                }
            )]
        );
    }

    #[test]
    fn test_unparsable_tool_list_is_dropped() {
        assert!(captured("; filament used [cm3] = 1, 2, , , 0.00").is_empty());
    }

    #[test]
    fn test_materials() {
        assert_eq!(
            captured("; filament_type = PLA;PLA"),
            vec![
                (attr::MATERIAL, AttributeValue::Text("PLA".to_string())),
                (
                    attr::MATERIAL_PER_TOOL,
                    AttributeValue::TextList(vec!["PLA".to_string(), "PLA".to_string()])
                ),
            ]
        );
        let mixed = captured("; filament_type = PETG;PLA");
        assert_eq!(mixed.len(), 1);
        assert_eq!(mixed[0].0, attr::MATERIAL_PER_TOOL);
    }

    #[test]
    fn test_colours_only_per_tool() {
        let found = captured("; extruder_colour = #FF8000;#808080");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, attr::EXTRUDER_COLOUR_PER_TOOL);
        assert!(captured("; extruder_colour = \"\"").is_empty());
    }

    #[test]
    fn test_layer_change_marker() {
        assert_eq!(
            captured(";Z:0.2"),
            vec![(attr::LAYER_INFO_PRESENT, AttributeValue::Flag(true))]
        );
        assert!(captured(";Z:").is_empty());
        assert!(captured(";Z:0.2 extra").is_empty());
    }

    #[test]
    fn test_settings() {
        assert_eq!(
            captured("; fill_density = 20%"),
            vec![(attr::FILL_DENSITY, AttributeValue::quantity(20.0, Unit::Percent))]
        );
        assert_eq!(
            captured("; support_material = 0"),
            vec![(attr::SUPPORT_MATERIAL, AttributeValue::Flag(false))]
        );
        assert_eq!(
            captured("; printer_model = MK3S"),
            vec![(attr::PRINTER_MODEL, AttributeValue::Text("MK3S".to_string()))]
        );
        assert!(captured("; first_layer_height = 75%").is_empty());
    }

    #[test]
    fn test_generator() {
        assert_eq!(
            captured("; generated by PrusaSlicer 2.6.0+linux-x64 on 2023-05-01 at 10:20:30 UTC"),
            vec![(attr::SLICER, AttributeValue::Choice("PrusaSlicer".to_string()))]
        );
    }

    #[test]
    fn test_unrelated_lines() {
        assert!(captured("; perimeters = 2").is_empty());
        assert!(captured(";TIME:3600").is_empty());
        assert!(captured("G1 X10 Y10").is_empty());
    }
}
