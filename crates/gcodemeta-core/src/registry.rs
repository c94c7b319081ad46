//! Attribute registry
//!
//! The registry is the fixed schema of extractable attributes. It is built
//! once, shared read-only (usually behind an `Arc`) and never mutated.
//! Every [`MetadataRecord`](crate::MetadataRecord) carries exactly the keys
//! of the registry it was created from.

use crate::error::ConfigError;
use crate::units::Unit;
use crate::value::ValueKind;

/// Attribute names of the standard registry
pub mod attr {
    pub const NAME: &str = "name";
    pub const SLICER: &str = "slicer";
    pub const PRINTER_MODEL: &str = "printer_model";
    pub const MATERIAL: &str = "material";
    pub const ESTIMATED_TIME: &str = "estimated_time";
    pub const ESTIMATED_TIME_SILENT: &str = "estimated_time_silent";
    pub const LAYER_HEIGHT: &str = "layer_height";
    pub const FIRST_LAYER_HEIGHT: &str = "first_layer_height";
    pub const NOZZLE_DIAMETER: &str = "nozzle_diameter";
    pub const FILL_DENSITY: &str = "fill_density";
    pub const BRIM_WIDTH: &str = "brim_width";
    pub const SUPPORT_MATERIAL: &str = "support_material";
    pub const IRONING: &str = "ironing";
    pub const LAYER_COUNT: &str = "layer_count";
    pub const LAYER_INFO_PRESENT: &str = "layer_info_present";
    pub const FILAMENT_USED_MM: &str = "filament_used_mm";
    pub const FILAMENT_USED_G: &str = "filament_used_g";
    pub const FILAMENT_USED_CM3: &str = "filament_used_cm3";
    pub const FILAMENT_COST: &str = "filament_cost";
    pub const TEMPERATURE: &str = "temperature";
    pub const BED_TEMPERATURE: &str = "bed_temperature";
    pub const FILAMENT_USED_MM_PER_TOOL: &str = "filament_used_mm_per_tool";
    pub const FILAMENT_USED_G_PER_TOOL: &str = "filament_used_g_per_tool";
    pub const FILAMENT_USED_CM3_PER_TOOL: &str = "filament_used_cm3_per_tool";
    pub const FILAMENT_COST_PER_TOOL: &str = "filament_cost_per_tool";
    pub const TEMPERATURE_PER_TOOL: &str = "temperature_per_tool";
    pub const BED_TEMPERATURE_PER_TOOL: &str = "bed_temperature_per_tool";
    pub const NOZZLE_DIAMETER_PER_TOOL: &str = "nozzle_diameter_per_tool";
    pub const MATERIAL_PER_TOOL: &str = "material_per_tool";
    pub const EXTRUDER_COLOUR_PER_TOOL: &str = "extruder_colour_per_tool";
}

/// Slicers recognized by the built-in dialects
pub const SLICERS: &[&str] = &["PrusaSlicer", "SuperSlicer", "Slic3r", "Cura", "Simplify3D"];

/// Declaration of one extractable attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Registry key
    pub name: &'static str,
    /// Semantic type
    pub kind: ValueKind,
    /// Optional hint for parsers, e.g. the slicer key it usually comes from
    pub hint: Option<&'static str>,
    /// Human-readable description
    pub description: &'static str,
}

impl AttributeSpec {
    /// Declare an attribute without a parser hint
    pub const fn new(name: &'static str, kind: ValueKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            hint: None,
            description,
        }
    }

    /// Attach a parser hint
    pub const fn with_hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Unit of numeric attributes
    pub fn unit(&self) -> Option<Unit> {
        self.kind.unit()
    }
}

/// Ordered, immutable set of attribute declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRegistry {
    specs: Vec<AttributeSpec>,
}

impl AttributeRegistry {
    /// Build a registry from declarations, rejecting duplicate names
    pub fn new(specs: Vec<AttributeSpec>) -> Result<Self, ConfigError> {
        for (index, spec) in specs.iter().enumerate() {
            if specs[..index].iter().any(|earlier| earlier.name == spec.name) {
                return Err(ConfigError::DuplicateAttribute(spec.name.to_string()));
            }
        }
        Ok(Self { specs })
    }

    /// The built-in registry used by the standard dialects
    pub fn standard() -> Self {
        use attr::*;
        use ValueKind::*;

        let specs = vec![
            AttributeSpec::new(NAME, Text, "Model name"),
            AttributeSpec::new(SLICER, Choice(SLICERS), "Slicer that produced the file"),
            AttributeSpec::new(PRINTER_MODEL, Text, "Target printer model")
                .with_hint("printer_model"),
            AttributeSpec::new(MATERIAL, Text, "Filament material").with_hint("filament_type"),
            AttributeSpec::new(ESTIMATED_TIME, Duration, "Estimated print time")
                .with_hint("estimated printing time (normal mode)"),
            AttributeSpec::new(ESTIMATED_TIME_SILENT, Duration, "Estimated print time in silent mode")
                .with_hint("estimated printing time (silent mode)"),
            AttributeSpec::new(LAYER_HEIGHT, Quantity(Unit::Millimeter), "Layer height"),
            AttributeSpec::new(FIRST_LAYER_HEIGHT, Quantity(Unit::Millimeter), "First layer height"),
            AttributeSpec::new(NOZZLE_DIAMETER, Quantity(Unit::Millimeter), "Nozzle diameter"),
            AttributeSpec::new(FILL_DENSITY, Quantity(Unit::Percent), "Infill density"),
            AttributeSpec::new(BRIM_WIDTH, Quantity(Unit::Millimeter), "Brim width"),
            AttributeSpec::new(SUPPORT_MATERIAL, Flag, "Supports enabled"),
            AttributeSpec::new(IRONING, Flag, "Ironing enabled"),
            AttributeSpec::new(LAYER_COUNT, Quantity(Unit::Count), "Number of layers"),
            AttributeSpec::new(LAYER_INFO_PRESENT, Flag, "Layer change markers present"),
            AttributeSpec::new(FILAMENT_USED_MM, Quantity(Unit::Millimeter), "Filament length")
                .with_hint("filament used [mm]"),
            AttributeSpec::new(FILAMENT_USED_G, Quantity(Unit::Gram), "Filament weight")
                .with_hint("filament used [g]"),
            AttributeSpec::new(FILAMENT_USED_CM3, Quantity(Unit::CubicCentimeter), "Filament volume")
                .with_hint("filament used [cm3]"),
            AttributeSpec::new(FILAMENT_COST, Quantity(Unit::Currency), "Filament cost"),
            AttributeSpec::new(TEMPERATURE, Quantity(Unit::Celsius), "Nozzle temperature"),
            AttributeSpec::new(BED_TEMPERATURE, Quantity(Unit::Celsius), "Bed temperature"),
            AttributeSpec::new(FILAMENT_USED_MM_PER_TOOL, PerTool(Unit::Millimeter), "Filament length per tool"),
            AttributeSpec::new(FILAMENT_USED_G_PER_TOOL, PerTool(Unit::Gram), "Filament weight per tool"),
            AttributeSpec::new(FILAMENT_USED_CM3_PER_TOOL, PerTool(Unit::CubicCentimeter), "Filament volume per tool"),
            AttributeSpec::new(FILAMENT_COST_PER_TOOL, PerTool(Unit::Currency), "Filament cost per tool"),
            AttributeSpec::new(TEMPERATURE_PER_TOOL, PerTool(Unit::Celsius), "Nozzle temperature per tool"),
            AttributeSpec::new(BED_TEMPERATURE_PER_TOOL, PerTool(Unit::Celsius), "Bed temperature per tool"),
            AttributeSpec::new(NOZZLE_DIAMETER_PER_TOOL, PerTool(Unit::Millimeter), "Nozzle diameter per tool"),
            AttributeSpec::new(MATERIAL_PER_TOOL, TextList, "Filament material per tool"),
            AttributeSpec::new(EXTRUDER_COLOUR_PER_TOOL, TextList, "Extruder colour per tool"),
        ];

        Self { specs }
    }

    /// Look up an attribute by name
    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Check whether `name` is a registry key
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate declarations in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.specs.iter()
    }

    /// Attribute names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|spec| spec.name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
