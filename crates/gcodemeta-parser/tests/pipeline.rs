use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gcodemeta_core::{attr, AttributeRegistry, AttributeValue, ExtractError, ScanConfig, Unit};
use gcodemeta_parser::{
    Extractor, FilenameHeuristics, FullParser, MatcherRegistry, ParseStage, QuickParser,
    ThumbnailFormat,
};
use tempfile::TempDir;

const PRUSA_HEADER: &str = "\
; generated by PrusaSlicer 2.6.0+linux-x64-GTK3 on 2023-05-01 at 10:20:30 UTC

;

; thumbnail begin 16x16 16
; aGVsbG8gd29ybGQ=
; thumbnail end

; external perimeters extrusion width = 0.45mm
M73 P0 R126
M201 X1000 Y1000 Z200 E5000
";

const PRUSA_FOOTER: &str = "\
M107
; filament used [mm] = 4427.38
; filament used [cm3] = 10.65
; filament used [g] = 13.63
; filament cost = 0.34
; total filament used [g] = 13.63
; estimated printing time (normal mode) = 2h 6m 5s
; estimated printing time (silent mode) = 2h 10m 9s

; prusaslicer_config = begin
; bed_temperature = 90
; brim_width = 0
; extruder_colour = \"\"
; filament_type = PETG
; fill_density = 20%
; first_layer_height = 0.2
; ironing = 0
; layer_height = 0.15
; nozzle_diameter = 0.4
; printer_model = MK3S
; support_material = 0
; temperature = 250
; prusaslicer_config = end
";

fn moves(count: usize) -> String {
    (0..count)
        .map(|i| format!("G1 X{}.000 Y{}.000 E0.0500\n", i % 200, (i * 7) % 200))
        .collect()
}

fn write_gcode(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Extractor whose windows are small enough that fixtures have a middle
fn windowed_extractor(window: usize) -> Extractor {
    Extractor::new(
        Arc::new(AttributeRegistry::standard()),
        ScanConfig::default().with_window(window),
        MatcherRegistry::builtin(),
    )
    .unwrap()
}

fn number(extraction: &gcodemeta_parser::Extraction, name: &str) -> Option<f64> {
    extraction.record.get(name).and_then(|v| v.as_f64())
}

fn text<'a>(extraction: &'a gcodemeta_parser::Extraction, name: &str) -> Option<&'a str> {
    extraction.record.get(name).and_then(|v| v.as_str())
}

#[test]
fn test_prusa_file_completes_in_quick_stage() {
    let dir = TempDir::new().unwrap();
    let content = format!("{}{}{}", PRUSA_HEADER, moves(1000), PRUSA_FOOTER);
    let path = write_gcode(&dir, "upload.tmp", &content);

    let extraction = windowed_extractor(4096)
        .extract(&path, "benchy_0.2mm_PLA_MK3S_2h.gcode")
        .unwrap();

    assert_eq!(extraction.stage, ParseStage::QuickAttempted);
    assert!(extraction.missing_required.is_empty());

    assert_eq!(
        extraction.record.get(attr::ESTIMATED_TIME),
        Some(&AttributeValue::seconds(7565))
    );
    assert_eq!(
        extraction.record.get(attr::ESTIMATED_TIME_SILENT),
        Some(&AttributeValue::seconds(7809))
    );
    assert_eq!(number(&extraction, attr::FILAMENT_USED_MM), Some(4427.38));
    assert_eq!(number(&extraction, attr::FILAMENT_USED_G), Some(13.63));
    assert_eq!(number(&extraction, attr::TEMPERATURE), Some(250.0));
    assert_eq!(number(&extraction, attr::BED_TEMPERATURE), Some(90.0));
    assert_eq!(number(&extraction, attr::FILL_DENSITY), Some(20.0));
    assert_eq!(
        extraction.record.get(attr::SLICER),
        Some(&AttributeValue::Choice("PrusaSlicer".to_string()))
    );
    assert_eq!(
        extraction.record.get(attr::SUPPORT_MATERIAL),
        Some(&AttributeValue::Flag(false))
    );

    // file values beat the file name, the name fills the rest
    assert_eq!(number(&extraction, attr::LAYER_HEIGHT), Some(0.15));
    assert_eq!(text(&extraction, attr::MATERIAL), Some("PETG"));
    assert_eq!(text(&extraction, attr::PRINTER_MODEL), Some("MK3S"));
    assert_eq!(text(&extraction, attr::NAME), Some("benchy"));

    assert_eq!(extraction.thumbnails.len(), 1);
    assert_eq!(extraction.thumbnails[0].format, ThumbnailFormat::Png);
    assert_eq!(extraction.thumbnails[0].data, b"hello world");
}

#[test]
fn test_multi_material_footer() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "{}{}{}",
        PRUSA_HEADER,
        moves(50),
        "\
; filament used [mm] = 3120.30, 1200.00
; filament used [g] = 9.37, 3.80
; filament cost = 0.26, 0.10
; estimated printing time (normal mode) = 1d 2h 3m 4s
; filament_type = PLA;PETG
; temperature = 215,240
; nozzle_diameter = 0.4,0.4
"
    );
    let path = write_gcode(&dir, "mmu.gcode", &content);

    let extraction = Extractor::standard().extract_path(&path).unwrap();

    assert_eq!(extraction.stage, ParseStage::QuickAttempted);
    assert!((number(&extraction, attr::FILAMENT_USED_MM).unwrap() - 4320.3).abs() < 1e-6);
    assert_eq!(
        extraction.record.get(attr::FILAMENT_USED_G_PER_TOOL),
        Some(&AttributeValue::PerTool {
            values: vec![9.37, 3.8],
            unit: Unit::Gram
        })
    );
    assert_eq!(
        extraction.record.get(attr::MATERIAL_PER_TOOL),
        Some(&AttributeValue::TextList(vec![
            "PLA".to_string(),
            "PETG".to_string()
        ]))
    );
    assert!(!extraction.record.is_set(attr::MATERIAL));
    assert!(!extraction.record.is_set(attr::TEMPERATURE));
    assert_eq!(number(&extraction, attr::NOZZLE_DIAMETER), Some(0.4));
}

#[test]
fn test_incomplete_quick_parse_falls_back_to_full() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        ";FLAVOR:Marlin\n;TIME:3600\n;Layer height: 0.2\n;Generated with Cura_SteamEngine 5.2.1\nM140 S60\n{};Filament used: 2.5m\n{}M84\n;End of Gcode\n",
        moves(500),
        moves(500)
    );
    let path = write_gcode(&dir, "cube.gcode", &content);

    let extraction = windowed_extractor(2048).extract_path(&path).unwrap();

    assert_eq!(extraction.stage, ParseStage::FullAttempted);
    assert!(extraction.missing_required.is_empty());
    assert_eq!(
        extraction.record.get(attr::ESTIMATED_TIME),
        Some(&AttributeValue::seconds(3600))
    );
    assert_eq!(number(&extraction, attr::FILAMENT_USED_MM), Some(2500.0));
    assert_eq!(
        extraction.record.get(attr::SLICER),
        Some(&AttributeValue::Choice("Cura".to_string()))
    );
}

#[test]
fn test_full_stage_reports_what_is_still_missing() {
    let dir = TempDir::new().unwrap();
    let path = write_gcode(&dir, "part.gcode", &moves(20));

    let extraction = Extractor::standard().extract_path(&path).unwrap();

    assert_eq!(extraction.stage, ParseStage::FullAttempted);
    assert_eq!(
        extraction.missing_required,
        vec![attr::ESTIMATED_TIME.to_string(), attr::FILAMENT_USED_MM.to_string()]
    );
    assert!(extraction.record.is_empty());
}

#[test]
fn test_filename_only_record() {
    let dir = TempDir::new().unwrap();
    let path = write_gcode(&dir, "PLA_120min_object.gcode", "G28\nG1 X10 Y10\n");

    let extraction = Extractor::standard().extract_path(&path).unwrap();
    let from_name =
        FilenameHeuristics::new(&AttributeRegistry::standard()).parse("PLA_120min_object.gcode");

    assert_eq!(extraction.record, from_name);
    assert_eq!(text(&extraction, attr::MATERIAL), Some("PLA"));
    assert_eq!(
        extraction.record.get(attr::ESTIMATED_TIME),
        Some(&AttributeValue::seconds(7200))
    );
}

#[test]
fn test_cura_time_without_filename_hints() {
    let dir = TempDir::new().unwrap();
    let path = write_gcode(&dir, "object.gcode", ";TIME:3600\nG28\n");

    let extraction = Extractor::standard().extract_path(&path).unwrap();
    assert_eq!(
        extraction.record.get(attr::ESTIMATED_TIME),
        Some(&AttributeValue::seconds(3600))
    );
}

#[test]
fn test_file_time_overrides_filename_time() {
    let dir = TempDir::new().unwrap();
    let path = write_gcode(
        &dir,
        "part_120min.gcode",
        "; estimated printing time (normal mode) = 1h 0m 0s\nG28\n",
    );

    let extraction = Extractor::standard().extract_path(&path).unwrap();
    assert_eq!(
        extraction.record.get(attr::ESTIMATED_TIME),
        Some(&AttributeValue::seconds(3600))
    );
}

#[test]
fn test_tiny_file_quick_and_full_agree() {
    let dir = TempDir::new().unwrap();
    let path = write_gcode(&dir, "tiny.gcode", ";TIME:360\n");
    assert_eq!(fs::metadata(&path).unwrap().len(), 10);

    let registry = AttributeRegistry::standard();
    let config = ScanConfig::default();
    let matchers = MatcherRegistry::builtin();

    let quick = QuickParser::new(&registry, &config, &matchers)
        .parse(&path)
        .unwrap();
    let full = FullParser::new(&registry, &config, &matchers)
        .parse(&path)
        .unwrap();

    assert_eq!(quick.record, full.record);
    assert_eq!(quick.record.present_count(), 1);
    assert_eq!(
        quick.record.get(attr::ESTIMATED_TIME),
        Some(&AttributeValue::seconds(360))
    );
}

#[test]
fn test_layer_markers_found_by_full_parse() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "{}{};Z:0.2\n{}{}",
        PRUSA_HEADER,
        moves(200),
        moves(200),
        PRUSA_FOOTER
    );
    let path = write_gcode(&dir, "layers.gcode", &content);

    let extractor = Extractor::new(
        Arc::new(AttributeRegistry::standard()),
        ScanConfig::default()
            .with_window(2048)
            .with_required([attr::LAYER_INFO_PRESENT]),
        MatcherRegistry::builtin(),
    )
    .unwrap();
    let extraction = extractor.extract_path(&path).unwrap();

    assert_eq!(extraction.stage, ParseStage::FullAttempted);
    assert_eq!(
        extraction.record.get(attr::LAYER_INFO_PRESENT),
        Some(&AttributeValue::Flag(true))
    );
    assert!(extraction.missing_required.is_empty());
}

#[test]
fn test_unterminated_thumbnail_does_not_hide_later_metadata() {
    let dir = TempDir::new().unwrap();
    let path = write_gcode(
        &dir,
        "broken.gcode",
        "; thumbnail begin 16x16 16\n; aGVs\nG28\nG1 X1\n; Zm9v\n;TIME:3600\n",
    );

    let registry = AttributeRegistry::standard();
    let config = ScanConfig::default();
    let matchers = MatcherRegistry::builtin();

    let full = FullParser::new(&registry, &config, &matchers)
        .parse(&path)
        .unwrap();
    assert_eq!(
        full.record.get(attr::ESTIMATED_TIME),
        Some(&AttributeValue::seconds(3600))
    );
    assert!(full.thumbnails.is_empty());

    let quick = QuickParser::new(&registry, &config, &matchers)
        .parse(&path)
        .unwrap();
    assert_eq!(quick.record, full.record);
    assert!(quick.thumbnails.is_empty());
}

#[test]
fn test_missing_file_is_unreadable() {
    let err = Extractor::standard()
        .extract(Path::new("/nonexistent/dir/part.gcode"), "part.gcode")
        .unwrap_err();
    assert!(matches!(err, ExtractError::Unreadable { .. }));
    assert!(err.is_io());
}

#[test]
fn test_thumbnails_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let content = format!("{}{}", PRUSA_HEADER, PRUSA_FOOTER);
    let path = write_gcode(&dir, "thumbs.gcode", &content);

    let extractor = Extractor::new(
        Arc::new(AttributeRegistry::standard()),
        ScanConfig::default().with_thumbnails(false),
        MatcherRegistry::builtin(),
    )
    .unwrap();
    let extraction = extractor.extract_path(&path).unwrap();

    assert!(extraction.thumbnails.is_empty());
    assert!(extraction.missing_required.is_empty());
}

#[test]
fn test_uppercase_extension_accepted() {
    let dir = TempDir::new().unwrap();
    let path = write_gcode(&dir, "PART.GCODE", ";TIME:60\n");
    assert!(Extractor::standard().extract_path(&path).is_ok());
}

#[test]
fn test_extraction_serializes() {
    let dir = TempDir::new().unwrap();
    let path = write_gcode(&dir, "object.gcode", ";TIME:3600\n");

    let extraction = Extractor::standard().extract_path(&path).unwrap();
    let json = serde_json::to_value(&extraction).unwrap();

    assert_eq!(json["stage"], "full_attempted");
    assert_eq!(json["record"]["estimated_time"]["value"], 3600);
    assert!(json["record"]["filament_used_mm"].is_null());
    assert_eq!(json["missing_required"][0], "filament_used_mm");
}
