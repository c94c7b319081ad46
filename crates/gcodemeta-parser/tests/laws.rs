use std::fs;

use gcodemeta_core::{attr, AttributeRegistry, AttributeValue, MetadataRecord, ScanConfig, Unit};
use gcodemeta_parser::{merge, Extractor, FilenameHeuristics, FullParser, MatcherRegistry, QuickParser};
use proptest::prelude::*;
use tempfile::TempDir;

fn comment_or_code_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("G28".to_string()),
        (0u32..500).prop_map(|x| format!("G1 X{} Y{}", x, x / 2)),
        (1u64..100_000).prop_map(|s| format!(";TIME:{}", s)),
        (1u32..5000).prop_map(|mm| format!("; filament used [mm] = {}.5", mm)),
        Just("; estimated printing time (normal mode) = 1h 2m 3s".to_string()),
        Just("; layer_height = 0.2".to_string()),
        Just(";Layer height: 0.3".to_string()),
        Just("; filament_type = PLA;PETG".to_string()),
        Just("; temperature = 215,215".to_string()),
        Just(";   Build time: 1 hours 5 minutes".to_string()),
        "[a-z =:]{0,20}".prop_map(|t| format!("; {}", t)),
        Just("; thumbnail begin 16x16 16".to_string()),
        Just("; aGVsbG8gd29ybGQ=".to_string()),
        Just("; thumbnail end".to_string()),
    ]
}

fn name_values() -> Vec<(&'static str, AttributeValue)> {
    vec![
        (attr::NAME, AttributeValue::Text("benchy".to_string())),
        (attr::MATERIAL, AttributeValue::Text("PLA".to_string())),
        (attr::ESTIMATED_TIME, AttributeValue::seconds(7200)),
        (attr::LAYER_HEIGHT, AttributeValue::quantity(0.2, Unit::Millimeter)),
        (attr::PRINTER_MODEL, AttributeValue::Text("MK4".to_string())),
    ]
}

fn file_values() -> Vec<(&'static str, AttributeValue)> {
    vec![
        (attr::MATERIAL, AttributeValue::Text("PETG".to_string())),
        (attr::ESTIMATED_TIME, AttributeValue::seconds(3600)),
        (attr::LAYER_HEIGHT, AttributeValue::quantity(0.15, Unit::Millimeter)),
        (attr::FILAMENT_USED_MM, AttributeValue::quantity(1234.5, Unit::Millimeter)),
        (attr::SUPPORT_MATERIAL, AttributeValue::Flag(true)),
    ]
}

fn record_from(pool: Vec<(&'static str, AttributeValue)>, mask: &[bool]) -> MetadataRecord {
    let mut record = MetadataRecord::new(&AttributeRegistry::standard());
    for ((name, value), keep) in pool.into_iter().zip(mask) {
        if *keep {
            record.set_if_absent(name, value);
        }
    }
    record
}

fn assert_registry_shape(record: &MetadataRecord) {
    let registry = AttributeRegistry::standard();
    let keys: Vec<&str> = record.keys().collect();
    let names: Vec<&str> = registry.names().collect();
    assert_eq!(keys, names);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_quick_matches_full_for_small_files(
        lines in proptest::collection::vec(comment_or_code_line(), 0..40),
        trailing_newline in any::<bool>(),
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.gcode");
        let mut content = lines.join("\n");
        if trailing_newline {
            content.push('\n');
        }
        fs::write(&path, &content).unwrap();

        let registry = AttributeRegistry::standard();
        let config = ScanConfig::default();
        let matchers = MatcherRegistry::builtin();

        let quick = QuickParser::new(&registry, &config, &matchers).parse(&path).unwrap();
        let full = FullParser::new(&registry, &config, &matchers).parse(&path).unwrap();

        prop_assert_eq!(quick.record, full.record);
        prop_assert_eq!(quick.thumbnails, full.thumbnails);
    }

    #[test]
    fn prop_extraction_record_covers_registry(
        name in "[A-Za-z0-9_. -]{0,40}",
        lines in proptest::collection::vec(comment_or_code_line(), 0..20),
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("upload.gcode");
        fs::write(&path, lines.join("\n")).unwrap();

        let extraction = Extractor::standard().extract(&path, &name).unwrap();
        assert_registry_shape(&extraction.record);
    }

    #[test]
    fn prop_filename_record_covers_registry(name in "\\PC{0,60}") {
        let record = FilenameHeuristics::new(&AttributeRegistry::standard()).parse(&name);
        assert_registry_shape(&record);
    }

    #[test]
    fn prop_merge_is_idempotent(mask in proptest::collection::vec(any::<bool>(), 5)) {
        let record = record_from(file_values(), &mask);
        prop_assert_eq!(merge(&record, &record), record);
    }

    #[test]
    fn prop_file_values_take_precedence(
        name_mask in proptest::collection::vec(any::<bool>(), 5),
        file_mask in proptest::collection::vec(any::<bool>(), 5),
    ) {
        let from_name = record_from(name_values(), &name_mask);
        let from_file = record_from(file_values(), &file_mask);
        let merged = merge(&from_name, &from_file);

        assert_registry_shape(&merged);
        for (key, value) in merged.entries() {
            let expected = from_file.get(key).or_else(|| from_name.get(key));
            prop_assert_eq!(value, expected);
        }
    }
}
