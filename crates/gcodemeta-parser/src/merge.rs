//! Combines filename-derived and file-derived records

use gcodemeta_core::MetadataRecord;

/// Merge two records over the same registry
///
/// A value found in the file always beats one guessed from the file name;
/// the file name only fills attributes the file left empty. The result has
/// exactly the key set of `file`.
pub fn merge(filename: &MetadataRecord, file: &MetadataRecord) -> MetadataRecord {
    let mut merged = file.clone();
    for (name, value) in filename.values() {
        merged.set_if_absent(name, value.clone());
    }
    merged
}
