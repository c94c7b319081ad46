//! Extraction pipeline
//!
//! ```text
//! file name ─> FilenameHeuristics ──────────────────────┐
//!                                                      ├─> merge ─> record
//! file ─> QuickParser ─(incomplete)─> FullParser ───────┤
//!              └─────────(complete)─────────────────────┘
//! ```
//!
//! The quick parser reads only the comment blocks at either end of the file.
//! If any required attribute is still missing afterwards, the file is read
//! again from the start by the full parser, whose record replaces the quick
//! one entirely. Each stage opens and closes the file itself, so a caller
//! that needs to abort can do so between stages.

use std::path::Path;
use std::sync::Arc;

use gcodemeta_core::{
    AttributeRegistry, ConfigError, ExtractError, MetadataRecord, Result, ScanConfig,
};
use serde::Serialize;

use crate::dialect::MatcherRegistry;
use crate::filename::{is_gcode_path, FilenameHeuristics};
use crate::full::FullParser;
use crate::merge::merge;
use crate::quick::QuickParser;
use crate::thumbnail::Thumbnail;

/// How far the pipeline went for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    /// Only the head and tail comment blocks were read
    QuickAttempted,
    /// The quick parse was incomplete and the whole file was read
    FullAttempted,
}

/// Result of extracting one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// Merged record, file values over file name values
    pub record: MetadataRecord,
    /// Thumbnails from whichever stage produced the file record
    pub thumbnails: Vec<Thumbnail>,
    /// Last stage reached
    pub stage: ParseStage,
    /// Required attributes absent from the merged record
    pub missing_required: Vec<String>,
}

/// File-derived part of an extraction
struct FileDerived {
    record: MetadataRecord,
    thumbnails: Vec<Thumbnail>,
}

/// Drives filename heuristics, the quick/full parsers and the merge
///
/// Holds no per-file state; one instance can serve many files and threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    registry: Arc<AttributeRegistry>,
    config: ScanConfig,
    matchers: MatcherRegistry,
}

impl Extractor {
    /// Create an extractor after validating `config` against `registry`
    pub fn new(
        registry: Arc<AttributeRegistry>,
        config: ScanConfig,
        matchers: MatcherRegistry,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate(&registry)?;
        Ok(Self {
            registry,
            config,
            matchers,
        })
    }

    /// Standard registry, default config and every built-in dialect
    pub fn standard() -> Self {
        Self {
            registry: Arc::new(AttributeRegistry::standard()),
            config: ScanConfig::default(),
            matchers: MatcherRegistry::builtin(),
        }
    }

    pub fn registry(&self) -> &Arc<AttributeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn matchers(&self) -> &MatcherRegistry {
        &self.matchers
    }

    /// Extract metadata from the file at `path`
    ///
    /// `file_name` is the bare name used for heuristics; it may differ from
    /// the final component of `path` (uploads stored under temporary names).
    ///
    /// # Errors
    /// Only I/O faults are errors. No partial record is returned with them.
    pub fn extract(&self, path: &Path, file_name: &str) -> Result<Extraction> {
        let from_name = FilenameHeuristics::new(&self.registry).parse(file_name);

        let mut stage = ParseStage::QuickAttempted;
        let FileDerived { record, thumbnails } = loop {
            match stage {
                ParseStage::QuickAttempted => {
                    let quick =
                        QuickParser::new(&self.registry, &self.config, &self.matchers).parse(path)?;
                    if quick.is_complete() {
                        break FileDerived {
                            record: quick.record,
                            thumbnails: quick.thumbnails,
                        };
                    }
                    tracing::debug!(
                        "Quick parse of {} is missing {:?}, falling back to full parse",
                        path.display(),
                        quick.missing
                    );
                    stage = ParseStage::FullAttempted;
                }
                ParseStage::FullAttempted => {
                    let full =
                        FullParser::new(&self.registry, &self.config, &self.matchers).parse(path)?;
                    break FileDerived {
                        record: full.record,
                        thumbnails: full.thumbnails,
                    };
                }
            }
        };

        let record = merge(&from_name, &record);
        let missing_required: Vec<String> = record
            .missing(&self.config.required)
            .into_iter()
            .map(String::from)
            .collect();

        if !missing_required.is_empty() {
            tracing::debug!("{} still missing {:?}", path.display(), missing_required);
        }

        Ok(Extraction {
            record,
            thumbnails,
            stage,
            missing_required,
        })
    }

    /// Extract using the final component of `path` as the file name
    ///
    /// # Errors
    /// [`ExtractError::UnsupportedFileType`] if the name does not carry a
    /// G-code extension, otherwise as [`Extractor::extract`].
    pub fn extract_path(&self, path: &Path) -> Result<Extraction> {
        if !is_gcode_path(path) {
            return Err(ExtractError::UnsupportedFileType {
                path: path.to_path_buf(),
            });
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.extract(path, &file_name)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::standard()
    }
}
