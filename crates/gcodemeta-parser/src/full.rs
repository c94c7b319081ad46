//! Full parser: every line of the file, start to end

use std::path::Path;

use gcodemeta_core::{AttributeRegistry, MetadataRecord, Result, ScanConfig};

use crate::builder::RecordBuilder;
use crate::dialect::MatcherRegistry;
use crate::reader::{FileReadStats, GcodeFileReader};
use crate::thumbnail::Thumbnail;

/// Files above this size get a warning before a full pass (500 MB)
const LARGE_FILE_BYTES: u64 = 500 * 1024 * 1024;

/// Outcome of a full parse
#[derive(Debug, Clone, PartialEq)]
pub struct FullParse {
    pub record: MetadataRecord,
    pub thumbnails: Vec<Thumbnail>,
    pub stats: FileReadStats,
}

/// Streams a whole file through the dialect matchers
pub struct FullParser<'a> {
    registry: &'a AttributeRegistry,
    config: &'a ScanConfig,
    matchers: &'a MatcherRegistry,
}

impl<'a> FullParser<'a> {
    pub fn new(
        registry: &'a AttributeRegistry,
        config: &'a ScanConfig,
        matchers: &'a MatcherRegistry,
    ) -> Self {
        Self {
            registry,
            config,
            matchers,
        }
    }

    /// Read `path` line by line; the first value for an attribute wins
    ///
    /// # Errors
    /// Returns [`gcodemeta_core::ExtractError::Unreadable`] on any I/O fault.
    pub fn parse(&self, path: &Path) -> Result<FullParse> {
        let reader = GcodeFileReader::open(path)?;
        if reader.file_size() > LARGE_FILE_BYTES {
            tracing::warn!(
                "Reading all {}MB of {} for metadata",
                reader.file_size() / (1024 * 1024),
                path.display()
            );
        }
        let mut builder = RecordBuilder::new(self.registry, self.config, self.matchers);
        let stats = reader.read_lines(|line| builder.offer(line))?;

        tracing::debug!(
            "Full parse of {}: {} lines, {} values in {}ms",
            path.display(),
            stats.lines_read,
            builder.captured(),
            stats.read_time_ms
        );

        let (record, thumbnails) = builder.finish();
        Ok(FullParse {
            record,
            thumbnails,
            stats,
        })
    }
}
