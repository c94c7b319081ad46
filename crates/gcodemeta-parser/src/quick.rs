//! Quick parser: matchers over the head and tail comment blocks only

use std::path::Path;

use gcodemeta_core::{AttributeRegistry, MetadataRecord, Result, ScanConfig};

use crate::builder::RecordBuilder;
use crate::dialect::MatcherRegistry;
use crate::reader::GcodeFileReader;
use crate::scanner::{CommentBlockScanner, ScannedBlocks};
use crate::thumbnail::Thumbnail;

/// Outcome of a quick parse
#[derive(Debug, Clone, PartialEq)]
pub struct QuickParse {
    pub record: MetadataRecord,
    pub thumbnails: Vec<Thumbnail>,
    /// Required attributes the comment blocks did not provide
    pub missing: Vec<String>,
    /// The head window covered the whole file
    pub whole_file: bool,
}

impl QuickParse {
    /// Every required attribute was found
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Parses only the comment blocks at either end of a file
pub struct QuickParser<'a> {
    registry: &'a AttributeRegistry,
    config: &'a ScanConfig,
    matchers: &'a MatcherRegistry,
}

impl<'a> QuickParser<'a> {
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

    /// Scan `path` and match its head and tail comment blocks
    ///
    /// # Errors
    /// Fails only on I/O: [`gcodemeta_core::ExtractError::Unreadable`] or
    /// [`gcodemeta_core::ExtractError::Truncated`].
    pub fn parse(&self, path: &Path) -> Result<QuickParse> {
        let mut reader = GcodeFileReader::open(path)?;
        let blocks = CommentBlockScanner::new(self.config).scan(&mut reader)?;
        Ok(self.parse_blocks(&blocks))
    }

    /// Match already scanned blocks, head first
    pub fn parse_blocks(&self, blocks: &ScannedBlocks) -> QuickParse {
        let mut builder = RecordBuilder::new(self.registry, self.config, self.matchers);
        for block in [&blocks.head, &blocks.tail] {
            for line in &block.lines {
                if line.after_code {
                    builder.end_block();
                }
                builder.offer(&line.text);
            }
            builder.end_block();
        }

        let captured = builder.captured();
        let (record, thumbnails) = builder.finish();
        let missing: Vec<String> = record
            .missing(&self.config.required)
            .into_iter()
            .map(String::from)
            .collect();

        tracing::debug!(
            "Quick parse: {} head + {} tail comment lines, {} values, missing {:?}",
            blocks.head.len(),
            blocks.tail.len(),
            captured,
            missing
        );

        QuickParse {
            record,
            thumbnails,
            missing,
            whole_file: blocks.whole_file,
        }
    }
}
