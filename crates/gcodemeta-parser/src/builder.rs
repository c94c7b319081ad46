//! Feeds comment lines through the dialect matchers into a record

use gcodemeta_core::{AttributeRegistry, Assignment, MetadataRecord, ScanConfig};

use crate::dialect::{Capture, MatcherRegistry};
use crate::thumbnail::{Thumbnail, ThumbnailCollector};

/// Accumulates one file-derived record, first value wins
pub(crate) struct RecordBuilder<'a> {
    config: &'a ScanConfig,
    matchers: &'a MatcherRegistry,
    record: MetadataRecord,
    thumbnails: Option<ThumbnailCollector>,
    captured: usize,
}

impl<'a> RecordBuilder<'a> {
    pub(crate) fn new(
        registry: &AttributeRegistry,
        config: &'a ScanConfig,
        matchers: &'a MatcherRegistry,
    ) -> Self {
        Self {
            config,
            matchers,
            record: MetadataRecord::new(registry),
            thumbnails: config.thumbnails.then(ThumbnailCollector::new),
            captured: 0,
        }
    }

    /// Offer one line; only comment lines reach the matchers
    ///
    /// Blank lines are skipped. Any other non-comment line ends the
    /// current comment block.
    pub(crate) fn offer(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if !self.config.is_comment(line) {
            self.end_block();
            return;
        }

        if let Some(collector) = self.thumbnails.as_mut() {
            if collector.feed(line) {
                return;
            }
        }

        for found in self.matchers.match_line(line) {
            for Capture {
                attribute,
                value,
                raw,
            } in found.captures
            {
                match self.record.set_if_absent(attribute, value) {
                    Assignment::Set => {
                        self.captured += 1;
                        tracing::trace!("{} captured {} = {:?}", found.matcher, attribute, raw);
                    }
                    Assignment::AlreadySet => {}
                    Assignment::UnknownAttribute => {
                        tracing::debug!(
                            "Matcher {} produced {} which is not in the registry",
                            found.matcher,
                            attribute
                        );
                    }
                    Assignment::KindMismatch => {
                        tracing::warn!(
                            "Matcher {} produced a value of the wrong kind for {} from {:?}",
                            found.matcher,
                            attribute,
                            raw
                        );
                    }
                }
            }
        }
    }

    /// Close a discontiguous block so a cut-off thumbnail cannot swallow the next one
    pub(crate) fn end_block(&mut self) {
        if let Some(collector) = self.thumbnails.as_mut() {
            collector.abandon();
        }
    }

    pub(crate) fn captured(&self) -> usize {
        self.captured
    }

    pub(crate) fn finish(self) -> (MetadataRecord, Vec<Thumbnail>) {
        let thumbnails = self
            .thumbnails
            .map(ThumbnailCollector::into_thumbnails)
            .unwrap_or_default();
        (self.record, thumbnails)
    }
}
