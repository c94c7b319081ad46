//! Comment block scanner
//!
//! Slicers put their metadata in two places: a comment header before the
//! first G-code command and a comment footer after the last one. The
//! scanner reads a bounded window at each end of the file and extracts the
//! run of comment lines anchored there, without touching the middle.
//!
//! Rules:
//! - Only complete lines count. A line cut by a window bound is dropped.
//! - Blank lines are skipped; they neither belong to nor end a run.
//! - The head run ends at the first non-comment line, scanning forward.
//! - The tail run ends at the first non-comment line, scanning backward.
//! - When the whole file fits in the head window there is no anchoring:
//!   every comment line in the file is collected, in order, and marked when
//!   G-code came before it.
//! - A line is reported at most once even when the windows overlap.

use std::ops::Range;

use gcodemeta_core::{Result, ScanConfig};

use crate::reader::{decode_line, GcodeFileReader};

/// Which end of the file a block was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Head,
    Tail,
}

/// One comment line and where it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    /// Absolute byte offset of the first byte of the line
    pub offset: u64,
    /// Line text without terminator
    pub text: String,
    /// G-code separates this line from the previous comment line
    pub after_code: bool,
}

/// Run of comment lines found in one window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    pub region: Region,
    /// Byte range of the window that was examined
    pub window: Range<u64>,
    /// Comment lines in file order
    pub lines: Vec<CommentLine>,
}

impl CommentBlock {
    fn empty(region: Region, window: Range<u64>) -> Self {
        Self {
            region,
            window,
            lines: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line texts in file order
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|line| line.text.as_str())
    }
}

/// Result of scanning one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedBlocks {
    pub head: CommentBlock,
    pub tail: CommentBlock,
    pub file_size: u64,
    /// The head window covered the entire file
    pub whole_file: bool,
}

struct RawLine<'a> {
    offset: u64,
    bytes: &'a [u8],
    terminated: bool,
}

fn raw_lines(buf: &[u8], base: u64) -> Vec<RawLine<'_>> {
    let mut offset = base;
    buf.split_inclusive(|b| *b == b'\n')
        .map(|bytes| {
            let line = RawLine {
                offset,
                bytes,
                terminated: bytes.last() == Some(&b'\n'),
            };
            offset += bytes.len() as u64;
            line
        })
        .collect()
}

/// Extracts the head and tail comment blocks of a file
pub struct CommentBlockScanner<'a> {
    config: &'a ScanConfig,
}

impl<'a> CommentBlockScanner<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self { config }
    }

    /// Scan both ends of the file behind `reader`
    ///
    /// # Errors
    /// Propagates window read failures from the reader.
    pub fn scan(&self, reader: &mut GcodeFileReader) -> Result<ScannedBlocks> {
        let size = reader.file_size();
        let head_len = (self.config.head_window as u64).min(size);
        let whole_file = head_len == size;

        let head_buf = reader.read_window(0, head_len as usize)?;
        let head = CommentBlock {
            region: Region::Head,
            window: 0..head_len,
            lines: self.head_run(&head_buf, whole_file),
        };

        if whole_file {
            tracing::trace!(
                "{} fits in the head window, {} comment lines",
                reader.path().display(),
                head.len()
            );
            return Ok(ScannedBlocks {
                head,
                tail: CommentBlock::empty(Region::Tail, size..size),
                file_size: size,
                whole_file,
            });
        }

        let tail_start = size - (self.config.tail_window as u64).min(size);
        // one extra byte tells whether the first line in the window is complete
        let read_from = tail_start.saturating_sub(1);
        let tail_buf = reader.read_window(read_from, (size - read_from) as usize)?;
        let mut lines = self.tail_run(&tail_buf, read_from, tail_start > 0);

        if let Some(last_head) = head.lines.last() {
            lines.retain(|line| line.offset > last_head.offset);
        }

        tracing::trace!(
            "{}: {} head and {} tail comment lines",
            reader.path().display(),
            head.len(),
            lines.len()
        );

        Ok(ScannedBlocks {
            head,
            tail: CommentBlock {
                region: Region::Tail,
                window: tail_start..size,
                lines,
            },
            file_size: size,
            whole_file,
        })
    }

    fn head_run(&self, buf: &[u8], whole_file: bool) -> Vec<CommentLine> {
        let mut lines = Vec::new();
        let mut after_code = false;
        for raw in raw_lines(buf, 0) {
            if !raw.terminated && !whole_file {
                break;
            }
            let text = decode_line(raw.bytes);
            if text.trim().is_empty() {
                continue;
            }
            if self.config.is_comment(&text) {
                lines.push(CommentLine {
                    offset: raw.offset,
                    text,
                    after_code,
                });
                after_code = false;
            } else if whole_file {
                after_code = true;
            } else {
                break;
            }
        }
        lines
    }

    fn tail_run(&self, buf: &[u8], base: u64, starts_mid_line: bool) -> Vec<CommentLine> {
        let raws = raw_lines(buf, base);
        // the first segment ends at the first newline in the buffer, so it
        // is either a cut-off line or the terminator of the previous one
        let skip = usize::from(starts_mid_line);

        let mut lines = Vec::new();
        for raw in raws.iter().skip(skip).rev() {
            let text = decode_line(raw.bytes);
            if text.trim().is_empty() {
                continue;
            }
            if !self.config.is_comment(&text) {
                break;
            }
            lines.push(CommentLine {
                offset: raw.offset,
                text,
                after_code: false,
            });
        }
        lines.reverse();
        lines
    }
}
