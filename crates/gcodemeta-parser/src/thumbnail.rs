//! Embedded preview images
//!
//! PrusaSlicer and compatible slicers embed previews as base64 text between
//! `; thumbnail begin WxH LEN` and `; thumbnail end`, one chunk per comment
//! line. `thumbnail_JPG` and `thumbnail_QOI` variants carry other formats.

use std::fmt;
use std::sync::OnceLock;

use base64::{engine::general_purpose, Engine as _};
use regex::Regex;
use serde::{Serialize, Serializer};

fn begin_regex() -> &'static Regex {
    static BEGIN: OnceLock<Regex> = OnceLock::new();
    BEGIN.get_or_init(|| {
        Regex::new(r"^;\s*thumbnail(?:_(?P<format>PNG|JPG|QOI))? begin\s+(?P<width>\d+)x(?P<height>\d+)\s+(?P<size>\d+)")
            .expect("invalid thumbnail begin pattern")
    })
}

fn end_regex() -> &'static Regex {
    static END: OnceLock<Regex> = OnceLock::new();
    END.get_or_init(|| {
        Regex::new(r"^;\s*thumbnail(?:_(?:PNG|JPG|QOI))? end").expect("invalid thumbnail end pattern")
    })
}

/// Image encoding of a thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailFormat {
    Png,
    Jpg,
    Qoi,
}

impl ThumbnailFormat {
    fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some("JPG") => Self::Jpg,
            Some("QOI") => Self::Qoi,
            _ => Self::Png,
        }
    }
}

impl fmt::Display for ThumbnailFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Jpg => write!(f, "JPG"),
            Self::Qoi => write!(f, "QOI"),
        }
    }
}

/// A decoded preview image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub format: ThumbnailFormat,
    /// Decoded image bytes, serialized back as base64
    #[serde(serialize_with = "as_base64")]
    pub data: Vec<u8>,
}

impl Thumbnail {
    /// Identifier such as `220x124_PNG`, unique within one file
    pub fn key(&self) -> String {
        format!("{}x{}_{}", self.width, self.height, self.format)
    }
}

fn as_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&general_purpose::STANDARD.encode(data))
}

fn is_base64_chunk(chunk: &str) -> bool {
    chunk
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

#[derive(Debug)]
struct Pending {
    width: u32,
    height: u32,
    format: ThumbnailFormat,
    declared_len: usize,
    encoded: String,
}

/// Line-fed state machine that assembles thumbnails
///
/// Feed every comment line through [`ThumbnailCollector::feed`]; it returns
/// `true` for lines that belong to a thumbnail block so callers can skip
/// further processing of image data.
#[derive(Debug, Default)]
pub struct ThumbnailCollector {
    pending: Option<Pending>,
    done: Vec<Thumbnail>,
}

impl ThumbnailCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one comment line, returns whether the line was consumed
    pub fn feed(&mut self, line: &str) -> bool {
        let line = line.trim_start();

        if let Some(caps) = begin_regex().captures(line) {
            if let Some(abandoned) = self.pending.take() {
                tracing::warn!(
                    "Thumbnail {}x{} has no end marker, discarding",
                    abandoned.width,
                    abandoned.height
                );
            }
            // digits only, so a parse failure means overflow
            let (Ok(width), Ok(height), Ok(declared_len)) = (
                caps["width"].parse::<u32>(),
                caps["height"].parse::<u32>(),
                caps["size"].parse::<usize>(),
            ) else {
                return true;
            };
            self.pending = Some(Pending {
                width,
                height,
                format: ThumbnailFormat::from_marker(caps.name("format").map(|m| m.as_str())),
                declared_len,
                encoded: String::new(),
            });
            return true;
        }

        if end_regex().is_match(line) {
            if let Some(pending) = self.pending.take() {
                self.finish(pending);
            }
            return true;
        }

        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        let chunk = line.trim_start_matches(';').trim();
        if !is_base64_chunk(chunk) {
            // ordinary comment text, the block was never closed
            tracing::warn!(
                "Thumbnail {}x{} interrupted by {:?}, discarding",
                pending.width,
                pending.height,
                line
            );
            self.pending = None;
            return false;
        }

        if pending.encoded.len() + chunk.len() > pending.declared_len {
            tracing::warn!(
                "Thumbnail {}x{} exceeds its declared {} bytes, discarding",
                pending.width,
                pending.height,
                pending.declared_len
            );
            self.pending = None;
            return true;
        }

        pending.encoded.push_str(chunk);
        true
    }

    fn finish(&mut self, pending: Pending) {
        if pending.encoded.len() != pending.declared_len {
            tracing::warn!(
                "Thumbnail {}x{} declares {} bytes but carries {}, discarding",
                pending.width,
                pending.height,
                pending.declared_len,
                pending.encoded.len()
            );
            return;
        }

        let data = match general_purpose::STANDARD.decode(pending.encoded.as_bytes()) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    "Thumbnail {}x{} is not valid base64: {}",
                    pending.width,
                    pending.height,
                    e
                );
                return;
            }
        };

        let thumbnail = Thumbnail {
            width: pending.width,
            height: pending.height,
            format: pending.format,
            data,
        };
        if self.done.iter().any(|t| t.key() == thumbnail.key()) {
            tracing::debug!("Duplicate thumbnail {} ignored", thumbnail.key());
            return;
        }
        self.done.push(thumbnail);
    }

    /// Drop a thumbnail that is still being assembled
    pub fn abandon(&mut self) {
        if let Some(abandoned) = self.pending.take() {
            tracing::debug!(
                "Thumbnail {}x{} ends without an end marker, discarding",
                abandoned.width,
                abandoned.height
            );
        }
    }

    /// True while inside an unterminated thumbnail block
    pub fn in_progress(&self) -> bool {
        self.pending.is_some()
    }

    /// Completed thumbnails in file order
    pub fn into_thumbnails(mut self) -> Vec<Thumbnail> {
        self.abandon();
        self.done
    }
}
