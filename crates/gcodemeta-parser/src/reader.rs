//! G-code file access
//!
//! Two read patterns cover the whole pipeline: bounded windows at fixed
//! offsets for the quick parser and a buffered line stream for the full
//! parser. Neither assumes valid UTF-8; invalid sequences are replaced.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Instant;

use gcodemeta_core::{ExtractError, Result};

/// Buffer size for streaming large files (256 KB)
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Statistics from a full streaming pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReadStats {
    /// Total bytes read
    pub bytes_read: u64,
    /// Total lines read
    pub lines_read: u64,
    /// File size in bytes when the file was opened
    pub file_size: u64,
    /// Time taken to read (milliseconds)
    pub read_time_ms: u64,
}

impl FileReadStats {
    /// Get progress percentage
    pub fn progress_percent(&self) -> f64 {
        if self.file_size == 0 {
            0.0
        } else {
            (self.bytes_read as f64 / self.file_size as f64) * 100.0
        }
    }
}

/// Open G-code file with window and streaming access
#[derive(Debug)]
pub struct GcodeFileReader {
    path: PathBuf,
    file: File,
    file_size: u64,
}

impl GcodeFileReader {
    /// Open a file for reading
    ///
    /// # Errors
    /// Returns [`ExtractError::Unreadable`] if the file does not exist, is
    /// not a regular file or cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| ExtractError::unreadable(&path, e))?;
        let metadata = file
            .metadata()
            .map_err(|e| ExtractError::unreadable(&path, e))?;

        if !metadata.is_file() {
            return Err(ExtractError::unreadable(
                &path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        Ok(Self {
            path,
            file,
            file_size: metadata.len(),
        })
    }

    /// Get file size in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read exactly `len` bytes starting at `offset`
    ///
    /// # Errors
    /// Returns [`ExtractError::Truncated`] if the file ends before the
    /// window does, typically because it shrank after being opened.
    pub fn read_window(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let truncated = |source: io::Error| ExtractError::Truncated {
            path: self.path.clone(),
            offset,
            expected: len,
            source,
        };

        self.file.seek(SeekFrom::Start(offset)).map_err(truncated)?;
        let mut buf = vec![0u8; len];
        self.file.read_exact(&mut buf).map_err(truncated)?;
        Ok(buf)
    }

    /// Stream the file from the start, one decoded line at a time
    ///
    /// Lines are passed without their `\n` or `\r\n` terminator.
    ///
    /// # Errors
    /// Returns [`ExtractError::Unreadable`] on any I/O fault mid-stream.
    pub fn read_lines<F>(mut self, mut callback: F) -> Result<FileReadStats>
    where
        F: FnMut(&str),
    {
        let start_time = Instant::now();
        let path = self.path;
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| ExtractError::unreadable(&path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, self.file);

        let mut lines_read = 0u64;
        let mut bytes_read = 0u64;
        let mut buf = Vec::with_capacity(256);

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| ExtractError::unreadable(&path, e))?;
            if n == 0 {
                break;
            }
            bytes_read += n as u64;
            lines_read += 1;
            callback(&decode_line(&buf));
        }

        Ok(FileReadStats {
            bytes_read,
            lines_read,
            file_size: self.file_size,
            read_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

/// Decode one raw line, dropping its terminator
pub(crate) fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
