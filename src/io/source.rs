//! Line source: one buffered read handle with its own file position.
//!
//! A [`LineSource`] knows nothing about rows or headers. It reads physical lines terminated by
//! `\n` (a preceding `\r` is stripped from returned text) and can be repositioned to any byte
//! offset. Repositioning within the current buffer keeps the buffer, so strided and sequential
//! access stay cheap.

use crate::error::{NavError, Result};
use crate::stats::NavStats;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Buffered, seekable line reader over a single file.
#[derive(Debug)]
pub struct LineSource {
    reader: BufReader<File>,
    path: PathBuf,
    pos: u64,
    buf: Vec<u8>,
    stats: Arc<NavStats>,
}

impl LineSource {
    /// Open `path` for reading, positioned at byte 0.
    ///
    /// # Errors
    /// Returns [`NavError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, stats: Arc<NavStats>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let f = File::open(&path).map_err(|e| NavError::io("open", &path, e))?;
        stats.inc_cursors_opened();
        Ok(Self {
            reader: BufReader::new(f),
            path,
            pos: 0,
            buf: Vec::with_capacity(256),
            stats,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn stats(&self) -> &NavStats {
        &self.stats
    }

    /// Byte offset of the next line to be read.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Move to `offset`. No-op when already there.
    ///
    /// # Errors
    /// Returns [`NavError::Io`] if the underlying seek fails.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset == self.pos {
            return Ok(());
        }
        let delta = offset as i128 - self.pos as i128;
        let delta = i64::try_from(delta).map_err(|_| {
            NavError::io(
                "seek",
                &self.path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "seek distance overflow"),
            )
        })?;
        self.reader
            .seek_relative(delta)
            .map_err(|e| NavError::io("seek", &self.path, e))?;
        self.pos = offset;
        self.stats.inc_seeks();
        Ok(())
    }

    /// Advance past one line without decoding it.
    ///
    /// Returns the number of bytes consumed, or `None` at end-of-file.
    ///
    /// # Errors
    /// Returns [`NavError::Io`] on read failure.
    pub fn skip_line(&mut self) -> Result<Option<u64>> {
        self.buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| NavError::io("read", &self.path, e))?;
        if n == 0 {
            return Ok(None);
        }
        self.pos += n as u64;
        self.stats.add_lines_scanned(1);
        Ok(Some(n as u64))
    }

    /// Skip up to `n` lines. Returns how many were actually skipped.
    ///
    /// # Errors
    /// Returns [`NavError::Io`] on read failure.
    pub fn skip_lines(&mut self, n: usize) -> Result<usize> {
        for skipped in 0..n {
            if self.skip_line()?.is_none() {
                return Ok(skipped);
            }
        }
        Ok(n)
    }

    /// Read the next line.
    ///
    /// Returns the line's starting offset and its text with the terminator removed, or `None` at
    /// end-of-file.
    ///
    /// # Errors
    /// Returns [`NavError::Io`] on read failure and [`NavError::Encoding`] if the line is not
    /// valid UTF-8.
    pub fn read_line(&mut self) -> Result<Option<(u64, String)>> {
        let start = self.pos;
        if self.skip_line()?.is_none() {
            return Ok(None);
        }
        let mut bytes = std::mem::take(&mut self.buf);
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        let text = String::from_utf8(bytes).map_err(|_| NavError::Encoding {
            path: self.path.clone(),
            offset: start,
        })?;
        Ok(Some((start, text)))
    }

    /// Seek to `offset` and read the line starting there.
    ///
    /// # Errors
    /// See [`LineSource::seek`] and [`LineSource::read_line`].
    pub fn read_line_at(&mut self, offset: u64) -> Result<Option<String>> {
        self.seek(offset)?;
        Ok(self.read_line()?.map(|(_, text)| text))
    }

    /// Size of the file in bytes, from its metadata.
    ///
    /// # Errors
    /// Returns [`NavError::Io`] if the metadata cannot be read.
    pub fn file_len(&self) -> Result<u64> {
        self.reader
            .get_ref()
            .metadata()
            .map(|m| m.len())
            .map_err(|e| NavError::io("stat", &self.path, e))
    }
}
