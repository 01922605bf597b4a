//! Row index: byte offsets of discovered data rows and the horizon.
//!
//! The index grows append-only. Besides the offsets it remembers `resume`, the byte position just
//! past the last discovered row, so growing never re-reads a row whose offset is already known.
//! Once end-of-file has been observed the row count is fixed for good.

use crate::error::Result;
use crate::io::LineSource;

/// Offsets of discovered rows plus the (eventually known) row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIndex {
    offsets: Vec<u64>,
    resume: u64,
    length: Option<usize>,
}

impl RowIndex {
    /// Empty index whose first row starts at `data_start`.
    #[must_use]
    pub fn new(data_start: u64) -> Self {
        Self {
            offsets: Vec::new(),
            resume: data_start,
            length: None,
        }
    }

    /// Index built from a complete pass: `offsets` are every row and `end` is end-of-file.
    pub(crate) fn complete(offsets: Vec<u64>, end: u64) -> Self {
        let length = Some(offsets.len());
        Self {
            offsets,
            resume: end,
            length,
        }
    }

    /// Number of rows whose offset is known.
    #[must_use]
    pub fn horizon(&self) -> usize {
        self.offsets.len()
    }

    /// Total number of rows, once end-of-file has been observed.
    #[must_use]
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.length.is_some()
    }

    #[must_use]
    pub fn offset(&self, index: usize) -> Option<u64> {
        self.offsets.get(index).copied()
    }

    /// Byte offset where discovery resumes. At end-of-file once the index is complete.
    #[must_use]
    pub fn resume_offset(&self) -> u64 {
        self.resume
    }

    /// Make sure row `index` has a known offset, reading forward with `src` if needed.
    ///
    /// Returns `false` when end-of-file comes first; the length is then fixed.
    ///
    /// # Errors
    /// Propagates I/O errors from `src`.
    pub fn ensure(&mut self, src: &mut LineSource, index: usize) -> Result<bool> {
        if index < self.horizon() {
            return Ok(true);
        }
        if self.is_complete() {
            return Ok(false);
        }
        let from = self.horizon();
        let found = self.grow(src, Some(index))?;
        src.stats().add_rows_discovered((self.horizon() - from) as u64);
        tracing::trace!(from, to = self.horizon(), "row index grown");
        Ok(found)
    }

    /// Discover every remaining row and return the total row count.
    ///
    /// # Errors
    /// Propagates I/O errors from `src`.
    pub fn discover_all(&mut self, src: &mut LineSource) -> Result<usize> {
        if let Some(length) = self.length {
            return Ok(length);
        }
        let from = self.horizon();
        self.grow(src, None)?;
        src.stats().add_rows_discovered((self.horizon() - from) as u64);
        Ok(self.horizon())
    }

    fn grow(&mut self, src: &mut LineSource, target: Option<usize>) -> Result<bool> {
        src.seek(self.resume)?;
        while target.is_none_or(|t| self.horizon() <= t) {
            match src.skip_line()? {
                Some(n) => {
                    self.offsets.push(self.resume);
                    self.resume += n;
                }
                None => {
                    self.length = Some(self.horizon());
                    tracing::debug!(
                        rows = self.horizon(),
                        path = %src.path().display(),
                        "end of file reached; row count known"
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
