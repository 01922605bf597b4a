//! The navigator: lazy, random-access reads over one static delimited file.
//!
//! A [`Navigator`] resolves three kinds of request against a shared row index:
//!
//! - **scalar**: [`Navigator::at`] returns row *n*;
//! - **range**: [`Navigator::range`] and [`Navigator::iter`] return lazy [`Rows`];
//! - **group**: [`Navigator::by_group`], [`Navigator::get`] and [`Navigator::items`] return lazy
//!   [`GroupRows`] once a field has been [registered](Navigator::register).
//!
//! Offsets are discovered on demand and never recomputed. Each thread reads through its own
//! cursor; the row index, header and groups live behind a single mutex.
//!
//! # Lock order
//! A thread locks its own cursor before the shared state, never the other way around.

use crate::config::NavConfig;
use crate::cursor::CursorManager;
use crate::error::{NavError, Result};
use crate::group::{self, GroupingIndex};
use crate::index::RowIndex;
use crate::io::{LineSource, RecordDecoder};
use crate::record::Record;
use crate::rows::{GroupRows, Lookup, Rows, Slice};
use crate::stats::{NavStats, StatsSnapshot};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
struct Shared {
    index: RowIndex,
    header: Option<Arc<[String]>>,
    groups: GroupingIndex,
    byte_len: Option<u64>,
}

/// Random-access reader over a static delimited file.
///
/// `Navigator` is `Send + Sync`; share it by reference (for example with
/// [`std::thread::scope`]) or wrap it in an [`Arc`].
///
/// # Panics
/// Methods panic if an internal mutex was poisoned by a panicking thread.
#[derive(Debug)]
pub struct Navigator {
    path: PathBuf,
    decoder: RecordDecoder,
    data_start: u64,
    state: Mutex<Shared>,
    cursors: CursorManager,
    stats: Arc<NavStats>,
}

impl Navigator {
    /// Open `path`, skip the prelude and read the header if configured.
    ///
    /// The file is assumed not to change while the navigator is open.
    ///
    /// # Errors
    /// Returns [`NavError::Io`] if the file cannot be opened or read,
    /// [`NavError::InvalidConfiguration`] for an invalid dialect, and a parse error if the header
    /// line cannot be decoded.
    pub fn open(path: impl AsRef<Path>, config: NavConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let decoder = RecordDecoder::new(&path, &config)?;
        let stats = Arc::new(NavStats::default());
        let mut src = LineSource::open(&path, Arc::clone(&stats))?;

        let skipped = src.skip_lines(config.skip_lines)?;
        if skipped < config.skip_lines {
            tracing::warn!(
                path = %path.display(),
                requested = config.skip_lines,
                skipped,
                "file ended inside the skipped prelude"
            );
        }
        let header: Option<Arc<[String]>> = if config.has_header {
            match src.read_line()? {
                Some((_, line)) => Some(Arc::from(decoder.parse_fields(&line)?)),
                None => None,
            }
        } else {
            None
        };
        let data_start = src.position();
        tracing::debug!(
            path = %path.display(),
            data_start,
            columns = header.as_ref().map_or(0, |h| h.len()),
            raw = config.raw_output,
            "navigator opened"
        );

        let cursors = CursorManager::with_initial(&path, Arc::clone(&stats), src);
        Ok(Self {
            path,
            decoder,
            data_start,
            state: Mutex::new(Shared {
                index: RowIndex::new(data_start),
                header,
                groups: GroupingIndex::default(),
                byte_len: None,
            }),
            cursors,
            stats,
        })
    }

    /// Close every cursor and drop the indexes. Later calls fail with [`NavError::Closed`].
    ///
    /// Closing twice is harmless.
    pub fn close(&self) {
        let cursors = self.cursors.close_all();
        let mut st = self.lock_state();
        st.index = RowIndex::new(self.data_start);
        st.groups.clear();
        drop(st);
        tracing::debug!(path = %self.path.display(), cursors, "navigator closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cursors.is_closed()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows.
    ///
    /// Without `force` this is `None` until some operation has reached end-of-file. With `force`
    /// the remaining rows are discovered (starting from the horizon) and the count is returned.
    ///
    /// # Errors
    /// Returns [`NavError::Closed`] on a closed navigator, or an I/O error while discovering.
    pub fn size(&self, force: bool) -> Result<Option<usize>> {
        self.check_open()?;
        if let Some(length) = self.lock_state().index.length() {
            return Ok(Some(length));
        }
        if !force {
            return Ok(None);
        }
        let cursor = self.cursors.acquire()?;
        let mut src = cursor.lock().unwrap();
        let mut st = self.lock_state();
        Ok(Some(st.index.discover_all(&mut src)?))
    }

    /// Size of the file in bytes.
    ///
    /// Known once end-of-file has been observed; with `force` it is read from file metadata.
    ///
    /// # Errors
    /// Returns [`NavError::Closed`] on a closed navigator, or an I/O error reading metadata.
    pub fn char_count(&self, force: bool) -> Result<Option<u64>> {
        self.check_open()?;
        {
            let st = self.lock_state();
            if st.byte_len.is_some() {
                return Ok(st.byte_len);
            }
            if st.index.is_complete() {
                return Ok(Some(st.index.resume_offset()));
            }
        }
        if !force {
            return Ok(None);
        }
        let cursor = self.cursors.acquire()?;
        let len = cursor.lock().unwrap().file_len()?;
        self.lock_state().byte_len = Some(len);
        Ok(Some(len))
    }

    /// Header columns, if the file has a header or one was set.
    #[must_use]
    pub fn header(&self) -> Option<Arc<[String]>> {
        self.lock_state().header.clone()
    }

    /// Use `columns` as the header for every record decoded from now on.
    ///
    /// Setting a header does not touch the row index: the header line, if any, was consumed at
    /// open time and data rows keep their positions.
    ///
    /// # Errors
    /// Returns [`NavError::Closed`] on a closed navigator.
    pub fn set_header<I, S>(&self, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_open()?;
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        self.lock_state().header = Some(Arc::from(columns));
        Ok(())
    }

    /// Group rows by the values of each field in `fields`.
    ///
    /// Performs one full pass over the data rows, which also fixes the row count. Fields
    /// registered by earlier calls are kept; fields named again are rebuilt.
    ///
    /// # Errors
    /// Returns [`NavError::InvalidConfiguration`] in raw mode, without a header, or for a field
    /// that is not a header column; [`NavError::RecordShapeMismatch`] for a row that does not
    /// match the header; [`NavError::Closed`] on a closed navigator.
    pub fn register<I, S>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_open()?;
        if self.decoder.raw_output() {
            return Err(NavError::InvalidConfiguration(
                "grouping needs decoded rows but raw_output is set".into(),
            ));
        }
        let mut requested: Vec<String> = Vec::new();
        for f in fields {
            let f = f.into();
            if !requested.contains(&f) {
                requested.push(f);
            }
        }

        let cursor = self.cursors.acquire()?;
        let mut src = cursor.lock().unwrap();
        let mut st = self.lock_state();
        let header = st.header.clone().ok_or_else(|| {
            NavError::InvalidConfiguration("grouping needs a header; none was read or set".into())
        })?;
        let outcome = group::scan(&mut src, &self.decoder, &header, &requested, self.data_start)?;
        self.stats.inc_grouping_scans();
        tracing::debug!(
            path = %self.path.display(),
            fields = ?requested,
            rows = outcome.index.horizon(),
            "grouping index built"
        );
        st.index = outcome.index;
        st.groups.merge(outcome.groups);
        Ok(())
    }

    /// Registered fields, in registration order.
    ///
    /// # Errors
    /// Returns [`NavError::Closed`] on a closed navigator.
    pub fn fields(&self) -> Result<Vec<String>> {
        self.check_open()?;
        Ok(self.lock_state().groups.fields().to_vec())
    }

    /// Distinct values of a registered field, in order of first appearance.
    ///
    /// # Errors
    /// Returns [`NavError::NotRegistered`] if `field` was never registered.
    pub fn keys(&self, field: &str) -> Result<Vec<String>> {
        self.check_open()?;
        Ok(self.lock_state().groups.require(field)?.keys().to_vec())
    }

    /// Rows whose `field` equals `key`.
    ///
    /// Returns the rows when the key exists, `default` when it does not and one was given, and
    /// fails with [`NavError::KeyNotFound`] otherwise.
    ///
    /// # Errors
    /// Returns [`NavError::NotRegistered`] or [`NavError::KeyNotFound`] as described above.
    pub fn get<D>(&self, field: &str, key: &str, default: Option<D>) -> Result<Lookup<'_, D>> {
        self.check_open()?;
        let st = self.lock_state();
        let groups = st.groups.require(field)?;
        match (groups.offsets(key), default) {
            (Some(offsets), _) => Ok(Lookup::Rows(GroupRows::new(self, Arc::clone(offsets)))),
            (None, Some(d)) => Ok(Lookup::Default(d)),
            (None, None) => Err(NavError::KeyNotFound {
                field: field.to_string(),
                key: key.to_string(),
            }),
        }
    }

    /// `(key, rows)` for every value of a registered field, in order of first appearance.
    ///
    /// # Errors
    /// Returns [`NavError::NotRegistered`] if `field` was never registered.
    pub fn items(&self, field: &str) -> Result<impl Iterator<Item = (String, GroupRows<'_>)>> {
        self.check_open()?;
        let pairs: Vec<(String, Arc<[u64]>)> = {
            let st = self.lock_state();
            let groups = st.groups.require(field)?;
            groups
                .keys()
                .iter()
                .filter_map(|k| groups.offsets(k).map(|o| (k.clone(), Arc::clone(o))))
                .collect()
        };
        Ok(pairs
            .into_iter()
            .map(move |(key, offsets)| (key, GroupRows::new(self, offsets))))
    }

    /// Rows whose `field` equals `key`; empty when the key never occurs.
    ///
    /// # Errors
    /// Returns [`NavError::NotRegistered`] if `field` was never registered.
    pub fn by_group(&self, field: &str, key: &str) -> Result<GroupRows<'_>> {
        self.check_open()?;
        let st = self.lock_state();
        let offsets = st
            .groups
            .require(field)?
            .offsets(key)
            .map_or_else(|| Arc::from(Vec::new()), Arc::clone);
        Ok(GroupRows::new(self, offsets))
    }

    /// Row `index` (0-based, counted after the prelude and header).
    ///
    /// # Errors
    /// Returns [`NavError::OutOfRange`] if the file has no such row, plus any I/O or decoding
    /// error.
    pub fn at(&self, index: usize) -> Result<Record> {
        match self.read_row(index)? {
            Some(rec) => Ok(rec),
            None => Err(NavError::OutOfRange {
                index,
                length: self.lock_state().index.length().unwrap_or(index),
            }),
        }
    }

    /// Row `index` deserialized into `T`.
    ///
    /// # Errors
    /// See [`Navigator::at`] and [`Record::deserialize`].
    pub fn at_as<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        self.at(index)?.deserialize()
    }

    /// Lazy sequence of the rows selected by `slice`.
    ///
    /// When the row count is known the bounds are clamped to it; otherwise rows are discovered
    /// as the sequence advances and end-of-file ends it.
    ///
    /// # Errors
    /// Returns [`NavError::Unsupported`] for negative components or a zero step, and
    /// [`NavError::Closed`] on a closed navigator.
    pub fn range(&self, slice: impl Into<Slice>) -> Result<Rows<'_>> {
        self.check_open()?;
        let (start, stop, step) = slice.into().resolve()?;
        let stop = match self.lock_state().index.length() {
            Some(length) => Some(stop.map_or(length, |s| s.min(length))),
            None => stop,
        };
        Ok(Rows::new(self, start, stop, step))
    }

    /// Every row from the first.
    #[must_use]
    pub fn iter(&self) -> Rows<'_> {
        Rows::new(self, 0, None, 1)
    }

    /// Every row for which `predicate` holds. Errors are passed through.
    pub fn filter<F>(&self, mut predicate: F) -> impl Iterator<Item = Result<Record>>
    where
        F: FnMut(&Record) -> bool,
    {
        self.iter().filter(move |r| match r {
            Ok(rec) => predicate(rec),
            Err(_) => true,
        })
    }

    /// Drop the calling thread's cursor; one is reopened on its next access.
    pub fn release_cursor(&self) -> bool {
        self.cursors.release_current()
    }

    /// Number of open per-thread cursors.
    #[must_use]
    pub fn cursor_count(&self) -> usize {
        self.cursors.len()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Read row `index`, discovering offsets as needed. `None` past end-of-file.
    pub(crate) fn read_row(&self, index: usize) -> Result<Option<Record>> {
        let cursor = self.cursors.acquire()?;
        let mut src = cursor.lock().unwrap();
        let (offset, header) = {
            let mut st = self.lock_state();
            if self.cursors.is_closed() {
                return Err(NavError::Closed);
            }
            if !st.index.ensure(&mut src, index)? {
                return Ok(None);
            }
            let Some(offset) = st.index.offset(index) else {
                return Ok(None);
            };
            (offset, st.header.clone())
        };
        self.decode_at(&mut src, offset, header.as_ref()).map(Some)
    }

    /// Read the row starting at a known `offset`.
    pub(crate) fn read_offset(&self, offset: u64) -> Result<Record> {
        let cursor = self.cursors.acquire()?;
        let mut src = cursor.lock().unwrap();
        let header = self.lock_state().header.clone();
        self.decode_at(&mut src, offset, header.as_ref())
    }

    fn decode_at(
        &self,
        src: &mut LineSource,
        offset: u64,
        header: Option<&Arc<[String]>>,
    ) -> Result<Record> {
        let line = src.read_line_at(offset)?.ok_or_else(|| {
            NavError::io(
                "read",
                &self.path,
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("no row at byte {offset}; was the file modified?"),
                ),
            )
        })?;
        let rec = self.decoder.decode(offset, line, header)?;
        self.stats.inc_records_decoded();
        Ok(rec)
    }

    fn check_open(&self) -> Result<()> {
        if self.cursors.is_closed() {
            Err(NavError::Closed)
        } else {
            Ok(())
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, Shared> {
        self.state.lock().unwrap()
    }
}

impl<'a> IntoIterator for &'a Navigator {
    type Item = Result<Record>;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
