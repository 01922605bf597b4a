//! Lazy row sequences and slice requests.
//!
//! Sequences borrow the navigator and resolve one row per `next()`; nothing is buffered ahead.
//! All of them are fused: after yielding an error they yield nothing more.

use crate::error::{NavError, Result};
use crate::navigator::Navigator;
use crate::record::Record;
use std::iter::FusedIterator;
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};
use std::sync::Arc;

/// Python-style slice request: optional start, stop and step.
///
/// Any negative component, and a zero step, is rejected with [`NavError::Unsupported`] when the
/// slice is resolved.
///
/// ```
/// use csvnav::Slice;
///
/// let every_other = Slice::full().step(2);
/// let window: Slice = (10..20).into();
/// assert_eq!(window.start, Some(10));
/// assert_eq!(every_other.step, Some(2));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl Slice {
    #[must_use]
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// Every row.
    #[must_use]
    pub fn full() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    /// Validate and convert to `(start, stop, step)`.
    pub(crate) fn resolve(self) -> Result<(usize, Option<usize>, usize)> {
        let start = non_negative("start", self.start.unwrap_or(0))?;
        let stop = self.stop.map(|s| non_negative("stop", s)).transpose()?;
        let step = non_negative("step", self.step.unwrap_or(1))?;
        if step == 0 {
            return Err(NavError::Unsupported("slice step cannot be zero".into()));
        }
        Ok((start, stop, step))
    }
}

fn non_negative(what: &str, v: i64) -> Result<usize> {
    if v < 0 {
        return Err(NavError::Unsupported(format!(
            "negative slice {what} ({v}) is not supported"
        )));
    }
    Ok(usize::try_from(v).unwrap_or(usize::MAX))
}

fn to_i64(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

impl From<Range<usize>> for Slice {
    fn from(r: Range<usize>) -> Self {
        Self::new(Some(to_i64(r.start)), Some(to_i64(r.end)), None)
    }
}

impl From<RangeFrom<usize>> for Slice {
    fn from(r: RangeFrom<usize>) -> Self {
        Self::new(Some(to_i64(r.start)), None, None)
    }
}

impl From<RangeTo<usize>> for Slice {
    fn from(r: RangeTo<usize>) -> Self {
        Self::new(None, Some(to_i64(r.end)), None)
    }
}

impl From<RangeInclusive<usize>> for Slice {
    fn from(r: RangeInclusive<usize>) -> Self {
        let (start, end) = r.into_inner();
        Self::new(Some(to_i64(start)), Some(to_i64(end).saturating_add(1)), None)
    }
}

/// Rows selected by index: a range request or a full iteration.
///
/// Rows beyond the horizon are discovered as the sequence advances. Reaching end-of-file ends
/// the sequence early and fixes the navigator's row count.
#[derive(Debug)]
pub struct Rows<'a> {
    nav: &'a Navigator,
    next: usize,
    stop: Option<usize>,
    step: usize,
    done: bool,
}

impl<'a> Rows<'a> {
    pub(crate) fn new(nav: &'a Navigator, start: usize, stop: Option<usize>, step: usize) -> Self {
        Self {
            nav,
            next: start,
            stop,
            step,
            done: false,
        }
    }
}

impl Iterator for Rows<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.stop.is_some_and(|stop| self.next >= stop) {
            self.done = true;
            return None;
        }
        match self.nav.read_row(self.next) {
            Ok(Some(rec)) => {
                match self.next.checked_add(self.step) {
                    Some(n) => self.next = n,
                    None => self.done = true,
                }
                Some(Ok(rec))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        match self.stop {
            Some(stop) => (0, Some(stop.saturating_sub(self.next).div_ceil(self.step))),
            None => (0, None),
        }
    }
}

impl FusedIterator for Rows<'_> {}

/// Rows of one group, in file order.
#[derive(Debug)]
pub struct GroupRows<'a> {
    nav: &'a Navigator,
    offsets: Arc<[u64]>,
    pos: usize,
    done: bool,
}

impl<'a> GroupRows<'a> {
    pub(crate) fn new(nav: &'a Navigator, offsets: Arc<[u64]>) -> Self {
        Self {
            nav,
            offsets,
            pos: 0,
            done: false,
        }
    }

    /// Number of rows in the group, regardless of how many were consumed.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.offsets.len()
    }

    /// Byte offsets of the group's rows.
    #[must_use]
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }
}

impl Iterator for GroupRows<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(&offset) = self.offsets.get(self.pos) else {
            self.done = true;
            return None;
        };
        self.pos += 1;
        match self.nav.read_offset(offset) {
            Ok(rec) => Some(Ok(rec)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.offsets.len() - self.pos))
        }
    }
}

impl FusedIterator for GroupRows<'_> {}

/// Outcome of [`Navigator::get`].
#[derive(Debug)]
pub enum Lookup<'a, D> {
    /// The key exists; these are its rows.
    Rows(GroupRows<'a>),
    /// The key does not exist and a default was supplied.
    Default(D),
}

impl<'a, D> Lookup<'a, D> {
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default(_))
    }

    #[must_use]
    pub fn into_rows(self) -> Option<GroupRows<'a>> {
        match self {
            Self::Rows(rows) => Some(rows),
            Self::Default(_) => None,
        }
    }

    #[must_use]
    pub fn into_default(self) -> Option<D> {
        match self {
            Self::Rows(_) => None,
            Self::Default(d) => Some(d),
        }
    }
}
