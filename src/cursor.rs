//! Cursor manager: one read handle per accessing thread.
//!
//! Every thread that touches a navigator gets its own [`LineSource`], created on first use and
//! retired when the thread exits, when it calls [`CursorManager::release_current`], or when the
//! navigator is closed. A seek done by one thread therefore never moves another thread's position.
//!
//! Each cursor sits behind its own mutex, but only the owning thread ever locks it, so that lock
//! is uncontended. The map itself is locked only to look a cursor up or to add/remove one.
//!
//! Retirement on thread exit goes through a thread-local list of guards. Each guard
//! holds a weak reference to a manager's map and removes its thread's entry when the thread-local
//! storage is torn down. A guard whose manager is already gone does nothing.

use crate::error::{NavError, Result};
use crate::io::LineSource;
use crate::stats::NavStats;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, ThreadId};

/// A cursor handed out by the manager.
pub type Cursor = Arc<Mutex<LineSource>>;

#[derive(Debug, Default)]
struct Cursors {
    by_thread: HashMap<ThreadId, Cursor>,
    closed: bool,
}

/// Removes one thread's cursor from one manager when dropped.
struct Retirement {
    cursors: Weak<Mutex<Cursors>>,
    thread: ThreadId,
}

impl Drop for Retirement {
    fn drop(&mut self) {
        let Some(cursors) = self.cursors.upgrade() else {
            return;
        };
        // never panic during thread teardown
        let Ok(mut cursors) = cursors.lock() else {
            return;
        };
        if cursors.by_thread.remove(&self.thread).is_some() {
            tracing::debug!(thread = ?self.thread, "cursor retired at thread exit");
        }
    }
}

thread_local! {
    static RETIREMENTS: RefCell<Vec<Retirement>> = const { RefCell::new(Vec::new()) };
}

/// Arrange for the calling thread's entry in `cursors` to be removed when the thread exits.
fn retire_at_thread_exit(cursors: &Arc<Mutex<Cursors>>) {
    let weak = Arc::downgrade(cursors);
    let thread = thread::current().id();
    // fails only while the thread-local storage is being destroyed
    let _ = RETIREMENTS.try_with(|list| {
        let mut list = list.borrow_mut();
        list.retain(|r| r.cursors.strong_count() > 0);
        if !list.iter().any(|r| r.cursors.ptr_eq(&weak)) {
            list.push(Retirement {
                cursors: weak,
                thread,
            });
        }
    });
}

/// Per-thread cursors over one file.
#[derive(Debug)]
pub struct CursorManager {
    path: PathBuf,
    stats: Arc<NavStats>,
    inner: Arc<Mutex<Cursors>>,
}

impl CursorManager {
    /// New manager whose calling thread already owns `initial`.
    #[must_use]
    pub fn with_initial(path: impl AsRef<Path>, stats: Arc<NavStats>, initial: LineSource) -> Self {
        let mut by_thread = HashMap::new();
        by_thread.insert(thread::current().id(), Arc::new(Mutex::new(initial)));
        let inner = Arc::new(Mutex::new(Cursors {
            by_thread,
            closed: false,
        }));
        retire_at_thread_exit(&inner);
        Self {
            path: path.as_ref().to_path_buf(),
            stats,
            inner,
        }
    }

    /// The calling thread's cursor, opening one if it has none yet.
    ///
    /// # Errors
    /// Returns [`NavError::Closed`] after [`CursorManager::close_all`], or an I/O error if a new
    /// handle cannot be opened.
    ///
    /// # Panics
    /// Panics if the cursor map mutex is poisoned.
    pub fn acquire(&self) -> Result<Cursor> {
        let id = thread::current().id();
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(NavError::Closed);
        }
        if let Some(cursor) = inner.by_thread.get(&id) {
            return Ok(Arc::clone(cursor));
        }
        let src = LineSource::open(&self.path, Arc::clone(&self.stats))?;
        let cursor = Arc::new(Mutex::new(src));
        inner.by_thread.insert(id, Arc::clone(&cursor));
        tracing::debug!(thread = ?id, cursors = inner.by_thread.len(), "cursor opened");
        drop(inner);
        retire_at_thread_exit(&self.inner);
        Ok(cursor)
    }

    /// Drop the calling thread's cursor. Returns whether it had one.
    ///
    /// # Panics
    /// Panics if the cursor map mutex is poisoned.
    pub fn release_current(&self) -> bool {
        let id = thread::current().id();
        let released = self.inner.lock().unwrap().by_thread.remove(&id).is_some();
        if released {
            tracing::debug!(thread = ?id, "cursor released");
        }
        released
    }

    /// Close every cursor and refuse new ones. Returns how many were open.
    ///
    /// # Panics
    /// Panics if the cursor map mutex is poisoned.
    pub fn close_all(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        let n = inner.by_thread.len();
        inner.by_thread.clear();
        n
    }

    /// # Panics
    /// Panics if the cursor map mutex is poisoned.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    /// Number of live cursors.
    ///
    /// # Panics
    /// Panics if the cursor map mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().by_thread.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
