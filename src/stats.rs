//! Navigation statistics.
//!
//! Every navigator keeps a [`NavStats`] block of atomic counters that cursors and scans bump as
//! they work. Take a [`StatsSnapshot`] at any time, print it, or save it as JSON.
//!
//! ```no_run
//! use csvnav::{NavConfig, Navigator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let nav = Navigator::open("inventory.csv", NavConfig::default().with_header(true))?;
//! let _ = nav.at(3)?;
//! let stats = nav.stats();
//! println!("{}", stats.to_json());
//! stats.save_to_file("nav_stats.json")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a navigator and shared with its cursors.
#[derive(Debug, Default)]
pub struct NavStats {
    lines_scanned: AtomicU64,
    rows_discovered: AtomicU64,
    records_decoded: AtomicU64,
    seeks: AtomicU64,
    cursors_opened: AtomicU64,
    grouping_scans: AtomicU64,
}

impl NavStats {
    pub(crate) fn add_lines_scanned(&self, n: u64) {
        self.lines_scanned.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn add_rows_discovered(&self, n: u64) {
        self.rows_discovered.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn inc_records_decoded(&self) {
        self.records_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_seeks(&self) {
        self.seeks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_cursors_opened(&self) {
        self.cursors_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_grouping_scans(&self) {
        self.grouping_scans.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_scanned: self.lines_scanned.load(Ordering::Relaxed),
            rows_discovered: self.rows_discovered.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            seeks: self.seeks.load(Ordering::Relaxed),
            cursors_opened: self.cursors_opened.load(Ordering::Relaxed),
            grouping_scans: self.grouping_scans.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`NavStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Physical lines read from disk, including prelude and header lines.
    pub lines_scanned: u64,
    /// Offsets appended to the row index by incremental discovery.
    pub rows_discovered: u64,
    /// Lines turned into records and handed to callers.
    pub records_decoded: u64,
    /// Cursor repositionings that actually moved the file position.
    pub seeks: u64,
    /// Read handles opened over the navigator's lifetime.
    pub cursors_opened: u64,
    /// Full passes performed by `register`.
    pub grouping_scans: u64,
}

impl StatsSnapshot {
    /// Counters as a JSON object with a short description per entry.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let counters = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let described: Map<String, Value> = counters
            .into_iter()
            .map(|(name, value)| {
                let entry = json!({ "value": value, "description": describe(&name) });
                (name, entry)
            })
            .collect();
        Value::Object(described)
    }

    /// Print the counters to stdout.
    pub fn print(&self) {
        println!("=== Navigator Statistics ===");
        println!("  lines_scanned:   {}", self.lines_scanned);
        println!("  rows_discovered: {}", self.rows_discovered);
        println!("  records_decoded: {}", self.records_decoded);
        println!("  seeks:           {}", self.seeks);
        println!("  cursors_opened:  {}", self.cursors_opened);
        println!("  grouping_scans:  {}", self.grouping_scans);
    }

    /// Write the JSON form to `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let body = serde_json::to_string_pretty(&self.to_json())?;
        file.write_all(body.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

fn describe(counter: &str) -> &'static str {
    match counter {
        "lines_scanned" => "Physical lines read from disk",
        "rows_discovered" => "Row offsets appended by incremental discovery",
        "records_decoded" => "Records decoded and returned",
        "seeks" => "Cursor repositionings",
        "cursors_opened" => "Per-thread read handles opened",
        "grouping_scans" => "Full grouping passes",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let stats = NavStats::default();
        stats.add_lines_scanned(7);
        stats.add_rows_discovered(6);
        stats.inc_seeks();
        stats.inc_seeks();
        let snap = stats.snapshot();
        assert_eq!(snap.lines_scanned, 7);
        assert_eq!(snap.rows_discovered, 6);
        assert_eq!(snap.seeks, 2);
        let doc = snap.to_json();
        assert_eq!(doc["seeks"]["value"], json!(2));
        assert_eq!(doc["seeks"]["description"], json!("Cursor repositionings"));
        // one entry per counter field
        assert_eq!(doc.as_object().map(Map::len), Some(6));
    }

    #[test]
    fn save_to_file_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let stats = NavStats::default();
        stats.inc_cursors_opened();
        stats.snapshot().save_to_file(&path).unwrap();
        let body: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(body["cursors_opened"]["value"], json!(1));
    }
}
