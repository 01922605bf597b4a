//! # csvnav
//!
//! **Lazy, random-access navigation** over large delimited text files. A [`Navigator`] lets you
//! read row *n*, a slice of rows, or every row whose column equals a key, without loading the
//! file into memory and without re-scanning from the top on every request.
//!
//! ## Key Features
//!
//! - **Lazy row index** - byte offsets are discovered only as far as a request needs
//! - **Scalar, slice and group access** - `at(n)`, `range(a..b)`, `by_group(field, key)`
//! - **Grouping index** - one pass maps each value of a column to the offsets of its rows
//! - **Thread-safe** - every thread reads through its own cursor over a shared index
//! - **Pluggable decoding** - CSV dialects, a reformat hook, raw line output
//! - **Typed rows** - deserialize any row into your own `serde` types
//!
//! ## Quick Start
//!
//! ```no_run
//! use csvnav::{NavConfig, Navigator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let nav = Navigator::open("inventory.csv", NavConfig::default().with_header(true))?;
//!
//! // Row 0; only the first line after the header is read.
//! let first = nav.at(0)?;
//! assert_eq!(first.get("product"), Some("tire"));
//!
//! // Rows 2, 3 and 4.
//! for row in nav.range(2..5)? {
//!     println!("{:?}", row?);
//! }
//!
//! // Group by product, then fetch every tire row.
//! nav.register(["product"])?;
//! for row in nav.by_group("product", "tire")? {
//!     println!("{:?}", row?.get("quantity"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Horizon
//!
//! The number of rows whose offsets are already known. Requests below the horizon cost one seek
//! and one line read. Requests above it read forward from the last known row, extending the
//! horizon; rows are never scanned twice.
//!
//! ### Length
//!
//! Unknown until some operation reaches end-of-file. [`Navigator::size`] reports it, and can
//! force a scan with `force = true`. A range over an unknown length just ends at end-of-file.
//!
//! ### Grouping
//!
//! [`Navigator::register`] scans the whole file once and keeps, per field, the offsets of the rows
//! holding each value. Registration is additive across calls.
//!
//! ### Records
//!
//! Depending on configuration a row comes back as [`Record::Raw`] text, positional
//! [`Record::Fields`], or a header-keyed [`Record::Row`].
//!
//! ## Concurrency
//!
//! ```no_run
//! use csvnav::{NavConfig, Navigator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let nav = Navigator::open("inventory.csv", NavConfig::default())?;
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| nav.iter().count());
//!     }
//! });
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod group;
pub mod index;
pub mod io;
pub mod navigator;
pub mod record;
pub mod rows;
pub mod stats;
pub mod testing;

pub use config::{Dialect, NavConfig, ReformatContext, ReformatHook};
pub use error::{NavError, Result};
pub use group::{FieldGroups, GroupingIndex};
pub use index::RowIndex;
pub use navigator::Navigator;
pub use record::{Record, Row};
pub use rows::{GroupRows, Lookup, Rows, Slice};
pub use stats::{NavStats, StatsSnapshot};
