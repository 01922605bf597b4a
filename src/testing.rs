//! Testing utilities for code built on csvnav.
//!
//! - **Fixtures**: the small inventory dataset used throughout the docs
//! - **Mock files**: write rows or text to temporary files that clean up after themselves
//! - **Assertions**: compare navigator output with expected rows
//!
//! # Quick Start
//!
//! ```
//! use csvnav::testing::*;
//! use csvnav::{NavConfig, Navigator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let file = inventory_file()?;
//! let nav = Navigator::open(file.path(), NavConfig::default().with_header(true))?;
//! assert_row_values(&nav.at(0)?, &["5", "tire", "4"]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_io::*;
