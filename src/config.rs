//! Navigator configuration.
//!
//! [`NavConfig`] follows the plain-struct style: public fields, a sensible [`Default`], and a few
//! `with_*` helpers for fluent construction. Everything except the reformat hook can be loaded
//! from JSON with [`NavConfig::from_json`].
//!
//! ```
//! use csvnav::{Dialect, NavConfig};
//!
//! let config = NavConfig::default()
//!     .with_header(true)
//!     .with_skip_lines(2)
//!     .with_dialect(Dialect::excel_tab());
//! assert!(config.has_header);
//! ```

use crate::error::{NavError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Read-only view handed to a [`ReformatHook`].
#[derive(Debug, Clone, Copy)]
pub struct ReformatContext<'a> {
    /// File being navigated.
    pub path: &'a Path,
    /// Dialect the reformatted line will be parsed with.
    pub dialect: &'a Dialect,
    /// Header columns at the time the line is decoded, if any.
    pub header: Option<&'a [String]>,
}

/// User function that rewrites a raw line before it is parsed into fields.
///
/// Hooks must be pure: same context and line in, same line out. They are shared between
/// threads, hence `Send + Sync`.
pub type ReformatHook = Arc<dyn Fn(&ReformatContext<'_>, &str) -> String + Send + Sync>;

/// Delimited-text dialect used to split one line into fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    /// Field separator.
    pub delimiter: char,
    /// Quote character.
    pub quote: char,
    /// Escape character for quotes inside quoted fields. `None` disables escaping.
    pub escape: Option<char>,
    /// Two adjacent quotes inside a quoted field stand for one quote.
    pub double_quote: bool,
    /// Honor quoting at all.
    pub quoting: bool,
    /// Trim surrounding whitespace from every field.
    pub trim: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::excel()
    }
}

impl Dialect {
    /// Comma separated, `"` quoted, doubled quotes as escapes.
    #[must_use]
    pub fn excel() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            escape: None,
            double_quote: true,
            quoting: true,
            trim: false,
        }
    }

    /// Same as [`Dialect::excel`] with tab separators.
    #[must_use]
    pub fn excel_tab() -> Self {
        Self {
            delimiter: '\t',
            ..Self::excel()
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    #[must_use]
    pub fn with_escape(mut self, escape: Option<char>) -> Self {
        self.escape = escape;
        self
    }

    /// Check that every special character fits in a single ASCII byte.
    ///
    /// # Errors
    /// Returns [`NavError::InvalidConfiguration`] naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        ascii_byte("delimiter", self.delimiter)?;
        ascii_byte("quote", self.quote)?;
        if let Some(escape) = self.escape {
            ascii_byte("escape", escape)?;
        }
        if self.delimiter == self.quote {
            return Err(NavError::InvalidConfiguration(format!(
                "delimiter and quote are both {:?}",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Build a `csv` reader configuration for single-line parsing.
    ///
    /// Headers are never consumed by the reader and field counts are not enforced here; the
    /// navigator does its own header handling.
    ///
    /// # Errors
    /// See [`Dialect::validate`].
    pub fn reader_builder(&self) -> Result<csv::ReaderBuilder> {
        self.validate()?;
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(ascii_byte("delimiter", self.delimiter)?)
            .quote(ascii_byte("quote", self.quote)?)
            .double_quote(self.double_quote)
            .quoting(self.quoting)
            .trim(if self.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            });
        if let Some(escape) = self.escape {
            builder.escape(Some(ascii_byte("escape", escape)?));
        }
        Ok(builder)
    }
}

fn ascii_byte(name: &str, c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(NavError::InvalidConfiguration(format!(
            "{name} {c:?} is not a single-byte ASCII character"
        )))
    }
}

/// Options for [`Navigator::open`](crate::Navigator::open).
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// The first line after the skipped prelude holds the column names.
    pub has_header: bool,
    /// Number of prelude lines to skip before the header or the first data row.
    pub skip_lines: usize,
    /// Return undecoded line text instead of fields.
    pub raw_output: bool,
    /// How lines are split into fields.
    pub dialect: Dialect,
    /// Optional rewrite applied to each line before parsing (ignored in raw mode).
    #[serde(skip)]
    pub reformat: Option<ReformatHook>,
}

impl fmt::Debug for NavConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavConfig")
            .field("has_header", &self.has_header)
            .field("skip_lines", &self.skip_lines)
            .field("raw_output", &self.raw_output)
            .field("dialect", &self.dialect)
            .field("reformat", &self.reformat.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl NavConfig {
    /// Parse a configuration document such as
    /// `{"has_header": true, "dialect": {"delimiter": ";"}}`.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    /// Returns [`NavError::InvalidConfiguration`] if the document is malformed or the dialect
    /// does not validate.
    pub fn from_json(doc: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(doc)
            .map_err(|e| NavError::InvalidConfiguration(format!("config document: {e}")))?;
        config.dialect.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    #[must_use]
    pub fn with_skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    #[must_use]
    pub fn with_raw_output(mut self, raw_output: bool) -> Self {
        self.raw_output = raw_output;
        self
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Install a reformat hook.
    #[must_use]
    pub fn with_reformat<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ReformatContext<'_>, &str) -> String + Send + Sync + 'static,
    {
        self.reformat = Some(Arc::new(hook));
        self
    }
}
