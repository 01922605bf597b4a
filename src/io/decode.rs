//! Record decoding: raw line → reformat hook → fields → header mapping.
//!
//! Field splitting is delegated to the `csv` crate, configured from the navigator's
//! [`Dialect`]. Each call parses exactly one physical line.

use crate::config::{Dialect, NavConfig, ReformatContext, ReformatHook};
use crate::error::{NavError, Result};
use crate::record::{Record, Row};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Turns raw lines into [`Record`]s according to a navigator's configuration.
pub struct RecordDecoder {
    path: PathBuf,
    dialect: Dialect,
    builder: csv::ReaderBuilder,
    raw_output: bool,
    reformat: Option<ReformatHook>,
}

impl std::fmt::Debug for RecordDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDecoder")
            .field("path", &self.path)
            .field("dialect", &self.dialect)
            .field("raw_output", &self.raw_output)
            .field("reformat", &self.reformat.is_some())
            .finish_non_exhaustive()
    }
}

impl RecordDecoder {
    /// # Errors
    /// Returns [`NavError::InvalidConfiguration`] if the dialect does not validate.
    pub fn new(path: impl AsRef<Path>, config: &NavConfig) -> Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            dialect: config.dialect.clone(),
            builder: config.dialect.reader_builder()?,
            raw_output: config.raw_output,
            reformat: config.reformat.clone(),
        })
    }

    #[must_use]
    pub fn raw_output(&self) -> bool {
        self.raw_output
    }

    /// Split one line into field values. An empty line has no fields.
    ///
    /// # Errors
    /// Returns [`NavError::Csv`] if the parser rejects the line.
    pub fn parse_fields(&self, line: &str) -> Result<Vec<String>> {
        let mut rdr = self.builder.from_reader(line.as_bytes());
        let mut rec = csv::StringRecord::new();
        if rdr.read_record(&mut rec)? {
            Ok(rec.iter().map(str::to_owned).collect())
        } else {
            Ok(Vec::new())
        }
    }

    /// Apply the reformat hook (if any) and split the result into fields.
    ///
    /// # Errors
    /// See [`RecordDecoder::parse_fields`].
    pub fn decode_fields(&self, line: &str, header: Option<&[String]>) -> Result<Vec<String>> {
        match &self.reformat {
            Some(hook) => {
                let ctx = ReformatContext {
                    path: &self.path,
                    dialect: &self.dialect,
                    header,
                };
                self.parse_fields(&hook(&ctx, line))
            }
            None => self.parse_fields(line),
        }
    }

    /// Decode the line that starts at `offset`.
    ///
    /// # Errors
    /// Returns [`NavError::RecordShapeMismatch`] when a header is present and the field count
    /// differs from it, or a parse error from [`RecordDecoder::parse_fields`].
    pub fn decode(
        &self,
        offset: u64,
        line: String,
        header: Option<&Arc<[String]>>,
    ) -> Result<Record> {
        if self.raw_output {
            return Ok(Record::Raw(line));
        }
        let values = self.decode_fields(&line, header.map(|h| &h[..]))?;
        match header {
            Some(header) => {
                if values.len() != header.len() {
                    return Err(NavError::RecordShapeMismatch {
                        offset,
                        expected: header.len(),
                        found: values.len(),
                    });
                }
                Ok(Record::Row(Row::new(Arc::clone(header), values)))
            }
            None => Ok(Record::Fields(values)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Arc<[String]> {
        vec!["a".to_string(), "b".to_string()].into()
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let d = RecordDecoder::new("mem.csv", &NavConfig::default()).unwrap();
        assert_eq!(
            d.parse_fields(r#"1,"x, y","say ""hi""""#).unwrap(),
            vec!["1", "x, y", r#"say "hi""#]
        );
        assert!(d.parse_fields("").unwrap().is_empty());
    }

    #[test]
    fn header_maps_and_checks_shape() {
        let d = RecordDecoder::new("mem.csv", &NavConfig::default()).unwrap();
        let h = header();
        let rec = d.decode(0, "1,2".into(), Some(&h)).unwrap();
        assert_eq!(rec.get("b"), Some("2"));
        assert!(matches!(
            d.decode(17, "1,2,3".into(), Some(&h)),
            Err(NavError::RecordShapeMismatch {
                offset: 17,
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn raw_mode_skips_hook_and_parsing() {
        let config = NavConfig::default()
            .with_raw_output(true)
            .with_reformat(|_, line| line.to_uppercase());
        let d = RecordDecoder::new("mem.csv", &config).unwrap();
        let rec = d.decode(0, "x;y".into(), Some(&header())).unwrap();
        assert_eq!(rec, Record::Raw("x;y".into()));
    }

    #[test]
    fn hook_sees_context_and_rewrites_line() {
        let config = NavConfig::default()
            .with_dialect(Dialect::excel().with_delimiter('|'))
            .with_reformat(|ctx, line| line.replace(';', &ctx.dialect.delimiter.to_string()));
        let d = RecordDecoder::new("mem.csv", &config).unwrap();
        let rec = d.decode(0, "1;2".into(), None).unwrap();
        assert_eq!(rec, Record::Fields(vec!["1".into(), "2".into()]));
    }
}
