//! Error type shared by every navigator operation.
//!
//! All failures are reported synchronously to the calling operation. Reaching end-of-file in the
//! middle of a range request is *not* an error: the lazy sequence simply ends.

use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NavError>;

/// Everything that can go wrong while navigating a delimited file.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// A row index at or beyond the (now known) number of data rows.
    #[error("row {index} is out of range for a file with {length} data rows")]
    OutOfRange { index: usize, length: usize },

    /// Group access on a field that has not been registered.
    #[error("field `{field}` has not been registered for grouping")]
    NotRegistered { field: String },

    /// A tagged lookup found no rows for the key and no default was supplied.
    #[error("key `{key}` does not exist in registered field `{field}`")]
    KeyNotFound { field: String, key: String },

    /// The navigator is configured in a way that cannot serve the request.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A decoded row does not have as many fields as the header has columns.
    #[error("row at byte {offset} has {found} fields but the header has {expected} columns")]
    RecordShapeMismatch {
        offset: u64,
        expected: usize,
        found: usize,
    },

    /// The navigator has been closed.
    #[error("navigator is closed")]
    Closed,

    /// Negative indices, negative steps and zero steps.
    #[error("unsupported request: {0}")]
    Unsupported(String),

    /// A line that is not valid UTF-8.
    #[error("line at byte {offset} of {} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf, offset: u64 },

    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse delimited record: {0}")]
    Csv(#[from] csv::Error),
}

impl NavError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Whether the error says something about the request rather than the file.
    ///
    /// Useful to tell "you asked for row 10 of 6" apart from a failing disk.
    #[must_use]
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. }
                | Self::NotRegistered { .. }
                | Self::KeyNotFound { .. }
                | Self::Unsupported(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let e = NavError::OutOfRange {
            index: 9,
            length: 6,
        };
        assert_eq!(
            e.to_string(),
            "row 9 is out of range for a file with 6 data rows"
        );

        let e = NavError::RecordShapeMismatch {
            offset: 42,
            expected: 3,
            found: 2,
        };
        assert!(e.to_string().contains("byte 42"));
    }

    #[test]
    fn request_errors_are_classified() {
        assert!(NavError::Unsupported("negative step".into()).is_request_error());
        assert!(
            NavError::NotRegistered {
                field: "product".into()
            }
            .is_request_error()
        );
        assert!(!NavError::Closed.is_request_error());
        assert!(
            !NavError::io(
                "open",
                "missing.csv",
                std::io::Error::from(std::io::ErrorKind::NotFound)
            )
            .is_request_error()
        );
    }
}
