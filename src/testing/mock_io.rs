//! Temporary input files for tests.
//!
//! Files are deleted when the returned [`TempFilePath`] is dropped, so keep it alive for as long
//! as a navigator reads from it.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A temporary file that is deleted when dropped.
#[derive(Debug)]
pub struct TempFilePath {
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create an empty temporary file with the given extension.
    ///
    /// # Errors
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> Result<Self> {
        let temp_file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()
            .context("create temporary file")?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `rows` (header included, if wanted) as CSV to a temporary `.csv` file.
///
/// Fields that need quoting are quoted. Rows may differ in length.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
///
/// # Example
/// ```
/// use csvnav::testing::mock_csv_file;
///
/// let file = mock_csv_file(&[["a", "b"], ["1", "x, y"]]).unwrap();
/// let text = std::fs::read_to_string(file.path()).unwrap();
/// assert_eq!(text, "a,b\n1,\"x, y\"\n");
/// ```
pub fn mock_csv_file<R, S>(rows: &[R]) -> Result<TempFilePath>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let file = TempFilePath::with_extension("csv")?;
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(file.path())
        .with_context(|| format!("open {}", file.path().display()))?;
    for (i, row) in rows.iter().enumerate() {
        wtr.write_record(row.as_ref().iter().map(AsRef::<str>::as_ref))
            .with_context(|| format!("write CSV row #{}", i + 1))?;
    }
    wtr.flush()?;
    Ok(file)
}

/// Serialize `data` with a header row to a temporary `.csv` file.
///
/// # Errors
/// Returns an error if the file cannot be created or a row fails to serialize.
pub fn mock_typed_csv_file<T: Serialize>(data: &[T]) -> Result<TempFilePath> {
    let file = TempFilePath::with_extension("csv")?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(file.path())
        .with_context(|| format!("open {}", file.path().display()))?;
    for (i, row) in data.iter().enumerate() {
        wtr.serialize(row)
            .with_context(|| format!("serialize CSV row #{}", i + 1))?;
    }
    wtr.flush()?;
    Ok(file)
}

/// Write `content` verbatim to a temporary `.txt` file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn mock_text_file(content: impl AsRef<[u8]>) -> Result<TempFilePath> {
    let mut file = TempFilePath::with_extension("txt")?;
    file.temp_file
        .write_all(content.as_ref())
        .with_context(|| format!("write {}", file.path.display()))?;
    file.temp_file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Item {
        sku: u32,
        name: String,
    }

    #[test]
    fn typed_file_has_header() {
        let file = mock_typed_csv_file(&[Item {
            sku: 7,
            name: "tire".into(),
        }])
        .unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "sku,name\n7,tire\n");
    }

    #[test]
    fn text_file_is_verbatim() {
        let file = mock_text_file("a\r\nb").unwrap();
        assert_eq!(std::fs::read(file.path()).unwrap(), b"a\r\nb");
        assert_eq!(file.path().extension().unwrap(), "txt");
    }
}
