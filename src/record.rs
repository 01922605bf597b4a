//! Decoded rows.
//!
//! What a navigator hands back depends on its configuration:
//!
//! | configuration            | record                 |
//! |--------------------------|------------------------|
//! | `raw_output`             | [`Record::Raw`]        |
//! | no header                | [`Record::Fields`]     |
//! | header (parsed or set)   | [`Record::Row`]        |

use crate::error::{NavError, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// One data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Undecoded line text, terminator removed.
    Raw(String),
    /// Field values in column order.
    Fields(Vec<String>),
    /// Field values keyed by header column.
    Row(Row),
}

impl Record {
    #[must_use]
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Raw(s) => Some(s),
            _ => None,
        }
    }

    /// Field values in column order, for both `Fields` and `Row` records.
    #[must_use]
    pub fn values(&self) -> Option<&[String]> {
        match self {
            Self::Raw(_) => None,
            Self::Fields(v) => Some(v),
            Self::Row(r) => Some(r.values()),
        }
    }

    #[must_use]
    pub fn as_row(&self) -> Option<&Row> {
        match self {
            Self::Row(r) => Some(r),
            _ => None,
        }
    }

    /// Value of column `name`. Always `None` for records without a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.as_row().and_then(|r| r.get(name))
    }

    /// Deserialize into `T` with serde.
    ///
    /// `Row` records deserialize by column name (structs, maps); `Fields` records by position
    /// (tuples, tuple structs).
    ///
    /// # Errors
    /// Returns [`NavError::Unsupported`] for raw records and [`NavError::Csv`] when the values do
    /// not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::Raw(_) => Err(NavError::Unsupported(
                "raw records cannot be deserialized".into(),
            )),
            Self::Fields(values) => Ok(csv::StringRecord::from(values.clone()).deserialize(None)?),
            Self::Row(row) => row.deserialize(),
        }
    }
}

/// Values of one row paired with the header they were decoded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    header: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    /// Pair `values` with `header`. Lengths must already agree.
    pub(crate) fn new(header: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(header.len(), values.len());
        Self { header, values }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.header
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_str())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.header
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// Copy into a column → value map. Later duplicate column names win.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Deserialize into `T` using the header as field names.
    ///
    /// # Errors
    /// Returns [`NavError::Csv`] if the values do not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        let header = csv::StringRecord::from(self.header.to_vec());
        let values = csv::StringRecord::from(self.values.clone());
        Ok(values.deserialize(Some(&header))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn inventory_row() -> Row {
        let header: Arc<[String]> = vec!["time".into(), "product".into(), "quantity".into()].into();
        Row::new(header, vec!["5".into(), "tire".into(), "4".into()])
    }

    #[test]
    fn row_lookup_by_column() {
        let row = inventory_row();
        assert_eq!(row.get("product"), Some("tire"));
        assert_eq!(row.get("price"), None);
        assert_eq!(
            row.iter().collect::<Vec<_>>(),
            vec![("time", "5"), ("product", "tire"), ("quantity", "4")]
        );
        assert_eq!(row.to_map()["quantity"], "4");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Stock {
        time: u32,
        product: String,
        quantity: u64,
    }

    #[test]
    fn typed_deserialization() {
        let rec = Record::Row(inventory_row());
        let stock: Stock = rec.deserialize().unwrap();
        assert_eq!(
            stock,
            Stock {
                time: 5,
                product: "tire".into(),
                quantity: 4
            }
        );

        let rec = Record::Fields(vec!["8".into(), "sparkplug".into()]);
        let pair: (u32, String) = rec.deserialize().unwrap();
        assert_eq!(pair, (8, "sparkplug".to_string()));

        assert!(Record::Raw("8,sparkplug".into()).deserialize::<(u32, String)>().is_err());
    }
}
