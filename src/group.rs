//! Grouping index: per registered field, value → offsets of the rows holding it.
//!
//! Groups store offsets only, never row data. They are built by [`scan`], a single sequential
//! pass over every data row that also yields the exact [`RowIndex`] as a by-product.
//!
//! Registration is additive: registering new fields keeps groups of fields registered earlier,
//! and registering a field again replaces its groups.

use crate::error::{NavError, Result};
use crate::index::RowIndex;
use crate::io::{LineSource, RecordDecoder};
use std::collections::HashMap;
use std::sync::Arc;

/// Groups of a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldGroups {
    keys: Vec<String>,
    offsets: HashMap<String, Arc<[u64]>>,
}

impl FieldGroups {
    /// Observed values in order of first appearance.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Offsets of rows holding `key`, in file order.
    #[must_use]
    pub fn offsets(&self, key: &str) -> Option<&Arc<[u64]>> {
        self.offsets.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.offsets.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// All registered fields, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingIndex {
    order: Vec<String>,
    fields: HashMap<String, FieldGroups>,
}

impl GroupingIndex {
    /// Registered field names.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldGroups> {
        self.fields.get(field)
    }

    /// Groups of `field`, or [`NavError::NotRegistered`].
    ///
    /// # Errors
    /// Returns [`NavError::NotRegistered`] if `field` has no groups.
    pub fn require(&self, field: &str) -> Result<&FieldGroups> {
        self.get(field).ok_or_else(|| NavError::NotRegistered {
            field: field.to_string(),
        })
    }

    /// Add or replace groups. Fields not mentioned are kept.
    pub fn merge(&mut self, groups: Vec<(String, FieldGroups)>) {
        for (field, g) in groups {
            if self.fields.insert(field.clone(), g).is_none() {
                self.order.push(field);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.fields.clear();
    }
}

/// Result of a full grouping pass.
#[derive(Debug)]
pub struct ScanOutcome {
    pub index: RowIndex,
    pub groups: Vec<(String, FieldGroups)>,
}

/// Read every data row from `data_start` to end-of-file, grouping offsets by the values of
/// `fields`.
///
/// # Errors
/// Returns [`NavError::InvalidConfiguration`] for a field that is not a header column,
/// [`NavError::RecordShapeMismatch`] for rows that do not match the header, and any I/O or
/// parse error met on the way.
pub fn scan(
    src: &mut LineSource,
    decoder: &RecordDecoder,
    header: &[String],
    fields: &[String],
    data_start: u64,
) -> Result<ScanOutcome> {
    let columns = fields
        .iter()
        .map(|f| {
            header.iter().position(|c| c == f).ok_or_else(|| {
                NavError::InvalidConfiguration(format!("field `{f}` is not a header column"))
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut building: Vec<(Vec<String>, HashMap<String, Vec<u64>>)> =
        vec![(Vec::new(), HashMap::new()); fields.len()];
    let mut offsets = Vec::new();

    src.seek(data_start)?;
    while let Some((offset, line)) = src.read_line()? {
        offsets.push(offset);
        let values = decoder.decode_fields(&line, Some(header))?;
        if values.len() != header.len() {
            return Err(NavError::RecordShapeMismatch {
                offset,
                expected: header.len(),
                found: values.len(),
            });
        }
        for (&col, (keys, by_key)) in columns.iter().zip(building.iter_mut()) {
            let value = &values[col];
            match by_key.get_mut(value) {
                Some(list) => list.push(offset),
                None => {
                    keys.push(value.clone());
                    by_key.insert(value.clone(), vec![offset]);
                }
            }
        }
    }
    let end = src.position();

    let groups = fields
        .iter()
        .cloned()
        .zip(building)
        .map(|(field, (keys, by_key))| {
            let offsets = by_key
                .into_iter()
                .map(|(k, v)| (k, Arc::from(v)))
                .collect();
            (field, FieldGroups { keys, offsets })
        })
        .collect();

    Ok(ScanOutcome {
        index: RowIndex::complete(offsets, end),
        groups,
    })
}
