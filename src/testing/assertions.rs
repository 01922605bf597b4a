//! Assertions for navigator output.

use crate::error::Result;
use crate::record::Record;
use std::fmt::Debug;

/// Assert that a record's field values equal `expected`, in column order.
///
/// Works for both positional and header-keyed records.
///
/// # Panics
///
/// Panics if the record is raw or its values differ from `expected`.
pub fn assert_row_values<S: AsRef<str> + Debug>(record: &Record, expected: &[S]) {
    let Some(values) = record.values() else {
        panic!("Expected a decoded record with values {expected:?}, got {record:?}");
    };
    let expected: Vec<&str> = expected.iter().map(AsRef::<str>::as_ref).collect();
    assert_eq!(
        values, expected,
        "Record values mismatch:\n  Expected: {expected:?}\n  Actual: {values:?}"
    );
}

/// Collect a fallible row sequence, panicking on the first error.
///
/// # Panics
///
/// Panics with the error message if any item is an error.
pub fn collect_rows<I>(rows: I) -> Vec<Record>
where
    I: IntoIterator<Item = Result<Record>>,
{
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| r.unwrap_or_else(|e| panic!("Row #{i} failed: {e}")))
        .collect()
}

/// Assert that a row sequence yields records with exactly `expected` values, in order.
///
/// # Panics
///
/// Panics if the sequence errors, has a different length, or any row differs.
pub fn assert_rows_equal<I, R, S>(rows: I, expected: &[R])
where
    I: IntoIterator<Item = Result<Record>>,
    R: AsRef<[S]> + Debug,
    S: AsRef<str> + Debug,
{
    let actual = collect_rows(rows);
    assert_eq!(
        actual.len(),
        expected.len(),
        "Row count mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        let values = a.values().unwrap_or_default();
        let e: Vec<&str> = AsRef::<[S]>::as_ref(e)
            .iter()
            .map(AsRef::<str>::as_ref)
            .collect();
        assert_eq!(values, e, "Row mismatch at position {i}");
    }
}
