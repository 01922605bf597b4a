//! Pre-built datasets.

use super::mock_io::{TempFilePath, mock_csv_file};
use anyhow::Result;

/// Column names of the inventory dataset.
pub const INVENTORY_HEADER: [&str; 3] = ["time", "product", "quantity"];

/// Data rows of the inventory dataset, in file order.
pub const INVENTORY_ROWS: [[&str; 3]; 6] = [
    ["5", "tire", "4"],
    ["8", "sparkplug", "20"],
    ["2", "battery", "120"],
    ["10", "tire", "2"],
    ["11", "tire", "3"],
    ["30", "sparkplug", "35"],
];

/// Header plus data rows of the inventory dataset.
#[must_use]
pub fn inventory_lines() -> Vec<Vec<String>> {
    std::iter::once(INVENTORY_HEADER)
        .chain(INVENTORY_ROWS)
        .map(|row| row.iter().map(|s| (*s).to_string()).collect())
        .collect()
}

/// Write the inventory dataset (header included) to a temporary CSV file.
///
/// # Errors
/// Returns an error if the temporary file cannot be created or written.
pub fn inventory_file() -> Result<TempFilePath> {
    mock_csv_file(&inventory_lines())
}

/// `n` rows of `id,group,payload` where `group` cycles through `groups` values.
///
/// Handy for tests that need more rows than the inventory dataset has.
#[must_use]
pub fn numbered_lines(n: usize, groups: usize) -> Vec<Vec<String>> {
    let groups = groups.max(1);
    std::iter::once(vec!["id".to_string(), "group".to_string(), "payload".to_string()])
        .chain((0..n).map(|i| {
            vec![
                i.to_string(),
                format!("g{}", i % groups),
                format!("payload, #{i}"),
            ]
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_has_header_first() {
        let lines = inventory_lines();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], INVENTORY_HEADER);
        assert_eq!(lines[6], ["30", "sparkplug", "35"]);
    }

    #[test]
    fn numbered_lines_cycle_groups() {
        let lines = numbered_lines(5, 2);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3][1], "g0");
        assert_eq!(lines[4][1], "g1");
    }
}
