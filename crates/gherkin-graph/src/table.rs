//! Rectangular data tables attached to steps.
//!
//! Tables own every cell string, so cloning a table (or deriving a new one
//! with [`DataTable::map_cells`]) never aliases the source rows. Outline
//! expansion relies on this to keep template steps untouched.

use std::path::Path;

use serde::Serialize;

use crate::error::BuildError;
use crate::events::RowEvent;

/// A rectangular table of cell strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Flatten parsed rows into a table, rejecting ragged rows.
    ///
    /// The first row sets the expected width.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::RaggedTable`] when any row differs in width from
    /// the first row.
    pub fn from_rows(rows: &[RowEvent], document: &Path) -> Result<Self, BuildError> {
        let expected = rows.first().map_or(0, |row| row.cells.len());
        if let Some((row, event)) = find_ragged_row(rows, expected) {
            return Err(BuildError::RaggedTable {
                document: document.to_path_buf(),
                line: event.location.line,
                row,
                expected,
                found: event.cells.len(),
            });
        }
        Ok(Self {
            rows: flatten_rows(rows),
        })
    }

    /// Rows in document order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Mutable access to the rows of this table only.
    pub fn rows_mut(&mut self) -> &mut [Vec<String>] {
        &mut self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns, taken from the first row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Cell at `row`, `column` (both 0-based).
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }

    /// Build an independent copy with every cell passed through `f`.
    #[must_use]
    pub fn map_cells<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        Self {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| f(cell)).collect())
                .collect(),
        }
    }
}

impl From<Vec<Vec<String>>> for DataTable {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

/// Reduce parsed rows to their raw cell values, row by row.
pub(crate) fn flatten_rows(rows: &[RowEvent]) -> Vec<Vec<String>> {
    rows.iter().map(RowEvent::values).collect()
}

/// Locate the first row whose width differs from `expected`.
pub(crate) fn find_ragged_row(rows: &[RowEvent], expected: usize) -> Option<(usize, &RowEvent)> {
    rows.iter()
        .enumerate()
        .find(|(_, row)| row.cells.len() != expected)
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use crate::events::Location;

    fn rows(values: &[&[&str]]) -> Vec<RowEvent> {
        values
            .iter()
            .enumerate()
            .map(|(idx, cells)| RowEvent::from_values(Location::new(idx + 1, 7), cells.iter().copied()))
            .collect()
    }

    #[test]
    fn flattens_cells_row_by_row() {
        let table = DataTable::from_rows(&rows(&[&["a", "b"], &["1", "2"]]), Path::new("x.feature"))
            .expect("rectangular table");
        assert_eq!(table.len(), 2);
        assert_eq!(table.width(), 2);
        assert_eq!(table.cell(1, 0), Some("1"));
        assert_eq!(table.cell(2, 0), None);
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = DataTable::from_rows(&rows(&[&["a", "b"], &["1"]]), Path::new("x.feature"))
            .expect_err("ragged table must fail");
        assert_eq!(
            err,
            BuildError::RaggedTable {
                document: "x.feature".into(),
                line: 2,
                row: 1,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn empty_table_is_accepted() {
        let table = DataTable::from_rows(&[], Path::new("x.feature")).expect("empty table");
        assert!(table.is_empty());
        assert_eq!(table.width(), 0);
    }

    #[test]
    fn mapped_copy_does_not_alias_source() {
        let source = DataTable::from(vec![vec!["<n>".to_string()]]);
        let mut copy = source.map_cells(|cell| cell.replace("<n>", "2"));
        assert_eq!(copy.cell(0, 0), Some("2"));

        if let Some(cell) = copy.rows_mut().first_mut().and_then(|row| row.first_mut()) {
            cell.push_str("0");
        }
        assert_eq!(copy.cell(0, 0), Some("20"));
        assert_eq!(source.cell(0, 0), Some("<n>"));
    }
}
