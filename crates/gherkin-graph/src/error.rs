//! Semantic error types for graph construction.
//!
//! Construction is lenient about content (unknown placeholders, unknown
//! multiline argument kinds) but treats broken table shapes as invariant
//! violations. An error returned mid-document leaves the corpus with a
//! partially built feature; callers are expected to discard it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling a document into the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A step data table row has a different width from its first row.
    #[error(
        "{}:{line}: data table row {row} has {found} cells, expected {expected}",
        document.display()
    )]
    RaggedTable {
        /// Document containing the table.
        document: PathBuf,
        /// Line of the offending row.
        line: usize,
        /// 0-based row index within the table.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// An examples data row has a different width from the header.
    #[error(
        "{}:{line}: examples row {row} has {found} cells, header has {expected}",
        document.display()
    )]
    RaggedExamples {
        /// Document containing the examples block.
        document: PathBuf,
        /// Line of the offending row.
        line: usize,
        /// 0-based data row index.
        row: usize,
        /// Header width.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_table_error_displays_location() {
        let error = BuildError::RaggedTable {
            document: PathBuf::from("features/cart.feature"),
            line: 12,
            row: 2,
            expected: 3,
            found: 2,
        };
        assert_eq!(
            error.to_string(),
            "features/cart.feature:12: data table row 2 has 2 cells, expected 3"
        );
    }

    #[test]
    fn ragged_examples_error_displays_location() {
        let error = BuildError::RaggedExamples {
            document: PathBuf::from("a.feature"),
            line: 7,
            row: 0,
            expected: 2,
            found: 1,
        };
        assert_eq!(
            error.to_string(),
            "a.feature:7: examples row 0 has 1 cells, header has 2"
        );
    }
}
