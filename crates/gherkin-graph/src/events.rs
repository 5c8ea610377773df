//! Structural parse events consumed by the graph builders.
//!
//! These records describe a parsed feature document without any of the
//! cross-references that the graph adds. They are produced by an external
//! parser; [`crate::gherkin_source`] provides one built on the `gherkin`
//! crate, but tests and other front ends may construct them directly.

use std::path::PathBuf;

/// Source position of a parsed construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl Location {
    /// Create a location from a line and column.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A tag as written in the source, marker included (for example `@wip`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent {
    /// Raw tag text including the leading `@`.
    pub name: String,
    /// Where the tag appears.
    pub location: Location,
}

impl TagEvent {
    /// Create a tag record.
    #[must_use]
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// Top-level event for one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEvent {
    /// Path of the source document.
    pub path: PathBuf,
    /// The feature block, absent for empty or unparsable documents.
    pub feature: Option<FeatureEvent>,
}

/// A `Feature:` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureEvent {
    /// Keyword as written (`Feature`, `Ability`, ...).
    pub keyword: String,
    /// Feature title.
    pub name: String,
    /// Free-text description below the title.
    pub description: String,
    /// Comment lines attached to the block.
    pub comments: Vec<String>,
    /// Source position of the keyword line.
    pub location: Location,
    /// Tags declared on the feature.
    pub tags: Vec<TagEvent>,
    /// Children in document order.
    pub children: Vec<ChildEvent>,
}

/// A child of a feature, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildEvent {
    /// A `Background:` block.
    Background(StatementEvent),
    /// A plain `Scenario:` block.
    Scenario(StatementEvent),
    /// A `Scenario Outline:` block with one or more examples tables.
    ScenarioOutline(StatementEvent),
}

impl ChildEvent {
    /// The statement carried by this child.
    #[must_use]
    pub fn statement(&self) -> &StatementEvent {
        match self {
            Self::Background(statement)
            | Self::Scenario(statement)
            | Self::ScenarioOutline(statement) => statement,
        }
    }
}

/// A scenario-like block: background, scenario, or outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementEvent {
    /// Keyword as written.
    pub keyword: String,
    /// Title following the keyword.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Comment lines attached to the block.
    pub comments: Vec<String>,
    /// Source position of the keyword line.
    pub location: Location,
    /// Tags declared on the block. Always empty for backgrounds.
    pub tags: Vec<TagEvent>,
    /// Steps in document order.
    pub steps: Vec<StepEvent>,
    /// Examples blocks; only populated for outlines.
    pub examples: Vec<ExamplesEvent>,
}

/// A single step line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepEvent {
    /// Keyword as written, including `And`/`But`.
    pub keyword: String,
    /// Text following the keyword.
    pub text: String,
    /// Comment lines attached to the step.
    pub comments: Vec<String>,
    /// Source position of the step line.
    pub location: Location,
    /// Optional doc string or data table.
    pub argument: Option<MultilineArgument>,
}

/// Multiline argument attached to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultilineArgument {
    /// A doc string block.
    DocString {
        /// Block content with delimiters and indentation removed.
        content: String,
        /// Where the block starts.
        location: Location,
    },
    /// A data table.
    DataTable {
        /// Rows in document order.
        rows: Vec<RowEvent>,
        /// Where the table starts.
        location: Location,
    },
    /// An argument kind the builders do not understand; ignored.
    Unrecognized {
        /// Name reported by the producer.
        kind: String,
    },
}

/// An `Examples:` block attached to an outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamplesEvent {
    /// Keyword as written.
    pub keyword: String,
    /// Optional title.
    pub name: String,
    /// Comment lines attached to the block.
    pub comments: Vec<String>,
    /// Source position of the keyword line.
    pub location: Location,
    /// Header row naming the columns.
    pub header: Option<RowEvent>,
    /// Data rows.
    pub body: Vec<RowEvent>,
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowEvent {
    /// Where the row starts.
    pub location: Location,
    /// Cells in column order.
    pub cells: Vec<CellEvent>,
}

impl RowEvent {
    /// Build a row from plain cell values, all sharing the row location.
    #[must_use]
    pub fn from_values<I, S>(location: Location, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location,
            cells: values
                .into_iter()
                .map(|value| CellEvent {
                    value: value.into(),
                    location,
                })
                .collect(),
        }
    }

    /// Raw cell values in column order.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.cells.iter().map(|cell| cell.value.clone()).collect()
    }
}

/// A single table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellEvent {
    /// Trimmed cell text.
    pub value: String,
    /// Where the cell starts.
    pub location: Location,
}
