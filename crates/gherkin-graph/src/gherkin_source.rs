//! Parse events produced from `.feature` text with the `gherkin` crate.
//!
//! The `gherkin` AST lacks a few things the graph wants: comment blocks are
//! dropped, and tables carry one position for the whole block. Comments are
//! recovered with a lightweight scan of the raw text, and row positions are
//! derived from the table position.
//!
//! Syntax errors do not abort a run. They are returned as [`Diagnostic`]s
//! next to a document without a feature.

use std::path::{Path, PathBuf};

use gherkin::GherkinEnv;
use tracing::warn;

use crate::events::{
    ChildEvent, DocumentEvent, ExamplesEvent, FeatureEvent, Location, MultilineArgument, RowEvent,
    StatementEvent, StepEvent, TagEvent,
};
use crate::tags::TAG_MARKER;

/// Errors that can occur while loading a `.feature` file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Failed to read the source file.
    #[error("failed to read feature file {}: {source}", path.display())]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal problem reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Document the problem was found in.
    pub path: PathBuf,
    /// Parser message.
    pub message: String,
}

/// A parsed document plus any parser diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Parse events for the document.
    pub document: DocumentEvent,
    /// Problems that prevented the feature from being parsed.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Clone, Copy, Debug)]
struct FeatureSource<'a>(&'a str);

impl<'a> FeatureSource<'a> {
    fn new(source: &'a str) -> Self {
        Self(source)
    }

    /// Text of 1-based `line`, without the line terminator.
    fn line(&self, line: usize) -> Option<LineContent<'a>> {
        let idx = line.checked_sub(1)?;
        self.0.lines().nth(idx).map(LineContent::new)
    }

    /// Line and column of a byte offset.
    fn location_at(&self, offset: usize) -> Location {
        let before = self.0.get(..offset).unwrap_or(self.0);
        let line = before.matches('\n').count() + 1;
        let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
        Location::new(line, column)
    }

    /// Location of the first table row at or after a byte offset.
    ///
    /// Table spans do not always begin on the row itself, so the scan moves
    /// forward to the first line starting with a pipe.
    fn table_start(&self, offset: usize) -> Location {
        let from = self.location_at(offset);
        self.row_from(from.line).unwrap_or(from)
    }

    /// Location of the first table row on or after 1-based `line`.
    ///
    /// Comment and blank lines between rows are skipped.
    fn row_from(&self, line: usize) -> Option<Location> {
        let mut cursor = line;
        while let Some(content) = self.line(cursor) {
            if content.trimmed().starts_with('|') {
                let column = content.0.find('|').map_or(1, |pipe| pipe + 1);
                return Some(Location::new(cursor, column));
            }
            cursor += 1;
        }
        None
    }

    /// Comment lines directly above the keyword on 1-based `line`.
    ///
    /// Tag lines between the comments and the keyword are skipped; a blank
    /// line or any other content ends the block.
    fn comments_before(&self, line: usize) -> Vec<String> {
        let mut comments = Vec::new();
        let mut cursor = line;
        while cursor > 1 {
            cursor -= 1;
            let Some(content) = self.line(cursor) else {
                break;
            };
            if content.is_tag_line() {
                continue;
            }
            if !content.is_comment() || content.is_language_header() {
                break;
            }
            comments.push(content.trimmed().to_string());
        }
        comments.reverse();
        comments
    }
}

#[derive(Clone, Copy, Debug)]
struct LineContent<'a>(&'a str);

impl<'a> LineContent<'a> {
    fn new(line: &'a str) -> Self {
        Self(line)
    }

    fn trimmed(&self) -> &'a str {
        self.0.trim()
    }

    fn is_comment(&self) -> bool {
        self.trimmed().starts_with('#')
    }

    fn is_tag_line(&self) -> bool {
        self.trimmed().starts_with(TAG_MARKER)
    }

    fn is_language_header(&self) -> bool {
        self.trimmed()
            .strip_prefix('#')
            .is_some_and(|rest| rest.trim_start().starts_with("language:"))
    }
}

/// Read and parse a `.feature` file.
///
/// # Errors
///
/// Returns [`LoadError::Read`] when the file cannot be read. Parse failures
/// are reported through [`ParsedDocument::diagnostics`] instead.
pub fn load_document(path: &Path) -> Result<ParsedDocument, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_document(path, &text))
}

/// Parse `.feature` text into parse events.
///
/// The text is normalised to end with a newline, matching what the `gherkin`
/// parser expects.
#[must_use]
pub fn parse_document(path: impl Into<PathBuf>, text: &str) -> ParsedDocument {
    let path = path.into();
    let mut normalised = text.to_string();
    if !normalised.ends_with('\n') {
        normalised.push('\n');
    }
    if normalised.trim().is_empty() {
        return ParsedDocument {
            document: DocumentEvent {
                path,
                feature: None,
            },
            diagnostics: Vec::new(),
        };
    }

    match gherkin::Feature::parse(&normalised, GherkinEnv::default()) {
        Ok(feature) => {
            let source = FeatureSource::new(&normalised);
            ParsedDocument {
                document: DocumentEvent {
                    feature: Some(feature_event(source, &path, &feature)),
                    path,
                },
                diagnostics: Vec::new(),
            }
        }
        Err(err) => {
            let diagnostic = Diagnostic {
                path: path.clone(),
                message: err.to_string(),
            };
            ParsedDocument {
                document: DocumentEvent {
                    path,
                    feature: None,
                },
                diagnostics: vec![diagnostic],
            }
        }
    }
}

/// Owned text from a parser field that may be absent.
trait SourceText {
    fn into_text(self) -> String;
}

impl SourceText for String {
    fn into_text(self) -> String {
        self
    }
}

impl SourceText for Option<String> {
    fn into_text(self) -> String {
        self.unwrap_or_default()
    }
}

fn location(position: &gherkin::LineCol) -> Location {
    Location::new(position.line, position.col)
}

fn tag_events(tags: &[String], at: Location) -> Vec<TagEvent> {
    tags.iter().map(|tag| TagEvent::new(raw_tag(tag), at)).collect()
}

/// Restore the marker when the parser has stripped it.
fn raw_tag(tag: &str) -> String {
    if tag.starts_with(TAG_MARKER) {
        tag.to_string()
    } else {
        format!("{TAG_MARKER}{tag}")
    }
}

/// Union of two tag lists, keeping the first spelling of each tag.
fn merge_tags(base: &[String], extra: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(base.len() + extra.len());
    for tag in base.iter().chain(extra) {
        if !merged.iter().any(|seen| seen == tag) {
            merged.push(tag.clone());
        }
    }
    merged
}

fn feature_event(source: FeatureSource<'_>, path: &Path, feature: &gherkin::Feature) -> FeatureEvent {
    let at = location(&feature.position);
    let mut children = Vec::new();

    if let Some(background) = feature.background.as_ref() {
        children.push(ChildEvent::Background(background_event(source, background)));
    }
    for scenario in &feature.scenarios {
        children.push(child_event(source, scenario, &[]));
    }
    for rule in &feature.rules {
        if let Some(background) = rule.background.as_ref() {
            warn!(
                document = %path.display(),
                line = background.position.line,
                "ignoring rule background"
            );
        }
        for scenario in &rule.scenarios {
            children.push(child_event(source, scenario, &rule.tags));
        }
    }
    children.sort_by_key(|child| child.statement().location.line);

    FeatureEvent {
        keyword: feature.keyword.clone(),
        name: feature.name.clone(),
        description: feature.description.clone().into_text(),
        comments: source.comments_before(at.line),
        location: at,
        tags: tag_events(&feature.tags, at),
        children,
    }
}

fn background_event(source: FeatureSource<'_>, background: &gherkin::Background) -> StatementEvent {
    let at = location(&background.position);
    StatementEvent {
        keyword: background.keyword.clone(),
        name: background.name.clone().into_text(),
        description: background.description.clone().into_text(),
        comments: source.comments_before(at.line),
        location: at,
        tags: Vec::new(),
        steps: step_events(source, &background.steps),
        examples: Vec::new(),
    }
}

fn is_scenario_outline(scenario: &gherkin::Scenario) -> bool {
    !scenario.examples.is_empty()
        || matches!(
            scenario.keyword.trim(),
            "Scenario Outline" | "Scenario Template"
        )
}

fn child_event(
    source: FeatureSource<'_>,
    scenario: &gherkin::Scenario,
    inherited_tags: &[String],
) -> ChildEvent {
    let at = location(&scenario.position);
    let tags = merge_tags(inherited_tags, &scenario.tags);
    let statement = StatementEvent {
        keyword: scenario.keyword.clone(),
        name: scenario.name.clone(),
        description: scenario.description.clone().into_text(),
        comments: source.comments_before(at.line),
        location: at,
        tags: tag_events(&tags, at),
        steps: step_events(source, &scenario.steps),
        examples: scenario
            .examples
            .iter()
            .map(|examples| examples_event(source, examples))
            .collect(),
    };
    if is_scenario_outline(scenario) {
        ChildEvent::ScenarioOutline(statement)
    } else {
        ChildEvent::Scenario(statement)
    }
}

fn step_events(source: FeatureSource<'_>, steps: &[gherkin::Step]) -> Vec<StepEvent> {
    steps
        .iter()
        .map(|step| {
            let at = location(&step.position);
            StepEvent {
                keyword: step.keyword.clone(),
                text: step.value.clone(),
                comments: source.comments_before(at.line),
                location: at,
                argument: step_argument(source, step, at),
            }
        })
        .collect()
}

fn step_argument(
    source: FeatureSource<'_>,
    step: &gherkin::Step,
    at: Location,
) -> Option<MultilineArgument> {
    match (step.docstring.as_ref(), step.table.as_ref()) {
        (Some(content), table) => {
            if table.is_some() {
                warn!(line = at.line, "step has both a doc string and a table; keeping the doc string");
            }
            Some(MultilineArgument::DocString {
                content: content.clone(),
                location: Location::new(at.line + 1, at.column),
            })
        }
        (None, Some(table)) => Some(MultilineArgument::DataTable {
            rows: row_events(source, table),
            location: source.table_start(table.span.start),
        }),
        (None, None) => None,
    }
}

/// Rows of a table, each placed on the next pipe line after its predecessor.
fn row_events(source: FeatureSource<'_>, table: &gherkin::Table) -> Vec<RowEvent> {
    let mut next = source.table_start(table.span.start);
    let mut rows = Vec::with_capacity(table.rows.len());
    for cells in &table.rows {
        rows.push(RowEvent::from_values(next, cells.iter().cloned()));
        next = source
            .row_from(next.line + 1)
            .unwrap_or_else(|| Location::new(next.line + 1, next.column));
    }
    rows
}

fn examples_event(source: FeatureSource<'_>, examples: &gherkin::Examples) -> ExamplesEvent {
    let at = location(&examples.position);
    let mut rows = examples
        .table
        .as_ref()
        .map(|table| row_events(source, table))
        .unwrap_or_default();
    let header = if rows.is_empty() {
        None
    } else {
        Some(rows.remove(0))
    };
    ExamplesEvent {
        keyword: examples.keyword.clone(),
        name: examples.name.clone().into_text(),
        comments: source.comments_before(at.line),
        location: at,
        header,
        body: rows,
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests;
