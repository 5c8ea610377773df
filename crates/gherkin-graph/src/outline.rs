//! Scenario outline construction and expansion.
//!
//! An outline is built like a scenario, collecting its template steps
//! first. Each examples block then yields one concrete scenario per data
//! row. Every generated step is a fresh copy of its template with the row's
//! values substituted into the text, the doc string, and every table cell;
//! the template steps themselves are never modified.

use tracing::debug;

use crate::assembler::DocumentScope;
use crate::error::BuildError;
use crate::events::{ExamplesEvent, StatementEvent};
use crate::graph::{Examples, FeatureId, Header, Scenario, ScenarioId, ScenarioKind, Step, StepDraft};
use crate::placeholder::{ExampleRow, placeholder_names};
use crate::scenario::{build_statement, child_name};
use crate::step::join_comments;
use crate::table::{find_ragged_row, flatten_rows};

/// Build an outline and expand all of its examples blocks.
///
/// Returns `None` when the outline's tags are excluded.
pub(crate) fn build_outline(
    scope: &mut DocumentScope<'_>,
    event: &StatementEvent,
    feature: FeatureId,
) -> Result<Option<ScenarioId>, BuildError> {
    if scope.policy.excludes_tags(&event.tags) {
        debug!(line = event.location.line, name = %event.name, "outline excluded by tag filter");
        return Ok(None);
    }
    let name = child_name(scope, feature);
    let outline = build_statement(scope, event, feature, ScenarioKind::Outline, name)?;
    scope.corpus.push_child(feature, outline);

    for examples in &event.examples {
        expand(scope, examples, outline)?;
    }
    debug!(
        line = event.location.line,
        name = %event.name,
        instances = scope.corpus.scenario(outline).map_or(0, |s| s.scenarios().len()),
        "built outline"
    );
    Ok(Some(outline))
}

/// Attach one examples block to `outline` and generate its scenarios.
///
/// # Errors
///
/// Returns [`BuildError::RaggedExamples`] when a data row is not as wide as
/// the header. Nothing is attached to the outline in that case.
pub(crate) fn expand(
    scope: &mut DocumentScope<'_>,
    event: &ExamplesEvent,
    outline: ScenarioId,
) -> Result<(), BuildError> {
    let header = event
        .header
        .as_ref()
        .map(crate::events::RowEvent::values)
        .unwrap_or_default();
    if let Some((row, ragged)) = find_ragged_row(&event.body, header.len()) {
        return Err(BuildError::RaggedExamples {
            document: scope.document.to_path_buf(),
            line: ragged.location.line,
            row,
            expected: header.len(),
            found: ragged.cells.len(),
        });
    }
    let rows = flatten_rows(&event.body);

    let Some(template) = scope.corpus.scenario(outline) else {
        return Ok(());
    };
    let outline_header = template.header.clone();
    let feature = template.feature();
    let mut sequence = template.scenarios().len();
    let steps: Vec<Step> = scope.corpus.steps_of(outline).cloned().collect();
    let unmatched = unmatched_placeholders(&steps, &header);
    if !unmatched.is_empty() {
        debug!(
            line = event.location.line,
            placeholders = ?unmatched,
            "template placeholders without an examples column are left verbatim"
        );
    }

    let block = scope.corpus.push_examples(
        outline,
        Examples::new(
            event.keyword.clone(),
            event.name.clone(),
            join_comments(&event.comments),
            event.location.line,
            header.clone(),
            rows.clone(),
        ),
    );

    for row in &rows {
        let values = ExampleRow::new(&header, row);
        let instance = scope.corpus.insert_scenario(Scenario::new(
            instance_header(&outline_header, sequence),
            ScenarioKind::Example,
            feature,
        ));
        for step in &steps {
            scope.corpus.attach_step(instance, instantiate(step, &values));
        }
        scope.corpus.push_instance(outline, block, instance);
        sequence += 1;
    }
    debug!(
        line = event.location.line,
        rows = rows.len(),
        "expanded examples"
    );
    Ok(())
}

/// Placeholder names used by `steps` that no column of `header` provides.
///
/// Names are reported once each, in order of first appearance.
fn unmatched_placeholders(steps: &[Step], header: &[String]) -> Vec<String> {
    let mut unmatched: Vec<String> = Vec::new();
    let texts = steps.iter().flat_map(|step| {
        let cells = step
            .table
            .iter()
            .flat_map(|table| table.rows().iter().flatten().map(String::as_str));
        std::iter::once(step.value.as_str())
            .chain(step.docstring.as_deref())
            .chain(cells)
    });
    for text in texts {
        for name in placeholder_names(text) {
            let known = header.iter().any(|column| column == name);
            if !known && !unmatched.iter().any(|seen| seen == name) {
                unmatched.push(name.to_string());
            }
        }
    }
    unmatched
}

/// Header of the instance at 0-based `sequence` within its outline.
fn instance_header(outline: &Header, sequence: usize) -> Header {
    Header {
        name: format!("example_{sequence}"),
        keyword: outline.keyword.clone(),
        value: format!("{} ({})", outline.value, sequence + 1),
        description: outline.description.clone(),
        comments: outline.comments.clone(),
        file: outline.file.clone(),
        line: outline.line,
    }
}

/// Copy a template step, substituting the row into every text it carries.
fn instantiate(template: &Step, values: &ExampleRow<'_>) -> StepDraft {
    StepDraft {
        name: template.name.clone(),
        keyword: template.keyword.clone(),
        value: values.substitute(&template.value).into_owned(),
        comments: template.comments.clone(),
        file: template.file.clone(),
        line: template.line,
        docstring: template
            .docstring
            .as_deref()
            .map(|text| values.substitute(text).into_owned()),
        table: template
            .table
            .as_ref()
            .map(|table| table.map_cells(|cell| values.substitute(cell).into_owned())),
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests use explicit failures for clarity")]
mod tests;
