//! Conversion of step events into step nodes.

use tracing::{trace, warn};

use crate::assembler::DocumentScope;
use crate::error::BuildError;
use crate::events::{MultilineArgument, StepEvent};
use crate::graph::{ScenarioId, StepDraft, StepId};
use crate::table::DataTable;

/// Local key of a step within its scenario.
pub(crate) fn step_name(line: usize) -> String {
    format!("step_{line}")
}

/// Join comment lines into a single block.
pub(crate) fn join_comments(comments: &[String]) -> String {
    comments.join("\n")
}

/// Build a step owned by `container` and append it to the container.
///
/// A doc string argument sets the step's doc string and a data table sets
/// its table. Unrecognised argument kinds are logged and dropped.
pub(crate) fn build_step(
    scope: &mut DocumentScope<'_>,
    event: &StepEvent,
    container: ScenarioId,
) -> Result<StepId, BuildError> {
    let line = event.location.line;
    let mut draft = StepDraft {
        name: step_name(line),
        keyword: event.keyword.clone(),
        value: event.text.clone(),
        comments: join_comments(&event.comments),
        file: scope.document.to_path_buf(),
        line,
        docstring: None,
        table: None,
    };

    match &event.argument {
        Some(MultilineArgument::DocString { content, .. }) => {
            draft.docstring = Some(content.clone());
        }
        Some(MultilineArgument::DataTable { rows, .. }) => {
            draft.table = Some(DataTable::from_rows(rows, scope.document)?);
        }
        Some(MultilineArgument::Unrecognized { kind }) => {
            warn!(
                document = %scope.document.display(),
                line,
                kind = %kind,
                "ignoring unrecognised step argument"
            );
        }
        None => {}
    }

    trace!(line, text = %draft.value, "built step");
    Ok(scope.corpus.attach_step(container, draft))
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::events::{Location, RowEvent};
    use crate::filter::FilterPolicy;
    use crate::graph::{Corpus, Feature, Header, Scenario, ScenarioKind};

    fn container(corpus: &mut Corpus) -> ScenarioId {
        let header = Header {
            file: PathBuf::from("steps.feature"),
            line: 2,
            ..Header::default()
        };
        let feature = corpus.insert_feature(Feature::new(header.clone()));
        corpus.insert_scenario(Scenario::new(header, ScenarioKind::Scenario, feature))
    }

    fn step_event(line: usize, argument: Option<MultilineArgument>) -> StepEvent {
        StepEvent {
            keyword: "Given ".into(),
            text: "a thing".into(),
            comments: vec!["# note".into()],
            location: Location::new(line, 5),
            argument,
        }
    }

    #[test]
    fn copies_attributes_and_links_container() {
        let mut corpus = Corpus::new();
        let owner = container(&mut corpus);
        let policy = FilterPolicy::default();
        let mut scope = DocumentScope::new(&mut corpus, Path::new("steps.feature"), &policy);

        let id = build_step(&mut scope, &step_event(3, None), owner).expect("step builds");
        let step = corpus.step(id).expect("step stored");
        assert_eq!(step.name, "step_3");
        assert_eq!(step.keyword, "Given ");
        assert_eq!(step.value, "a thing");
        assert_eq!(step.comments, "# note");
        assert_eq!(step.line, 3);
        assert_eq!(step.scenario(), owner);
        assert!(!step.has_docstring());
        assert!(!step.has_table());
        assert_eq!(corpus.scenario(owner).expect("scenario").steps(), &[id]);
    }

    #[test]
    fn doc_string_argument_sets_text() {
        let mut corpus = Corpus::new();
        let owner = container(&mut corpus);
        let policy = FilterPolicy::default();
        let mut scope = DocumentScope::new(&mut corpus, Path::new("steps.feature"), &policy);
        let argument = MultilineArgument::DocString {
            content: "hello".into(),
            location: Location::new(4, 7),
        };

        let id = build_step(&mut scope, &step_event(3, Some(argument)), owner).expect("step builds");
        let step = corpus.step(id).expect("step stored");
        assert_eq!(step.docstring.as_deref(), Some("hello"));
        assert!(step.table.is_none());
    }

    #[test]
    fn data_table_argument_sets_rows() {
        let mut corpus = Corpus::new();
        let owner = container(&mut corpus);
        let policy = FilterPolicy::default();
        let mut scope = DocumentScope::new(&mut corpus, Path::new("steps.feature"), &policy);
        let argument = MultilineArgument::DataTable {
            rows: vec![
                RowEvent::from_values(Location::new(4, 7), ["a", "b"]),
                RowEvent::from_values(Location::new(5, 7), ["1", "2"]),
            ],
            location: Location::new(4, 7),
        };

        let id = build_step(&mut scope, &step_event(3, Some(argument)), owner).expect("step builds");
        let table = corpus
            .step(id)
            .and_then(|step| step.table.as_ref())
            .expect("table attached");
        assert_eq!(table.rows(), &[vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn unrecognised_argument_is_ignored() {
        let mut corpus = Corpus::new();
        let owner = container(&mut corpus);
        let policy = FilterPolicy::default();
        let mut scope = DocumentScope::new(&mut corpus, Path::new("steps.feature"), &policy);
        let argument = MultilineArgument::Unrecognized {
            kind: "media".into(),
        };

        let id = build_step(&mut scope, &step_event(3, Some(argument)), owner).expect("step builds");
        let step = corpus.step(id).expect("step stored");
        assert!(step.docstring.is_none());
        assert!(step.table.is_none());
    }
}
