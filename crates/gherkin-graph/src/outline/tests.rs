//! Tests for outline expansion.

use std::path::Path;

use rstest::{fixture, rstest};

use super::*;
use crate::events::{Location, MultilineArgument, RowEvent, StepEvent, TagEvent};
use crate::filter::FilterPolicy;
use crate::graph::{Corpus, Feature};

const DOCUMENT: &str = "outline.feature";

#[fixture]
fn corpus() -> Corpus {
    let mut corpus = Corpus::new();
    corpus.insert_feature(Feature::new(Header {
        file: DOCUMENT.into(),
        line: 1,
        ..Header::default()
    }));
    corpus
}

fn feature_id() -> FeatureId {
    FeatureId(0)
}

fn examples(line: usize, header: &[&str], rows: &[&[&str]]) -> ExamplesEvent {
    ExamplesEvent {
        keyword: "Examples".into(),
        location: Location::new(line, 5),
        header: Some(RowEvent::from_values(Location::new(line + 1, 7), header.iter().copied())),
        body: rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                RowEvent::from_values(Location::new(line + 2 + idx, 7), row.iter().copied())
            })
            .collect(),
        ..ExamplesEvent::default()
    }
}

fn outline(examples: Vec<ExamplesEvent>) -> StatementEvent {
    StatementEvent {
        keyword: "Scenario Outline".into(),
        name: "eating".into(),
        description: "cucumbers".into(),
        comments: vec!["# outline".into()],
        location: Location::new(3, 3),
        tags: vec![TagEvent::new("@outline", Location::new(2, 3))],
        steps: vec![
            StepEvent {
                keyword: "Given ".into(),
                text: "I have <n> items".into(),
                location: Location::new(4, 5),
                argument: Some(MultilineArgument::DataTable {
                    rows: vec![RowEvent::from_values(Location::new(5, 7), ["<n>", "fixed"])],
                    location: Location::new(5, 7),
                }),
                ..StepEvent::default()
            },
            StepEvent {
                keyword: "Then ".into(),
                text: "I see <label>".into(),
                location: Location::new(6, 5),
                argument: Some(MultilineArgument::DocString {
                    content: "label=<label> count=<n> other=<missing>".into(),
                    location: Location::new(7, 7),
                }),
                ..StepEvent::default()
            },
        ],
        examples,
    }
}

fn build(corpus: &mut Corpus, event: &StatementEvent) -> Result<Option<ScenarioId>, BuildError> {
    let policy = FilterPolicy::default();
    let mut scope = DocumentScope::new(corpus, Path::new(DOCUMENT), &policy);
    build_outline(&mut scope, event, feature_id())
}

fn step_values(corpus: &Corpus, scenario: ScenarioId) -> Vec<String> {
    corpus.steps_of(scenario).map(|s| s.value.clone()).collect()
}

#[rstest]
fn generates_one_scenario_per_row(mut corpus: Corpus) {
    let event = outline(vec![
        examples(10, &["n", "label"], &[&["1", "one"], &["2", "two"]]),
        examples(20, &["n", "label"], &[&["3", "three"]]),
    ]);
    let id = build(&mut corpus, &event)
        .expect("outline builds")
        .expect("outline kept");

    let node = corpus.scenario(id).expect("outline stored");
    assert!(node.is_outline());
    assert_eq!(node.examples().len(), 2);
    assert_eq!(node.scenarios().len(), 3);
    assert_eq!(
        node.examples().iter().map(|e| e.scenarios().len()).collect::<Vec<_>>(),
        [2, 1]
    );
    for instance in node.scenarios() {
        let generated = corpus.scenario(*instance).expect("instance stored");
        assert_eq!(generated.kind, ScenarioKind::Example);
        assert_eq!(generated.steps().len(), 2);
        assert_eq!(generated.feature(), feature_id());
        assert_eq!(generated.outline(), Some(id));
        assert!(generated.tags().is_empty());
    }
    assert_eq!(
        corpus.feature(feature_id()).expect("feature").scenarios(),
        &[id],
        "instances are reachable through the outline only"
    );
}

#[rstest]
fn substitutes_text_doc_strings_and_tables(mut corpus: Corpus) {
    let event = outline(vec![examples(10, &["n", "label"], &[&["1", "one"], &["2", "two"]])]);
    let id = build(&mut corpus, &event)
        .expect("outline builds")
        .expect("outline kept");
    let instances = corpus.scenario(id).expect("outline").scenarios().to_vec();

    let first = *instances.first().expect("first instance");
    let second = *instances.get(1).expect("second instance");
    assert_eq!(step_values(&corpus, first), ["I have 1 items", "I see one"]);
    assert_eq!(step_values(&corpus, second), ["I have 2 items", "I see two"]);

    let table_step = corpus.steps_of(second).next().expect("table step");
    let table = table_step.table.as_ref().expect("table cloned");
    assert_eq!(table.cell(0, 0), Some("2"));
    assert_eq!(table.cell(0, 1), Some("fixed"));

    let doc_step = corpus.steps_of(first).nth(1).expect("doc string step");
    assert_eq!(
        doc_step.docstring.as_deref(),
        Some("label=one count=1 other=<missing>")
    );
}

#[rstest]
fn instances_inherit_outline_attributes(mut corpus: Corpus) {
    let event = outline(vec![
        examples(10, &["n", "label"], &[&["1", "one"]]),
        examples(20, &["n", "label"], &[&["2", "two"]]),
    ]);
    let id = build(&mut corpus, &event)
        .expect("outline builds")
        .expect("outline kept");
    let names: Vec<_> = corpus
        .scenario(id)
        .expect("outline")
        .scenarios()
        .iter()
        .map(|s| {
            let header = &corpus.scenario(*s).expect("instance").header;
            assert_eq!(header.keyword, "Scenario Outline");
            assert_eq!(header.description, "cucumbers");
            assert_eq!(header.comments, "# outline");
            assert_eq!(header.line, 3);
            (header.name.clone(), header.value.clone())
        })
        .collect();
    assert_eq!(
        names,
        [
            ("example_0".to_string(), "eating (1)".to_string()),
            ("example_1".to_string(), "eating (2)".to_string()),
        ]
    );
}

#[rstest]
fn templates_are_never_mutated(mut corpus: Corpus) {
    let event = outline(vec![examples(10, &["n", "label"], &[&["1", "one"], &["2", "two"]])]);
    let id = build(&mut corpus, &event)
        .expect("outline builds")
        .expect("outline kept");
    let outline = corpus.scenario(id).expect("outline").clone();
    let template_step = *outline.steps().first().expect("template step");
    let first_generated = corpus
        .scenario(*outline.scenarios().first().expect("instance"))
        .and_then(|s| s.steps().first().copied())
        .expect("generated step");
    let second_generated = corpus
        .scenario(*outline.scenarios().get(1).expect("instance"))
        .and_then(|s| s.steps().first().copied())
        .expect("generated step");

    let step = corpus.step_mut(first_generated).expect("generated step");
    step.value.push_str(" and more");
    if let Some(cell) = step
        .table
        .as_mut()
        .and_then(|t| t.rows_mut().first_mut())
        .and_then(|row| row.first_mut())
    {
        *cell = "changed".into();
    }

    let template = corpus.step(template_step).expect("template");
    assert_eq!(template.value, "I have <n> items");
    assert_eq!(
        template.table.as_ref().and_then(|t| t.cell(0, 0)),
        Some("<n>")
    );
    let sibling = corpus.step(second_generated).expect("sibling");
    assert_eq!(sibling.value, "I have 2 items");
    assert_eq!(sibling.table.as_ref().and_then(|t| t.cell(0, 0)), Some("2"));
}

#[rstest]
fn examples_without_rows_generate_nothing(mut corpus: Corpus) {
    let mut empty = examples(10, &["n"], &[]);
    empty.header = None;
    let event = outline(vec![empty, examples(20, &["n", "label"], &[])]);
    let id = build(&mut corpus, &event)
        .expect("outline builds")
        .expect("outline kept");
    let node = corpus.scenario(id).expect("outline");
    assert_eq!(node.examples().len(), 2);
    assert!(node.scenarios().is_empty());
    assert!(node.examples().first().expect("block").header.is_empty());
}

#[rstest]
fn ragged_examples_row_is_an_error(mut corpus: Corpus) {
    let event = outline(vec![examples(10, &["n", "label"], &[&["1", "one"], &["2"]])]);
    let err = build(&mut corpus, &event).expect_err("ragged row must fail");
    assert_eq!(
        err,
        BuildError::RaggedExamples {
            document: DOCUMENT.into(),
            line: 13,
            row: 1,
            expected: 2,
            found: 1,
        }
    );
}

#[rstest]
fn excluded_outline_is_skipped(mut corpus: Corpus) {
    let event = outline(vec![examples(10, &["n", "label"], &[&["1", "one"]])]);
    let policy = FilterPolicy::new(["outline"]);
    let mut scope = DocumentScope::new(&mut corpus, Path::new(DOCUMENT), &policy);
    let built = build_outline(&mut scope, &event, feature_id()).expect("filtering is not an error");
    assert!(built.is_none());
    assert_eq!(corpus.scenario_count(ScenarioKind::Example), 0);
    assert!(corpus.tags().is_empty());
}

#[rstest]
fn reports_placeholders_missing_from_the_header(mut corpus: Corpus) {
    let event = outline(vec![examples(10, &["n"], &[&["1"]])]);
    let id = build(&mut corpus, &event)
        .expect("outline builds")
        .expect("outline kept");
    let steps: Vec<Step> = corpus.steps_of(id).cloned().collect();

    let header = vec!["n".to_string()];
    assert_eq!(unmatched_placeholders(&steps, &header), ["label", "missing"]);
    let full = vec!["n".to_string(), "label".to_string(), "missing".to_string()];
    assert!(unmatched_placeholders(&steps, &full).is_empty());

    let instance = *corpus.scenario(id).expect("outline").scenarios().first().expect("instance");
    let values: Vec<_> = corpus.steps_of(instance).map(|s| s.value.clone()).collect();
    assert_eq!(values, ["I have 1 items", "I see <label>"]);
}
