//! Tests for building parse events from Gherkin text.

use super::*;
use tempfile::TempDir;

fn feature_of(parsed: &ParsedDocument) -> &FeatureEvent {
    parsed
        .document
        .feature
        .as_ref()
        .expect("feature should parse")
}

#[test]
fn converts_feature_children_steps_and_arguments() {
    let parsed = parse_document(
        "demo.feature",
        concat!(
            "@shop\n",
            "Feature: demo\n",
            "  Background:\n",
            "    Given a shop\n",
            "  Scenario: plain\n",
            "    Given a message\n",
            "      \"\"\"\n",
            "      hello\n",
            "      \"\"\"\n",
            "  Scenario Outline: outline\n",
            "    When numbers\n",
            "      | a | b |\n",
            "      | 1 | <n> |\n",
            "    Then result is <n>\n",
            "    Examples:\n",
            "      | n |\n",
            "      | 1 |\n",
            "      | 2 |\n",
        ),
    );
    assert!(parsed.diagnostics.is_empty());
    let feature = feature_of(&parsed);
    assert_eq!(feature.name, "demo");
    assert_eq!(feature.location.line, 2);
    assert_eq!(
        feature.tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        ["@shop"]
    );
    assert_eq!(feature.children.len(), 3);

    let Some(ChildEvent::Background(background)) = feature.children.first() else {
        panic!("expected background first");
    };
    assert_eq!(background.steps.len(), 1);

    let Some(ChildEvent::Scenario(plain)) = feature.children.get(1) else {
        panic!("expected plain scenario second");
    };
    let step = plain.steps.first().expect("step");
    assert_eq!(step.keyword.trim(), "Given");
    assert_eq!(step.location.line, 6);
    let Some(MultilineArgument::DocString { content, .. }) = step.argument.as_ref() else {
        panic!("expected doc string argument");
    };
    assert!(content.contains("hello"));

    let Some(ChildEvent::ScenarioOutline(outline)) = feature.children.get(2) else {
        panic!("expected outline third");
    };
    let when = outline.steps.first().expect("when step");
    let Some(MultilineArgument::DataTable { rows, location }) = when.argument.as_ref() else {
        panic!("expected data table argument");
    };
    assert_eq!(location.line, 12);
    assert_eq!(
        rows.iter().map(RowEvent::values).collect::<Vec<_>>(),
        [vec!["a", "b"], vec!["1", "<n>"]]
    );
    assert_eq!(rows.get(1).map(|r| r.location.line), Some(13));

    let examples = outline.examples.first().expect("examples block");
    assert_eq!(
        examples.header.as_ref().map(RowEvent::values),
        Some(vec!["n".to_string()])
    );
    assert_eq!(examples.body.len(), 2);
    assert_eq!(examples.body.first().map(|r| r.location.line), Some(17));
}

#[test]
fn recovers_comment_blocks_above_keywords() {
    let parsed = parse_document(
        "comments.feature",
        concat!(
            "# owned by the shop team\n",
            "@shop\n",
            "Feature: commented\n",
            "\n",
            "  # checks the basket\n",
            "  # twice\n",
            "  Scenario: basket\n",
            "    Given a basket\n",
        ),
    );
    let feature = feature_of(&parsed);
    assert_eq!(feature.comments, ["# owned by the shop team"]);
    let scenario = feature.children.first().expect("scenario").statement();
    assert_eq!(scenario.comments, ["# checks the basket", "# twice"]);
    assert!(scenario.steps.first().expect("step").comments.is_empty());
}

#[test]
fn rule_scenarios_are_flattened_with_rule_tags() {
    let parsed = parse_document(
        "rules.feature",
        concat!(
            "Feature: rules\n",
            "  Scenario: before\n",
            "    Given one\n",
            "  @ruled\n",
            "  Rule: grouped\n",
            "    @own\n",
            "    Scenario: inside\n",
            "      Given two\n",
        ),
    );
    let feature = feature_of(&parsed);
    let names: Vec<_> = feature
        .children
        .iter()
        .map(|child| child.statement().name.as_str())
        .collect();
    assert_eq!(names, ["before", "inside"]);
    let inside = feature.children.get(1).expect("rule scenario").statement();
    let tags: Vec<_> = inside.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tags, ["@ruled", "@own"]);
}

#[test]
fn syntax_errors_become_diagnostics() {
    let parsed = parse_document("broken.feature", "Scenario: orphan\n  Given nothing\n");
    assert!(parsed.document.feature.is_none());
    let diagnostic = parsed.diagnostics.first().expect("diagnostic reported");
    assert_eq!(diagnostic.path, PathBuf::from("broken.feature"));
    assert!(!diagnostic.message.is_empty());
}

#[test]
fn blank_documents_have_no_feature_and_no_diagnostics() {
    let parsed = parse_document("blank.feature", "  \n\n");
    assert!(parsed.document.feature.is_none());
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn load_document_reads_from_disk() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("disk.feature");
    std::fs::write(&path, "Feature: disk\n  Scenario: s\n    Given a file").expect("write feature");

    let parsed = load_document(&path).expect("load feature");
    assert_eq!(parsed.document.path, path);
    assert_eq!(feature_of(&parsed).children.len(), 1);
}

#[test]
fn load_document_reports_missing_files() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("missing.feature");
    let err = load_document(&path).expect_err("missing file must fail");
    assert!(err.to_string().contains("missing.feature"));
}

#[test]
fn merge_tags_keeps_first_spelling_and_order() {
    let base = vec!["a".to_string(), "b".to_string()];
    let extra = vec!["b".to_string(), "c".to_string()];
    assert_eq!(merge_tags(&base, &extra), ["a", "b", "c"]);
}

#[test]
fn table_start_skips_to_first_pipe_row() {
    let text = "Feature: x\n  Scenario: y\n    Given z\n\n      | a |\n";
    let source = FeatureSource::new(text);
    let offset = text.find("Given z").map_or(0, |idx| idx + "Given z".len());
    assert_eq!(source.table_start(offset), Location::new(5, 7));
}

#[test]
fn comment_scan_stops_at_language_header() {
    let text = "# language: en\n# shop\n@tag\nFeature: x\n";
    let source = FeatureSource::new(text);
    assert_eq!(source.comments_before(4), ["# shop"]);
}

#[test]
fn table_rows_after_comments_keep_their_own_lines() {
    let parsed = parse_document(
        "noted.feature",
        concat!(
            "Feature: noted\n",
            "  Scenario Outline: o\n",
            "    Given <n>\n",
            "    Examples:\n",
            "      | n |\n",
            "      # note\n",
            "      | 1 |\n",
            "      # another\n",
            "      | 2 |\n",
        ),
    );
    let feature = feature_of(&parsed);
    let outline = feature.children.first().expect("outline").statement();
    let examples = outline.examples.first().expect("examples block");
    assert_eq!(examples.header.as_ref().map(|r| r.location.line), Some(5));
    let lines: Vec<_> = examples.body.iter().map(|r| r.location.line).collect();
    assert_eq!(lines, [7, 9]);
}

#[test]
fn row_scan_skips_comment_and_blank_lines() {
    let text = "| a |\n  # note\n\n  | b |\n";
    let source = FeatureSource::new(text);
    assert_eq!(source.row_from(2), Some(Location::new(4, 3)));
    assert_eq!(source.row_from(5), None);
}
