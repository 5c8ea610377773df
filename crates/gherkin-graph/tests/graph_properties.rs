//! Behavioural tests for graphs built from real Gherkin documents.
#![expect(clippy::expect_used, reason = "behavioural tests use explicit panics")]

use gherkin_graph::{
    Corpus, FeatureId, FilterPolicy, NodeRef, ScenarioId, ScenarioKind, assemble_document,
    parse_document,
};
use rstest::rstest;

const SHOP: &str = concat!(
    "@shop @smoke\n",
    "Feature: Shopping basket\n",
    "  Background:\n",
    "    Given an empty basket\n",
    "\n",
    "  @fast\n",
    "  Scenario: add one item\n",
    "    When I add an apple\n",
    "    Then the basket holds 1 item\n",
    "\n",
    "  @wip\n",
    "  Scenario: unfinished\n",
    "    When I do something\n",
    "\n",
    "  Scenario Outline: add many\n",
    "    Given I have <n> items\n",
    "      | count | label   |\n",
    "      | <n>   | <label> |\n",
    "    Then I see <label>\n",
    "\n",
    "    Examples: small\n",
    "      | n | label |\n",
    "      | 1 | one   |\n",
    "      | 2 | two   |\n",
    "\n",
    "    Examples: large\n",
    "      | n  | label |\n",
    "      | 10 | ten   |\n",
);

const RETURNS: &str = concat!(
    "@smoke\n",
    "Feature: Returns\n",
    "  @fast\n",
    "  Scenario: return an item\n",
    "    Given a purchase\n",
);

fn build(corpus: &mut Corpus, path: &str, text: &str, policy: &FilterPolicy) -> Option<FeatureId> {
    let parsed = parse_document(path, text);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    assemble_document(corpus, parsed.document, policy.clone()).expect("document builds")
}

fn outline_of(corpus: &Corpus, feature: FeatureId) -> ScenarioId {
    corpus
        .feature(feature)
        .expect("feature")
        .scenarios()
        .iter()
        .copied()
        .find(|id| corpus.scenario(*id).is_some_and(|s| s.is_outline()))
        .expect("outline child")
}

#[test]
fn children_keep_document_order_and_background_is_separate() {
    let mut corpus = Corpus::new();
    let feature = build(&mut corpus, "features/shop.feature", SHOP, &FilterPolicy::default())
        .expect("feature kept");

    let node = corpus.feature(feature).expect("feature");
    assert_eq!(node.header.name, "shop");
    assert_eq!(node.header.value, "Shopping basket");
    let values: Vec<_> = node
        .scenarios()
        .iter()
        .map(|id| corpus.scenario(*id).expect("child").header.value.clone())
        .collect();
    assert_eq!(values, ["add one item", "unfinished", "add many"]);

    let background = corpus
        .scenario(node.background().expect("background"))
        .expect("background node");
    assert_eq!(background.kind, ScenarioKind::Background);
    assert_eq!(background.header.name, "background");
    assert!(!node.scenarios().contains(&node.background().expect("background")));
}

#[test]
fn every_step_points_back_to_its_container() {
    let mut corpus = Corpus::new();
    let feature = build(&mut corpus, "shop.feature", SHOP, &FilterPolicy::default())
        .expect("feature kept");
    let outline = outline_of(&corpus, feature);
    let mut containers = corpus.feature(feature).expect("feature").scenarios().to_vec();
    containers.extend_from_slice(corpus.scenario(outline).expect("outline").scenarios());

    for container in containers {
        let scenario = corpus.scenario(container).expect("container");
        for step in scenario.steps() {
            assert_eq!(corpus.step(*step).expect("step").scenario(), container);
        }
        assert_eq!(scenario.feature(), feature);
    }
}

#[test]
fn outline_expands_one_instance_per_row_across_blocks() {
    let mut corpus = Corpus::new();
    let feature = build(&mut corpus, "shop.feature", SHOP, &FilterPolicy::default())
        .expect("feature kept");
    let outline = corpus.scenario(outline_of(&corpus, feature)).expect("outline");

    assert_eq!(outline.examples().len(), 2);
    assert_eq!(outline.scenarios().len(), 3);
    assert_eq!(corpus.scenario_count(ScenarioKind::Example), 3);
    let values: Vec<_> = outline
        .scenarios()
        .iter()
        .map(|id| corpus.scenario(*id).expect("instance").header.value.clone())
        .collect();
    assert_eq!(values, ["add many (1)", "add many (2)", "add many (3)"]);

    let small = outline.examples().first().expect("small block");
    assert_eq!(small.name, "small");
    assert_eq!(small.row_map(1), Some(vec![("n", "2"), ("label", "two")]));
}

#[test]
fn placeholders_are_substituted_in_text_and_tables() {
    let mut corpus = Corpus::new();
    let feature = build(&mut corpus, "shop.feature", SHOP, &FilterPolicy::default())
        .expect("feature kept");
    let outline = corpus.scenario(outline_of(&corpus, feature)).expect("outline");
    let first = *outline.scenarios().first().expect("first instance");
    let third = *outline.scenarios().get(2).expect("third instance");

    let texts: Vec<_> = corpus.steps_of(first).map(|s| s.value.clone()).collect();
    assert_eq!(texts, ["I have 1 items", "I see one"]);

    let given = corpus.steps_of(third).next().expect("given step");
    assert_eq!(given.value, "I have 10 items");
    let table = given.table.as_ref().expect("table cloned");
    assert_eq!(table.cell(0, 0), Some("count"));
    assert_eq!(table.cell(1, 0), Some("10"));
    assert_eq!(table.cell(1, 1), Some("ten"));

    let template = corpus
        .steps_of(outline_of(&corpus, feature))
        .next()
        .expect("template step");
    assert_eq!(template.value, "I have <n> items");
    assert_eq!(template.table.as_ref().and_then(|t| t.cell(1, 0)), Some("<n>"));
}

#[test]
fn tags_are_shared_across_documents() {
    let mut corpus = Corpus::new();
    let policy = FilterPolicy::default();
    let shop = build(&mut corpus, "shop.feature", SHOP, &policy).expect("shop kept");
    let returns = build(&mut corpus, "returns.feature", RETURNS, &policy).expect("returns kept");

    let smoke = corpus.tags().find("@smoke").expect("smoke tag");
    assert_eq!(smoke.value(), "@smoke");
    assert_eq!(
        smoke.owners(),
        [NodeRef::Feature(shop), NodeRef::Feature(returns)]
    );
    let documents: Vec<_> = smoke
        .occurrences()
        .iter()
        .map(|o| o.document.display().to_string())
        .collect();
    assert_eq!(documents, ["shop.feature", "returns.feature"]);

    let fast = corpus.tags().find("fast").expect("fast tag");
    assert_eq!(fast.owners().len(), 2);
    assert_eq!(corpus.tags().iter().filter(|(_, t)| t.name() == "fast").count(), 1);
    for owner in fast.owners() {
        assert!(corpus.tags_of(*owner).any(|t| t.name() == "fast"));
    }
}

#[rstest]
#[case::plain("wip")]
#[case::with_marker("@wip")]
fn excluded_scenarios_leave_no_trace(#[case] excluded: &str) {
    let mut corpus = Corpus::new();
    let feature = build(&mut corpus, "shop.feature", SHOP, &FilterPolicy::new([excluded]))
        .expect("feature kept");

    let values: Vec<_> = corpus
        .feature(feature)
        .expect("feature")
        .scenarios()
        .iter()
        .map(|id| corpus.scenario(*id).expect("child").header.value.clone())
        .collect();
    assert_eq!(values, ["add one item", "add many"]);
    assert!(corpus.tags().find("wip").is_none());
    assert_eq!(corpus.scenario_count(ScenarioKind::Scenario), 1);
}

#[test]
fn excluded_feature_builds_nothing() {
    let mut corpus = Corpus::new();
    let built = build(&mut corpus, "shop.feature", SHOP, &FilterPolicy::new(["smoke"]));
    assert!(built.is_none());
    assert_eq!(corpus.feature_count(), 0);
    assert_eq!(corpus.scenario_count(ScenarioKind::Example), 0);
    assert!(corpus.tags().is_empty());
}

#[test]
fn corpus_serialises_to_json() {
    let mut corpus = Corpus::new();
    build(&mut corpus, "returns.feature", RETURNS, &FilterPolicy::default()).expect("kept");
    let json = serde_json::to_value(&corpus).expect("corpus serialises");
    assert_eq!(
        json.pointer("/features/0/name").and_then(|v| v.as_str()),
        Some("returns")
    );
    assert_eq!(
        json.pointer("/tags/tags/0/value").and_then(|v| v.as_str()),
        Some("@smoke")
    );
}
