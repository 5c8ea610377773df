//! Assembly of one parsed document into the graph.
//!
//! [`FeatureBuilder`] is the entry point: it builds the feature node,
//! applies the tag filter, and dispatches each child to the background,
//! scenario, or outline builder in document order.

use std::path::Path;

use tracing::{debug, info};

use crate::error::BuildError;
use crate::events::{ChildEvent, DocumentEvent, FeatureEvent};
use crate::filter::FilterPolicy;
use crate::graph::{Corpus, Feature, FeatureId, Header, NodeRef};
use crate::outline::build_outline;
use crate::scenario::{build_background, build_scenario};
use crate::step::join_comments;

/// Borrowed state shared by the builders while one document is processed.
pub(crate) struct DocumentScope<'a> {
    pub(crate) corpus: &'a mut Corpus,
    pub(crate) document: &'a Path,
    pub(crate) policy: &'a FilterPolicy,
}

impl<'a> DocumentScope<'a> {
    pub(crate) fn new(corpus: &'a mut Corpus, document: &'a Path, policy: &'a FilterPolicy) -> Self {
        Self {
            corpus,
            document,
            policy,
        }
    }
}

/// Builds the feature of one document into a [`Corpus`].
///
/// The first successful call to [`FeatureBuilder::assemble`] caches its
/// result; later calls return it without touching the corpus again. A
/// builder is meant to be used with a single corpus.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    document: DocumentEvent,
    policy: FilterPolicy,
    assembled: Option<Option<FeatureId>>,
}

impl FeatureBuilder {
    /// Create a builder for `document` using `policy` to filter nodes.
    #[must_use]
    pub fn new(document: DocumentEvent, policy: FilterPolicy) -> Self {
        Self {
            document,
            policy,
            assembled: None,
        }
    }

    /// The document being assembled.
    #[must_use]
    pub fn document(&self) -> &DocumentEvent {
        &self.document
    }

    /// Whether [`Self::assemble`] has already completed.
    #[must_use]
    pub fn is_assembled(&self) -> bool {
        self.assembled.is_some()
    }

    /// Build the document's feature into `corpus`.
    ///
    /// Returns `Ok(None)` when the document has no feature or the feature's
    /// tags are excluded; in the latter case nothing is recorded in the
    /// corpus, tags included.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when a table violates the rectangular
    /// invariant. The corpus then holds a partially built feature that the
    /// caller should discard, and the builder is not marked as assembled.
    pub fn assemble(&mut self, corpus: &mut Corpus) -> Result<Option<FeatureId>, BuildError> {
        if let Some(cached) = self.assembled {
            return Ok(cached);
        }
        let mut scope = DocumentScope::new(corpus, &self.document.path, &self.policy);
        let result = match self.document.feature.as_ref() {
            Some(feature) => assemble_feature(&mut scope, feature)?,
            None => {
                debug!(document = %self.document.path.display(), "document has no feature");
                None
            }
        };
        self.assembled = Some(result);
        Ok(result)
    }
}

/// Assemble `document` into `corpus` in one call.
///
/// # Errors
///
/// See [`FeatureBuilder::assemble`].
pub fn assemble_document(
    corpus: &mut Corpus,
    document: DocumentEvent,
    policy: FilterPolicy,
) -> Result<Option<FeatureId>, BuildError> {
    FeatureBuilder::new(document, policy).assemble(corpus)
}

fn assemble_feature(
    scope: &mut DocumentScope<'_>,
    event: &FeatureEvent,
) -> Result<Option<FeatureId>, BuildError> {
    if scope.policy.excludes_tags(&event.tags) {
        info!(
            document = %scope.document.display(),
            feature = %event.name,
            "feature excluded by tag filter"
        );
        return Ok(None);
    }

    let header = Header {
        name: feature_name(scope.document),
        keyword: event.keyword.clone(),
        value: event.name.clone(),
        description: event.description.clone(),
        comments: join_comments(&event.comments),
        file: scope.document.to_path_buf(),
        line: event.location.line,
    };
    let feature = scope.corpus.insert_feature(Feature::new(header));
    for tag in &event.tags {
        scope
            .corpus
            .resolve_tag(&tag.name, NodeRef::Feature(feature), scope.document);
    }

    for child in &event.children {
        match child {
            ChildEvent::Background(statement) => {
                build_background(scope, statement, feature)?;
            }
            ChildEvent::Scenario(statement) => {
                build_scenario(scope, statement, feature)?;
            }
            ChildEvent::ScenarioOutline(statement) => {
                build_outline(scope, statement, feature)?;
            }
        }
    }

    info!(
        document = %scope.document.display(),
        feature = %event.name,
        children = scope.corpus.feature(feature).map_or(0, |f| f.scenarios().len()),
        "assembled feature"
    );
    Ok(Some(feature))
}

/// Identifying name of a feature: its document's file stem.
fn feature_name(document: &Path) -> String {
    document
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::events::{Location, StatementEvent, StepEvent, TagEvent};
    use crate::graph::ScenarioKind;

    fn statement(line: usize, name: &str, tags: &[&str]) -> StatementEvent {
        StatementEvent {
            keyword: "Scenario".into(),
            name: name.into(),
            location: Location::new(line, 3),
            tags: tags
                .iter()
                .map(|t| TagEvent::new(*t, Location::new(line - 1, 3)))
                .collect(),
            steps: vec![StepEvent {
                keyword: "Given ".into(),
                text: format!("{name} step"),
                location: Location::new(line + 1, 5),
                ..StepEvent::default()
            }],
            ..StatementEvent::default()
        }
    }

    fn document(feature_tags: &[&str], children: Vec<ChildEvent>) -> DocumentEvent {
        DocumentEvent {
            path: PathBuf::from("features/shop.feature"),
            feature: Some(FeatureEvent {
                keyword: "Feature".into(),
                name: "Shop".into(),
                location: Location::new(2, 1),
                tags: feature_tags
                    .iter()
                    .map(|t| TagEvent::new(*t, Location::new(1, 1)))
                    .collect(),
                children,
                ..FeatureEvent::default()
            }),
        }
    }

    #[test]
    fn missing_feature_yields_none() {
        let mut corpus = Corpus::new();
        let doc = DocumentEvent {
            path: PathBuf::from("empty.feature"),
            feature: None,
        };
        let built = assemble_document(&mut corpus, doc, FilterPolicy::default())
            .expect("empty document is not an error");
        assert!(built.is_none());
        assert_eq!(corpus.feature_count(), 0);
    }

    #[test]
    fn builds_feature_and_children_in_order() {
        let mut corpus = Corpus::new();
        let mut background = statement(4, "bg", &[]);
        background.keyword = "Background".into();
        let doc = document(
            &["@shop"],
            vec![
                ChildEvent::Background(background),
                ChildEvent::Scenario(statement(8, "first", &[])),
                ChildEvent::Scenario(statement(12, "second", &["@slow"])),
            ],
        );

        let id = assemble_document(&mut corpus, doc, FilterPolicy::default())
            .expect("document builds")
            .expect("feature kept");
        let feature = corpus.feature(id).expect("feature stored");
        assert_eq!(feature.header.name, "shop");
        assert_eq!(feature.header.value, "Shop");
        assert_eq!(feature.header.location(), "features/shop.feature:2");
        assert!(feature.background().is_some());

        let values: Vec<_> = feature
            .scenarios()
            .iter()
            .map(|s| corpus.scenario(*s).expect("scenario").header.value.clone())
            .collect();
        assert_eq!(values, ["first", "second"]);
        let names: Vec<_> = feature
            .scenarios()
            .iter()
            .map(|s| corpus.scenario(*s).expect("scenario").header.name.clone())
            .collect();
        assert_eq!(names, ["scenario_0", "scenario_1"]);
        assert_eq!(corpus.tags_of(NodeRef::Feature(id)).count(), 1);
    }

    #[test]
    fn excluded_feature_records_nothing() {
        let mut corpus = Corpus::new();
        let doc = document(
            &["@wip", "@shop"],
            vec![ChildEvent::Scenario(statement(8, "first", &["@fast"]))],
        );
        let built = assemble_document(&mut corpus, doc, FilterPolicy::new(["wip"]))
            .expect("filtering is not an error");
        assert!(built.is_none());
        assert_eq!(corpus.feature_count(), 0);
        assert!(corpus.tags().is_empty());
    }

    #[test]
    fn excluded_scenario_leaves_siblings_intact() {
        let mut corpus = Corpus::new();
        let doc = document(
            &[],
            vec![
                ChildEvent::Scenario(statement(4, "kept", &[])),
                ChildEvent::Scenario(statement(8, "dropped", &["@wip"])),
                ChildEvent::Scenario(statement(12, "also kept", &["@fast"])),
            ],
        );
        let id = assemble_document(&mut corpus, doc, FilterPolicy::new(["@wip"]))
            .expect("document builds")
            .expect("feature kept");
        let feature = corpus.feature(id).expect("feature");
        assert_eq!(feature.scenarios().len(), 2);
        assert_eq!(corpus.scenario_count(ScenarioKind::Scenario), 2);
        assert!(corpus.tags().find("wip").is_none());
        assert!(corpus.tags().find("fast").is_some());
    }

    #[test]
    fn assemble_is_idempotent() {
        let mut corpus = Corpus::new();
        let doc = document(&["@shop"], vec![ChildEvent::Scenario(statement(4, "only", &[]))]);
        let mut builder = FeatureBuilder::new(doc, FilterPolicy::default());
        assert!(!builder.is_assembled());

        let first = builder.assemble(&mut corpus).expect("first assembly");
        let second = builder.assemble(&mut corpus).expect("second assembly");
        assert!(builder.is_assembled());
        assert_eq!(first, second);
        assert_eq!(corpus.feature_count(), 1);
        assert_eq!(corpus.scenario_count(ScenarioKind::Scenario), 1);
        let tag = corpus.tags().find("shop").expect("tag");
        assert_eq!(tag.occurrences().len(), 1);
    }
}
