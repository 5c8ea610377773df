//! Construction of backgrounds, scenarios, and outline templates.
//!
//! The node being built is the step container for the statement's steps.
//! It is passed explicitly to [`build_step`] rather than kept as ambient
//! state, so steps can only ever land on the statement that declared them.

use tracing::{debug, warn};

use crate::assembler::DocumentScope;
use crate::error::BuildError;
use crate::events::StatementEvent;
use crate::graph::{FeatureId, Header, NodeRef, Scenario, ScenarioId, ScenarioKind};
use crate::step::{build_step, join_comments};

/// Identifying name given to every background.
pub(crate) const BACKGROUND_NAME: &str = "background";

/// Create a scenario-like node, resolve its tags, and build its steps.
pub(crate) fn build_statement(
    scope: &mut DocumentScope<'_>,
    event: &StatementEvent,
    feature: FeatureId,
    kind: ScenarioKind,
    name: String,
) -> Result<ScenarioId, BuildError> {
    let header = Header {
        name,
        keyword: event.keyword.clone(),
        value: event.name.clone(),
        description: event.description.clone(),
        comments: join_comments(&event.comments),
        file: scope.document.to_path_buf(),
        line: event.location.line,
    };
    let container = scope
        .corpus
        .insert_scenario(Scenario::new(header, kind, feature));

    for tag in &event.tags {
        scope
            .corpus
            .resolve_tag(&tag.name, NodeRef::Scenario(container), scope.document);
    }
    for step in &event.steps {
        build_step(scope, step, container)?;
    }
    Ok(container)
}

/// Build the feature background.
///
/// Backgrounds are never filtered. A second background replaces the first.
pub(crate) fn build_background(
    scope: &mut DocumentScope<'_>,
    event: &StatementEvent,
    feature: FeatureId,
) -> Result<ScenarioId, BuildError> {
    let background = build_statement(
        scope,
        event,
        feature,
        ScenarioKind::Background,
        BACKGROUND_NAME.to_string(),
    )?;
    let previous = scope
        .corpus
        .feature(feature)
        .and_then(|node| node.background());
    if previous.is_some() {
        warn!(
            document = %scope.document.display(),
            line = event.location.line,
            "feature declares more than one background; keeping the last"
        );
    }
    scope.corpus.set_background(feature, background);
    debug!(line = event.location.line, "built background");
    Ok(background)
}

/// Build a plain scenario, or skip it when its tags are excluded.
pub(crate) fn build_scenario(
    scope: &mut DocumentScope<'_>,
    event: &StatementEvent,
    feature: FeatureId,
) -> Result<Option<ScenarioId>, BuildError> {
    if scope.policy.excludes_tags(&event.tags) {
        debug!(line = event.location.line, name = %event.name, "scenario excluded by tag filter");
        return Ok(None);
    }
    let name = child_name(scope, feature);
    let scenario = build_statement(scope, event, feature, ScenarioKind::Scenario, name)?;
    scope.corpus.push_child(feature, scenario);
    debug!(line = event.location.line, name = %event.name, "built scenario");
    Ok(Some(scenario))
}

/// Identifying name for the next feature child.
pub(crate) fn child_name(scope: &DocumentScope<'_>, feature: FeatureId) -> String {
    let position = scope
        .corpus
        .feature(feature)
        .map_or(0, |node| node.scenarios().len());
    format!("scenario_{position}")
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::events::{Location, StepEvent, TagEvent};
    use crate::filter::FilterPolicy;
    use crate::graph::{Corpus, Feature};

    fn feature(corpus: &mut Corpus) -> FeatureId {
        corpus.insert_feature(Feature::new(Header {
            file: "s.feature".into(),
            line: 1,
            ..Header::default()
        }))
    }

    fn statement(line: usize, tags: &[&str]) -> StatementEvent {
        StatementEvent {
            keyword: "Scenario".into(),
            name: format!("at {line}"),
            description: "why".into(),
            location: Location::new(line, 3),
            tags: tags
                .iter()
                .map(|t| TagEvent::new(*t, Location::new(line.saturating_sub(1), 3)))
                .collect(),
            steps: vec![
                StepEvent {
                    keyword: "Given ".into(),
                    text: "one".into(),
                    location: Location::new(line + 1, 5),
                    ..StepEvent::default()
                },
                StepEvent {
                    keyword: "Then ".into(),
                    text: "two".into(),
                    location: Location::new(line + 2, 5),
                    ..StepEvent::default()
                },
            ],
            ..StatementEvent::default()
        }
    }

    #[test]
    fn scenario_collects_steps_tags_and_links_feature() {
        let mut corpus = Corpus::new();
        let feature = feature(&mut corpus);
        let policy = FilterPolicy::default();
        let mut scope = DocumentScope::new(&mut corpus, Path::new("s.feature"), &policy);

        let id = build_scenario(&mut scope, &statement(4, &["@fast"]), feature)
            .expect("scenario builds")
            .expect("scenario not excluded");

        let scenario = corpus.scenario(id).expect("scenario stored");
        assert_eq!(scenario.header.name, "scenario_0");
        assert_eq!(scenario.header.value, "at 4");
        assert_eq!(scenario.header.description, "why");
        assert_eq!(scenario.kind, ScenarioKind::Scenario);
        assert_eq!(scenario.feature(), feature);
        assert_eq!(scenario.steps().len(), 2);
        let values: Vec<_> = corpus.steps_of(id).map(|s| s.value.as_str()).collect();
        assert_eq!(values, ["one", "two"]);

        let tag = corpus.tags().find("fast").expect("tag resolved");
        assert_eq!(tag.owners(), &[NodeRef::Scenario(id)]);
        assert_eq!(tag.occurrences().first().map(|o| o.line), Some(4));
        assert_eq!(corpus.feature(feature).expect("feature").scenarios(), &[id]);
    }

    #[test]
    fn excluded_scenario_is_silently_dropped() {
        let mut corpus = Corpus::new();
        let feature = feature(&mut corpus);
        let policy = FilterPolicy::new(["wip"]);
        let mut scope = DocumentScope::new(&mut corpus, Path::new("s.feature"), &policy);

        let built = build_scenario(&mut scope, &statement(4, &["@wip"]), feature)
            .expect("filtering is not an error");
        assert!(built.is_none());
        assert!(corpus.tags().is_empty());
        assert!(corpus.feature(feature).expect("feature").scenarios().is_empty());
        assert_eq!(corpus.scenario_count(ScenarioKind::Scenario), 0);
    }

    #[test]
    fn background_ignores_filter_and_links_feature() {
        let mut corpus = Corpus::new();
        let feature = feature(&mut corpus);
        let policy = FilterPolicy::new(["wip"]);
        let mut scope = DocumentScope::new(&mut corpus, Path::new("s.feature"), &policy);
        let mut event = statement(2, &[]);
        event.keyword = "Background".into();

        let id = build_background(&mut scope, &event, feature).expect("background builds");
        let node = corpus.feature(feature).expect("feature");
        assert_eq!(node.background(), Some(id));
        assert!(node.scenarios().is_empty());
        let background = corpus.scenario(id).expect("background stored");
        assert_eq!(background.header.name, BACKGROUND_NAME);
        assert_eq!(background.kind, ScenarioKind::Background);
        assert_eq!(background.steps().len(), 2);
    }
}
