//! The materialised document graph.
//!
//! Nodes live in flat arenas owned by a [`Corpus`] and refer to each other
//! through typed ids. Ownership edges (feature to scenarios, scenario to
//! steps, outline to instances) are id lists on the owner; back-references
//! (step to scenario, scenario to feature) are plain ids and never keep a
//! node alive on their own. One corpus spans a whole run so that tags can be
//! shared between documents.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::table::DataTable;
use crate::tags::{Tag, TagOccurrence, TagRegistry};

macro_rules! node_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the node in its arena.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }
        }
    };
}

node_id!(
    /// Identifier of a [`Feature`] within a [`Corpus`].
    FeatureId
);
node_id!(
    /// Identifier of a [`Scenario`] within a [`Corpus`].
    ScenarioId
);
node_id!(
    /// Identifier of a [`Step`] within a [`Corpus`].
    StepId
);
node_id!(
    /// Identifier of a [`Tag`] within a [`Corpus`].
    TagId
);

/// A node that can own tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeRef {
    /// A feature node.
    Feature(FeatureId),
    /// A scenario-like node.
    Scenario(ScenarioId),
}

/// What a [`Scenario`] node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// The feature background.
    Background,
    /// A plain scenario.
    Scenario,
    /// A scenario outline template.
    Outline,
    /// A concrete scenario generated from one examples row.
    Example,
}

/// Display attributes shared by features, scenarios, and examples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Identifying name, unique among siblings.
    pub name: String,
    /// Keyword as written in the source.
    pub keyword: String,
    /// Display title.
    pub value: String,
    /// Free-text description.
    pub description: String,
    /// Comment block, one comment per line.
    pub comments: String,
    /// Source document.
    pub file: PathBuf,
    /// 1-based source line.
    pub line: usize,
}

impl Header {
    /// `file:line` reference for cross-linking.
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}:{}", self.file.display(), self.line)
    }
}

/// Root node of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    /// Display attributes.
    #[serde(flatten)]
    pub header: Header,
    tags: Vec<TagId>,
    scenarios: Vec<ScenarioId>,
    background: Option<ScenarioId>,
}

impl Feature {
    pub(crate) fn new(header: Header) -> Self {
        Self {
            header,
            tags: Vec::new(),
            scenarios: Vec::new(),
            background: None,
        }
    }

    /// Tags in declaration order.
    #[must_use]
    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }

    /// Scenarios and outlines in document order.
    #[must_use]
    pub fn scenarios(&self) -> &[ScenarioId] {
        &self.scenarios
    }

    /// The background, when the feature declares one.
    #[must_use]
    pub fn background(&self) -> Option<ScenarioId> {
        self.background
    }
}

/// One examples table of an outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Examples {
    /// Keyword as written.
    pub keyword: String,
    /// Optional title.
    pub name: String,
    /// Comment block.
    pub comments: String,
    /// 1-based source line.
    pub line: usize,
    /// Column names.
    pub header: Vec<String>,
    /// Data rows, each as wide as `header`.
    pub rows: Vec<Vec<String>>,
    scenarios: Vec<ScenarioId>,
}

impl Examples {
    pub(crate) fn new(
        keyword: String,
        name: String,
        comments: String,
        line: usize,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            keyword,
            name,
            comments,
            line,
            header,
            rows,
            scenarios: Vec::new(),
        }
    }

    /// Scenarios generated from this block, one per data row.
    #[must_use]
    pub fn scenarios(&self) -> &[ScenarioId] {
        &self.scenarios
    }

    /// Pair each header column with its value in data row `row`.
    ///
    /// Cells missing from a short row map to the empty string.
    #[must_use]
    pub fn row_map(&self, row: usize) -> Option<Vec<(&str, &str)>> {
        let values = self.rows.get(row)?;
        Some(
            self.header
                .iter()
                .enumerate()
                .map(|(idx, column)| {
                    (
                        column.as_str(),
                        values.get(idx).map_or("", String::as_str),
                    )
                })
                .collect(),
        )
    }
}

/// A scenario-like node: background, scenario, outline, or outline instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    /// Display attributes.
    #[serde(flatten)]
    pub header: Header,
    /// What the node stands for.
    pub kind: ScenarioKind,
    tags: Vec<TagId>,
    steps: Vec<StepId>,
    scenarios: Vec<ScenarioId>,
    examples: Vec<Examples>,
    feature: FeatureId,
    outline: Option<ScenarioId>,
}

impl Scenario {
    pub(crate) fn new(header: Header, kind: ScenarioKind, feature: FeatureId) -> Self {
        Self {
            header,
            kind,
            tags: Vec::new(),
            steps: Vec::new(),
            scenarios: Vec::new(),
            examples: Vec::new(),
            feature,
            outline: None,
        }
    }

    /// Tags in declaration order.
    #[must_use]
    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }

    /// Steps in document order.
    #[must_use]
    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }

    /// Generated instances; only outlines have any.
    #[must_use]
    pub fn scenarios(&self) -> &[ScenarioId] {
        &self.scenarios
    }

    /// Examples blocks; only outlines have any.
    #[must_use]
    pub fn examples(&self) -> &[Examples] {
        &self.examples
    }

    /// The feature this node belongs to.
    #[must_use]
    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    /// The outline an instance was generated from.
    #[must_use]
    pub fn outline(&self) -> Option<ScenarioId> {
        self.outline
    }

    /// Whether this node is an outline template.
    #[must_use]
    pub fn is_outline(&self) -> bool {
        self.kind == ScenarioKind::Outline
    }
}

/// One step line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Local key within the owning scenario (`step_<line>`).
    pub name: String,
    /// Keyword as written, including `And`/`But`.
    pub keyword: String,
    /// Step text.
    pub value: String,
    /// Comment block.
    pub comments: String,
    /// Source document.
    pub file: PathBuf,
    /// 1-based source line.
    pub line: usize,
    /// Attached doc string.
    pub docstring: Option<String>,
    /// Attached data table.
    pub table: Option<DataTable>,
    scenario: ScenarioId,
}

impl Step {
    /// The scenario owning this step.
    #[must_use]
    pub fn scenario(&self) -> ScenarioId {
        self.scenario
    }

    /// Whether a doc string is attached.
    #[must_use]
    pub fn has_docstring(&self) -> bool {
        self.docstring.is_some()
    }

    /// Whether a data table is attached.
    #[must_use]
    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }
}

/// Attributes for a step that is about to be attached.
#[derive(Debug, Clone, Default)]
pub(crate) struct StepDraft {
    pub(crate) name: String,
    pub(crate) keyword: String,
    pub(crate) value: String,
    pub(crate) comments: String,
    pub(crate) file: PathBuf,
    pub(crate) line: usize,
    pub(crate) docstring: Option<String>,
    pub(crate) table: Option<DataTable>,
}

/// All nodes and tags built during one run.
#[derive(Debug, Default, Serialize)]
pub struct Corpus {
    features: Vec<Feature>,
    scenarios: Vec<Scenario>,
    steps: Vec<Step>,
    tags: TagRegistry,
}

impl Corpus {
    /// Create an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a feature.
    #[must_use]
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.0)
    }

    /// Look up a scenario-like node.
    #[must_use]
    pub fn scenario(&self, id: ScenarioId) -> Option<&Scenario> {
        self.scenarios.get(id.0)
    }

    /// Look up a step.
    #[must_use]
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.get(id.0)
    }

    /// Mutable access to a step's own attributes.
    pub fn step_mut(&mut self, id: StepId) -> Option<&mut Step> {
        self.steps.get_mut(id.0)
    }

    /// Look up a tag.
    #[must_use]
    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(id)
    }

    /// The run-wide tag registry.
    #[must_use]
    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Features in build order.
    pub fn features(&self) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.features
            .iter()
            .enumerate()
            .map(|(idx, feature)| (FeatureId(idx), feature))
    }

    /// Number of features built.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Number of scenario-like nodes of the given kind.
    #[must_use]
    pub fn scenario_count(&self, kind: ScenarioKind) -> usize {
        self.scenarios.iter().filter(|s| s.kind == kind).count()
    }

    /// Steps of a scenario, in order.
    pub fn steps_of(&self, id: ScenarioId) -> impl Iterator<Item = &Step> {
        self.scenario(id)
            .map(Scenario::steps)
            .unwrap_or_default()
            .iter()
            .filter_map(|step| self.step(*step))
    }

    /// Tags of a feature or scenario, in order.
    pub fn tags_of(&self, node: NodeRef) -> impl Iterator<Item = &Tag> {
        let ids = match node {
            NodeRef::Feature(id) => self.feature(id).map(Feature::tags),
            NodeRef::Scenario(id) => self.scenario(id).map(Scenario::tags),
        };
        ids.unwrap_or_default()
            .iter()
            .filter_map(|tag| self.tag(*tag))
    }

    /// Source line of a tag owner, used for occurrence records.
    fn node_line(&self, node: NodeRef) -> usize {
        match node {
            NodeRef::Feature(id) => self.feature(id).map_or(0, |f| f.header.line),
            NodeRef::Scenario(id) => self.scenario(id).map_or(0, |s| s.header.line),
        }
    }

    /// Resolve a tag for `owner`, keeping both sides of the link in step.
    pub(crate) fn resolve_tag(&mut self, raw: &str, owner: NodeRef, document: &Path) -> TagId {
        let occurrence = TagOccurrence {
            document: document.to_path_buf(),
            line: self.node_line(owner),
        };
        let id = self.tags.resolve(raw, owner, occurrence);
        let list = match owner {
            NodeRef::Feature(f) => self.features.get_mut(f.0).map(|f| &mut f.tags),
            NodeRef::Scenario(s) => self.scenarios.get_mut(s.0).map(|s| &mut s.tags),
        };
        if let Some(list) = list {
            if !list.contains(&id) {
                list.push(id);
            }
        }
        id
    }

    pub(crate) fn insert_feature(&mut self, feature: Feature) -> FeatureId {
        let id = FeatureId(self.features.len());
        self.features.push(feature);
        id
    }

    pub(crate) fn insert_scenario(&mut self, scenario: Scenario) -> ScenarioId {
        let id = ScenarioId(self.scenarios.len());
        self.scenarios.push(scenario);
        id
    }

    /// Append a scenario or outline to its feature's children.
    pub(crate) fn push_child(&mut self, feature: FeatureId, scenario: ScenarioId) {
        if let Some(feature) = self.features.get_mut(feature.0) {
            feature.scenarios.push(scenario);
        }
    }

    pub(crate) fn set_background(&mut self, feature: FeatureId, background: ScenarioId) {
        if let Some(feature) = self.features.get_mut(feature.0) {
            feature.background = Some(background);
        }
    }

    /// Create a step owned by `container` and append it to its step list.
    pub(crate) fn attach_step(&mut self, container: ScenarioId, draft: StepDraft) -> StepId {
        let id = StepId(self.steps.len());
        self.steps.push(Step {
            name: draft.name,
            keyword: draft.keyword,
            value: draft.value,
            comments: draft.comments,
            file: draft.file,
            line: draft.line,
            docstring: draft.docstring,
            table: draft.table,
            scenario: container,
        });
        if let Some(scenario) = self.scenarios.get_mut(container.0) {
            scenario.steps.push(id);
        }
        id
    }

    /// Append an examples block to an outline, returning its index.
    pub(crate) fn push_examples(&mut self, outline: ScenarioId, examples: Examples) -> usize {
        match self.scenarios.get_mut(outline.0) {
            Some(scenario) => {
                scenario.examples.push(examples);
                scenario.examples.len().saturating_sub(1)
            }
            None => 0,
        }
    }

    /// Register a generated instance on its outline and examples block.
    pub(crate) fn push_instance(&mut self, outline: ScenarioId, block: usize, instance: ScenarioId) {
        if let Some(node) = self.scenarios.get_mut(instance.0) {
            node.outline = Some(outline);
        }
        if let Some(scenario) = self.scenarios.get_mut(outline.0) {
            scenario.scenarios.push(instance);
            if let Some(examples) = scenario.examples.get_mut(block) {
                examples.scenarios.push(instance);
            }
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;

    fn header(line: usize) -> Header {
        Header {
            name: "demo".into(),
            file: PathBuf::from("demo.feature"),
            line,
            ..Header::default()
        }
    }

    #[test]
    fn tag_links_are_symmetric_and_deduplicated() {
        let mut corpus = Corpus::new();
        let feature = corpus.insert_feature(Feature::new(header(2)));
        let doc = Path::new("demo.feature");

        let first = corpus.resolve_tag("@smoke", NodeRef::Feature(feature), doc);
        let again = corpus.resolve_tag("smoke", NodeRef::Feature(feature), doc);
        assert_eq!(first, again);

        let node = corpus.feature(feature).expect("feature exists");
        assert_eq!(node.tags(), &[first]);

        let tag = corpus.tag(first).expect("tag exists");
        assert_eq!(tag.owners(), &[NodeRef::Feature(feature)]);
        assert_eq!(tag.occurrences().len(), 2);
        assert!(tag.occurrences().iter().all(|o| o.line == 2));
    }

    #[test]
    fn attached_steps_link_back_to_container() {
        let mut corpus = Corpus::new();
        let feature = corpus.insert_feature(Feature::new(header(1)));
        let scenario = corpus.insert_scenario(Scenario::new(
            header(3),
            ScenarioKind::Scenario,
            feature,
        ));
        let step = corpus.attach_step(
            scenario,
            StepDraft {
                name: "step_4".into(),
                value: "a step".into(),
                line: 4,
                ..StepDraft::default()
            },
        );
        assert_eq!(corpus.step(step).expect("step").scenario(), scenario);
        assert_eq!(corpus.steps_of(scenario).count(), 1);
    }

    #[test]
    fn row_map_pads_missing_cells() {
        let examples = Examples::new(
            "Examples".into(),
            String::new(),
            String::new(),
            9,
            vec!["a".into(), "b".into()],
            vec![vec!["x".into()]],
        );
        assert_eq!(examples.row_map(0), Some(vec![("a", "x"), ("b", "")]));
        assert_eq!(examples.row_map(1), None);
    }
}
