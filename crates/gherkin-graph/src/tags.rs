//! Run-wide tag registry.
//!
//! Tags are shared between every document processed into one
//! [`Corpus`](crate::graph::Corpus): two occurrences of `@wip` in different
//! files resolve to the same [`Tag`]. Each resolution records where the tag
//! was seen and which node owns it. Nothing is ever removed.
//!
//! The registry is mutated through `&mut` only. A caller that processes
//! documents on several threads must wrap the corpus in a single lock and
//! hold it for each document so occurrence lists stay in insertion order.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::graph::{NodeRef, TagId};

/// Marker that introduces a tag in Gherkin source.
pub const TAG_MARKER: char = '@';

/// Strip surrounding whitespace and a leading `@` from a raw tag.
///
/// # Examples
///
/// ```
/// use gherkin_graph::tags::canonical_name;
///
/// assert_eq!(canonical_name("@smoke"), "smoke");
/// assert_eq!(canonical_name("smoke"), "smoke");
/// ```
#[must_use]
pub fn canonical_name(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix(TAG_MARKER).unwrap_or(trimmed)
}

/// One place a tag was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOccurrence {
    /// Document containing the owning node.
    pub document: PathBuf,
    /// Line of the owning node.
    pub line: usize,
}

/// A tag shared across the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    name: String,
    value: String,
    owners: Vec<NodeRef>,
    occurrences: Vec<TagOccurrence>,
}

impl Tag {
    fn new(name: &str, raw: &str) -> Self {
        let value = if raw.trim_start().starts_with(TAG_MARKER) {
            raw.trim().to_string()
        } else {
            format!("{TAG_MARKER}{name}")
        };
        Self {
            name: name.to_string(),
            value,
            owners: Vec::new(),
            occurrences: Vec::new(),
        }
    }

    /// Canonical name without the marker.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source spelling, marker included, of the first occurrence.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Distinct nodes carrying this tag, in first-seen order.
    #[must_use]
    pub fn owners(&self) -> &[NodeRef] {
        &self.owners
    }

    /// Every recorded occurrence in resolution order.
    #[must_use]
    pub fn occurrences(&self) -> &[TagOccurrence] {
        &self.occurrences
    }
}

/// Find-or-create store of [`Tag`]s keyed by canonical name.
#[derive(Debug, Default, Serialize)]
pub struct TagRegistry {
    tags: Vec<Tag>,
    #[serde(skip)]
    by_name: HashMap<String, TagId>,
}

impl TagRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find or create the tag for `raw` and record `owner` and `occurrence`.
    ///
    /// The occurrence is always appended. The owner is only added when it is
    /// not already present. Callers must also add the returned id to the
    /// owner's tag list; [`Corpus`](crate::graph::Corpus) does both.
    pub fn resolve(&mut self, raw: &str, owner: NodeRef, occurrence: TagOccurrence) -> TagId {
        let name = canonical_name(raw);
        let id = match self.by_name.get(name) {
            Some(id) => *id,
            None => {
                let id = TagId(self.tags.len());
                self.tags.push(Tag::new(name, raw));
                self.by_name.insert(name.to_string(), id);
                tracing::trace!(tag = name, "registered tag");
                id
            }
        };
        if let Some(tag) = self.tags.get_mut(id.0) {
            tag.occurrences.push(occurrence);
            if !tag.owners.contains(&owner) {
                tag.owners.push(owner);
            }
        }
        id
    }

    /// Look up a tag by id.
    #[must_use]
    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(id.0)
    }

    /// Look up a tag by name, with or without the marker.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Tag> {
        self.find_id(name).and_then(|id| self.get(id))
    }

    /// Look up a tag id by name, with or without the marker.
    #[must_use]
    pub fn find_id(&self, name: &str) -> Option<TagId> {
        self.by_name.get(canonical_name(name)).copied()
    }

    /// Tags in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (TagId, &Tag)> {
        self.tags.iter().enumerate().map(|(idx, tag)| (TagId(idx), tag))
    }

    /// Tags ordered by canonical name.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Tag> {
        let mut tags: Vec<_> = self.tags.iter().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    /// Number of distinct tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no tag has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use crate::graph::{FeatureId, ScenarioId};
    use rstest::rstest;

    fn seen(document: &str, line: usize) -> TagOccurrence {
        TagOccurrence {
            document: PathBuf::from(document),
            line,
        }
    }

    #[rstest]
    #[case("@smoke", "smoke")]
    #[case("smoke", "smoke")]
    #[case("  @smoke ", "smoke")]
    #[case("@@double", "@double")]
    fn canonical_name_strips_one_marker(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canonical_name(raw), expected);
    }

    #[test]
    fn resolving_same_name_returns_same_tag() {
        let mut registry = TagRegistry::new();
        let feature = NodeRef::Feature(FeatureId(0));
        let scenario = NodeRef::Scenario(ScenarioId(3));

        let first = registry.resolve("@smoke", feature, seen("a.feature", 1));
        let second = registry.resolve("smoke", scenario, seen("b.feature", 4));
        let third = registry.resolve("@smoke", scenario, seen("b.feature", 4));

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(registry.len(), 1);

        let tag = registry.get(first).expect("tag registered");
        assert_eq!(tag.owners(), &[feature, scenario]);
        assert_eq!(tag.occurrences().len(), 3);
        assert_eq!(tag.value(), "@smoke");
    }

    #[test]
    fn first_spelling_is_kept_as_value() {
        let mut registry = TagRegistry::new();
        let owner = NodeRef::Feature(FeatureId(0));
        let id = registry.resolve("wip", owner, seen("a.feature", 1));
        registry.resolve("@wip", owner, seen("a.feature", 1));
        let tag = registry.get(id).expect("tag registered");
        assert_eq!(tag.value(), "@wip");
        assert_eq!(tag.name(), "wip");
    }

    #[test]
    fn find_accepts_marker_or_bare_name() {
        let mut registry = TagRegistry::new();
        registry.resolve("@slow", NodeRef::Feature(FeatureId(0)), seen("a.feature", 1));
        assert!(registry.find("@slow").is_some());
        assert!(registry.find("slow").is_some());
        assert!(registry.find("fast").is_none());
    }

    #[test]
    fn sorted_orders_by_name() {
        let mut registry = TagRegistry::new();
        let owner = NodeRef::Feature(FeatureId(0));
        for raw in ["@zeta", "@alpha", "@mid"] {
            registry.resolve(raw, owner, seen("a.feature", 1));
        }
        let names: Vec<_> = registry.sorted().into_iter().map(Tag::name).collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }
}
