//! Tag-based exclusion of features and scenarios.

use std::collections::BTreeSet;

use crate::config::GraphConfig;
use crate::events::TagEvent;
use crate::tags::canonical_name;

/// Decides whether a node is skipped because of its tags.
///
/// Excluded names are stored without the `@` marker. A policy with no names
/// never excludes anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPolicy {
    excluded: BTreeSet<String>,
}

impl FilterPolicy {
    /// Build a policy from tag names, with or without the marker.
    #[must_use]
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: excluded
                .into_iter()
                .map(|name| canonical_name(name.as_ref()).to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Build the policy from the configured excluded tag set.
    #[must_use]
    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(&config.excluded_tags)
    }

    /// Excluded names, marker stripped.
    #[must_use]
    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    /// Return `true` when any of `tag_names` is excluded.
    ///
    /// Names are compared after stripping the marker, so `@wip` and `wip`
    /// are equivalent.
    pub fn is_excluded<'a, I>(&self, tag_names: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.excluded.is_empty() {
            return false;
        }
        tag_names
            .into_iter()
            .any(|name| self.excluded.contains(canonical_name(name)))
    }

    /// Convenience wrapper over [`Self::is_excluded`] for parsed tag records.
    #[must_use]
    pub fn excludes_tags(&self, tags: &[TagEvent]) -> bool {
        self.is_excluded(tags.iter().map(|tag| tag.name.as_str()))
    }
}
