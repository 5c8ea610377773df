//! Placeholder substitution for scenario outline steps.
//!
//! A step template such as `Given I have <count> items`, combined with an
//! examples row `| count |` / `| 5 |`, becomes `Given I have 5 items`.
//! Substitution is a single pass over the template: values are never
//! rescanned, so a cell containing `<other>` is inserted literally.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Regex matching `<placeholder>` tokens.
///
/// The name may contain anything except angle brackets, so headers with
/// spaces or punctuation are supported.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([^<>]*)>").unwrap_or_else(|_| unreachable!("placeholder regex is valid"))
});

/// Values of one examples row keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct ExampleRow<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> ExampleRow<'a> {
    /// Pair `header` with `row`.
    ///
    /// Columns without a cell in `row` map to the empty string. When a
    /// column name repeats, the leftmost column wins.
    #[must_use]
    pub fn new(header: &'a [String], row: &'a [String]) -> Self {
        let mut values = HashMap::with_capacity(header.len());
        for (idx, column) in header.iter().enumerate() {
            let value = row.get(idx).map_or("", String::as_str);
            values.entry(column.as_str()).or_insert(value);
        }
        Self { values }
    }

    /// Value for `column`, if the column exists.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.values.get(column).copied()
    }

    /// Replace every `<column>` token naming a known column.
    ///
    /// Tokens naming unknown columns are left untouched.
    #[must_use]
    pub fn substitute<'t>(&self, text: &'t str) -> Cow<'t, str> {
        PLACEHOLDER_RE.replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            caps.get(1)
                .and_then(|name| self.get(name.as_str()))
                .unwrap_or(whole)
                .to_string()
        })
    }
}

/// Substitute `<column>` tokens in `text` with values from `row`.
///
/// # Examples
///
/// ```
/// use gherkin_graph::placeholder::substitute_placeholders;
///
/// let header = vec!["a".to_string(), "b".to_string()];
/// let row = vec!["x".to_string(), "y".to_string()];
/// assert_eq!(
///     substitute_placeholders("uses <a> and <b>", &header, &row),
///     "uses x and y"
/// );
/// ```
#[must_use]
pub fn substitute_placeholders(text: &str, header: &[String], row: &[String]) -> String {
    ExampleRow::new(header, row).substitute(text).into_owned()
}

/// Placeholder names found in `text`, in order of appearance.
#[must_use]
pub fn placeholder_names(text: &str) -> Vec<&str> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect()
}
