//! Builder configuration parsed from environment variables.
//!
//! Settings can be overridden via environment variables prefixed with
//! `GHERKIN_GRAPH_`, and again by command-line flags.

use std::collections::BTreeSet;
use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::tags::canonical_name;

/// Environment variable holding the log level.
pub const LOG_LEVEL_ENV: &str = "GHERKIN_GRAPH_LOG_LEVEL";

/// Environment variable holding the comma-separated excluded tag names.
pub const EXCLUDED_TAGS_ENV: &str = "GHERKIN_GRAPH_EXCLUDED_TAGS";

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Log level enumeration matching tracing crate levels.
///
/// Defaults to `Warn` when not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Most verbose logging, includes every step and tag.
    Trace,
    /// Per-node construction events.
    Debug,
    /// Per-document progress.
    Info,
    /// Ignored input and parser diagnostics.
    #[default]
    Warn,
    /// Failures only.
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Configuration for a graph-building run.
///
/// # Environment Variables
///
/// - `GHERKIN_GRAPH_LOG_LEVEL`: log level (trace, debug, info, warn, error)
/// - `GHERKIN_GRAPH_EXCLUDED_TAGS`: comma-separated tag names whose features
///   and scenarios are skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphConfig {
    /// Log level.
    pub log_level: LogLevel,
    /// Tag names, marker stripped, that exclude a node from the graph.
    pub excluded_tags: BTreeSet<String>,
}

impl GraphConfig {
    /// Load configuration from environment variables.
    ///
    /// Falls back to defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidConfig` if the log level is not
    /// recognised.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidConfig` if the log level is not
    /// recognised.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = match lookup(LOG_LEVEL_ENV) {
            Some(val) => val.parse()?,
            None => LogLevel::default(),
        };
        let excluded_tags = lookup(EXCLUDED_TAGS_ENV)
            .map(|val| parse_tag_list(&val))
            .unwrap_or_default();
        Ok(Self {
            log_level,
            excluded_tags,
        })
    }

    /// Apply optional overrides to an existing configuration.
    ///
    /// A log level replaces the current one; excluded tags are added to the
    /// existing set.
    #[must_use]
    pub fn apply_overrides<I, S>(mut self, log_level: Option<LogLevel>, excluded_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self.excluded_tags.extend(
            excluded_tags
                .into_iter()
                .map(|tag| canonical_name(tag.as_ref()).to_string())
                .filter(|tag| !tag.is_empty()),
        );
        self
    }

    /// Create a new configuration with the specified log level.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

fn parse_tag_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(canonical_name)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn log_level_parses_valid_values() {
        assert_eq!("trace".parse::<LogLevel>().ok(), Some(LogLevel::Trace));
        assert_eq!("debug".parse::<LogLevel>().ok(), Some(LogLevel::Debug));
        assert_eq!("info".parse::<LogLevel>().ok(), Some(LogLevel::Info));
        assert_eq!("warn".parse::<LogLevel>().ok(), Some(LogLevel::Warn));
        assert_eq!("warning".parse::<LogLevel>().ok(), Some(LogLevel::Warn));
        assert_eq!("ERROR".parse::<LogLevel>().ok(), Some(LogLevel::Error));
    }

    #[test]
    fn log_level_rejects_invalid_values() {
        let result = "loud".parse::<LogLevel>();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("unknown log level")
        );
    }

    #[test]
    fn missing_variables_use_defaults() {
        let config = GraphConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GraphConfig::default());
        assert_eq!(config.log_level.as_filter_str(), "warn");
    }

    #[test]
    fn excluded_tags_are_split_and_normalised() {
        let config =
            GraphConfig::from_lookup(lookup(&[(EXCLUDED_TAGS_ENV, " @wip, slow,, @")])).unwrap();
        let tags: Vec<_> = config.excluded_tags.iter().map(String::as_str).collect();
        assert_eq!(tags, ["slow", "wip"]);
    }

    #[test]
    fn invalid_log_level_in_environment_is_reported() {
        let result = GraphConfig::from_lookup(lookup(&[(LOG_LEVEL_ENV, "chatty")]));
        assert!(result.is_err());
    }

    #[test]
    fn overrides_replace_level_and_extend_tags() {
        let config = GraphConfig::from_lookup(lookup(&[(EXCLUDED_TAGS_ENV, "wip")]))
            .unwrap()
            .apply_overrides(Some(LogLevel::Debug), ["@manual"]);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.excluded_tags.contains("wip"));
        assert!(config.excluded_tags.contains("manual"));

        let unchanged = GraphConfig::default().apply_overrides(None, Vec::<String>::new());
        assert_eq!(unchanged, GraphConfig::default());
    }
}
