//! Log output for the `gherkin-graph` tool.
//!
//! The library only emits `tracing` events. This module installs the
//! subscriber that prints them: compact lines on stderr, keeping stdout free
//! for the JSON summary. Targets are shown so builder events
//! (`gherkin_graph::outline`, `gherkin_graph::tags`, ...) can be told apart.

use tracing_subscriber::EnvFilter;

use crate::config::GraphConfig;

/// Filter admitting events at the configured level and above.
fn level_filter(config: &GraphConfig) -> EnvFilter {
    EnvFilter::new(config.log_level.as_filter_str())
}

/// Install the stderr subscriber for a graph-building run.
///
/// `config.log_level` already reflects `--log-level` over
/// `GHERKIN_GRAPH_LOG_LEVEL`; see [`GraphConfig::apply_overrides`].
/// Calling this again after a subscriber is installed changes nothing.
pub fn init_logging(config: &GraphConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(level_filter(config))
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .compact()
        .finish();

    // Keeps the subscriber from the first call, including the fallback
    // installed before a configuration error is reported.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
