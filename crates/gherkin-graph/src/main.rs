//! Command-line front end for gherkin-graph.
//!
//! Loads every `.feature` file under the given paths into one shared graph
//! and writes a JSON summary of the result to stdout. Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use gherkin_graph::config::{ConfigError, GraphConfig, LogLevel};
use gherkin_graph::discovery::{DiscoveryError, discover};
use gherkin_graph::logging::init_logging;
use gherkin_graph::{
    BuildError, Corpus, FilterPolicy, LoadError, ScenarioKind, TagOccurrence, assemble_document,
    load_document,
};

/// Build a navigable graph from Gherkin feature files.
#[derive(Parser, Debug)]
#[command(name = "gherkin-graph", version, about)]
struct Args {
    /// Feature files or directories to search for `.feature` files.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Skip features and scenarios carrying this tag (repeatable).
    #[arg(long = "exclude-tag", value_name = "TAG")]
    exclude_tags: Vec<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Pretty-print the JSON summary.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Discover(#[from] DiscoveryError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("failed to write summary: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    documents: usize,
    features: usize,
    backgrounds: usize,
    scenarios: usize,
    outlines: usize,
    instances: usize,
    tags: Vec<TagSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct TagSummary<'a> {
    name: &'a str,
    value: &'a str,
    owners: usize,
    occurrences: &'a [TagOccurrence],
}

impl<'a> Summary<'a> {
    fn new(documents: usize, corpus: &'a Corpus) -> Self {
        Self {
            documents,
            features: corpus.feature_count(),
            backgrounds: corpus.scenario_count(ScenarioKind::Background),
            scenarios: corpus.scenario_count(ScenarioKind::Scenario),
            outlines: corpus.scenario_count(ScenarioKind::Outline),
            instances: corpus.scenario_count(ScenarioKind::Example),
            tags: corpus
                .tags()
                .sorted()
                .into_iter()
                .map(|tag| TagSummary {
                    name: tag.name(),
                    value: tag.value(),
                    owners: tag.owners().len(),
                    occurrences: tag.occurrences(),
                })
                .collect(),
        }
    }
}

fn main() {
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            let fallback = GraphConfig::default();
            init_logging(&fallback);
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "starting gherkin-graph");

    if let Err(e) = run(&args, &config) {
        tracing::error!(error = %e, "graph build failed");
        std::process::exit(1);
    }
}

fn build_config(args: &Args) -> Result<GraphConfig, ConfigError> {
    let config = GraphConfig::from_env()?;
    Ok(config.apply_overrides(args.log_level, &args.exclude_tags))
}

fn run(args: &Args, config: &GraphConfig) -> Result<(), RunError> {
    let files = discover(&args.paths)?;
    let policy = FilterPolicy::from_config(config);
    let mut corpus = Corpus::new();

    for file in &files {
        let parsed = load_document(file)?;
        for diagnostic in &parsed.diagnostics {
            warn!(
                document = %diagnostic.path.display(),
                message = %diagnostic.message,
                "skipping document with syntax errors"
            );
        }
        assemble_document(&mut corpus, parsed.document, policy.clone())?;
    }
    info!(
        documents = files.len(),
        features = corpus.feature_count(),
        tags = corpus.tags().len(),
        "graph built"
    );

    let summary = Summary::new(files.len(), &corpus);
    let mut stdout = io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut stdout, &summary)?;
    } else {
        serde_json::to_writer(&mut stdout, &summary)?;
    }
    writeln!(stdout).map_err(serde_json::Error::io)?;
    Ok(())
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;

    #[test]
    fn command_line_tags_extend_configuration() {
        let args = Args::parse_from([
            "gherkin-graph",
            "--exclude-tag",
            "@wip",
            "--exclude-tag",
            "slow",
            "--log-level",
            "debug",
            "features",
        ]);
        let config = GraphConfig::default().apply_overrides(args.log_level, &args.exclude_tags);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(
            config.excluded_tags.iter().map(String::as_str).collect::<Vec<_>>(),
            ["slow", "wip"]
        );
    }

    #[test]
    fn summary_counts_nodes_and_tags() {
        let parsed = gherkin_graph::parse_document(
            "shop.feature",
            concat!(
                "@shop\n",
                "Feature: shop\n",
                "  Scenario Outline: buy\n",
                "    Given <n> items\n",
                "    Examples:\n",
                "      | n |\n",
                "      | 1 |\n",
                "      | 2 |\n",
            ),
        );
        let mut corpus = Corpus::new();
        assemble_document(&mut corpus, parsed.document, FilterPolicy::default())
            .expect("document builds");
        let summary = Summary::new(1, &corpus);
        assert_eq!(summary.features, 1);
        assert_eq!(summary.outlines, 1);
        assert_eq!(summary.instances, 2);
        assert_eq!(summary.tags.len(), 1);
        assert_eq!(summary.tags.first().map(|t| t.value), Some("@shop"));
    }
}
