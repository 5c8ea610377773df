//! Navigable object graph for Gherkin feature documents.
//!
//! This crate turns parsed `.feature` files into a graph of features,
//! scenarios, steps, and tags that documentation generators and reporting
//! tools can walk in both directions.
//!
//! # Overview
//!
//! - Tags are shared across every document assembled into one [`Corpus`].
//! - Scenario outlines are expanded into one concrete scenario per examples
//!   row, with placeholders substituted in step text, doc strings, and
//!   table cells.
//! - A [`FilterPolicy`] drops features and scenarios carrying an excluded
//!   tag before anything about them is recorded.
//!
//! # Configuration
//!
//! The command-line tool reads these environment variables:
//!
//! - `GHERKIN_GRAPH_LOG_LEVEL`: Log verbosity (trace, debug, info, warn,
//!   error)
//! - `GHERKIN_GRAPH_EXCLUDED_TAGS`: Comma-separated tags to exclude
//!
//! # Example
//!
//! ```
//! use gherkin_graph::{Corpus, FilterPolicy, assemble_document, parse_document};
//!
//! let parsed = parse_document(
//!     "shop.feature",
//!     "Feature: Shop\n  Scenario: browse\n    Given an open shop\n",
//! );
//! let mut corpus = Corpus::new();
//! let feature = assemble_document(&mut corpus, parsed.document, FilterPolicy::default())?;
//! assert!(feature.is_some());
//! # Ok::<(), gherkin_graph::BuildError>(())
//! ```

pub mod assembler;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod filter;
pub mod gherkin_source;
pub mod graph;
pub mod logging;
pub mod placeholder;
pub mod table;
pub mod tags;

mod outline;
mod scenario;
mod step;

pub use assembler::{FeatureBuilder, assemble_document};
pub use error::BuildError;
pub use filter::FilterPolicy;
pub use gherkin_source::{Diagnostic, LoadError, ParsedDocument, load_document, parse_document};
pub use graph::{
    Corpus, Examples, Feature, FeatureId, Header, NodeRef, Scenario, ScenarioId, ScenarioKind,
    Step, StepId, TagId,
};
pub use table::DataTable;
pub use tags::{Tag, TagOccurrence, TagRegistry};
