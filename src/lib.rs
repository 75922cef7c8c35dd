//! xaml-lint: a quality analyzer for XAML markup files
//!
//! This library scans markup in a single forward pass without building a
//! DOM, dispatches each resolved element to the rule processors registered
//! for it, and materializes the results into diagnostics carrying
//! executable text fixes.

pub mod actions;
pub mod config;
pub mod document;
pub mod element;
pub mod engine;
pub mod executor;
pub mod output;
pub mod processors;
pub mod project;
pub mod registry;
pub mod scanner;
pub mod suppression;
pub mod tags;

pub use actions::{ActionType, AnalysisAction, AnalysisActions, ResourceEntry, SecondaryAction};
pub use config::{CliOptions, Config, ConfigError};
pub use document::XamlDocument;
pub use element::{ElementSpan, XamlAttribute, XamlElement};
pub use engine::{AnalysisEngine, AnalysisError, AnalysisStatistics, FixOutcome};
pub use executor::{ActionExecutor, BufferEditor, EditError, ExecutorState, TextManipulation};
pub use processors::{AnalysisContext, KeySource, ProcessorError, XamlElementProcessor};
pub use project::{FileSystemResolver, NullResolver, ProjectFramework, ProjectResolver};
pub use registry::ProcessorRegistry;
pub use suppression::{SuppressionSet, TagSuppression};
pub use tags::{Fix, Severity, Tag, TextEdit};
