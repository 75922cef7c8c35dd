//! Element processors - the rules that inspect resolved elements and
//! propose actions

pub mod controls;
pub mod every_element;
pub mod grid;
pub mod hardcoded;

use crate::actions::AnalysisActions;
use crate::document::XamlDocument;
use crate::element::XamlElement;
use crate::project::{ProjectFramework, ProjectResolver};
use rand::Rng;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use controls::{MediaElementProcessor, TextBoxInputScopeProcessor};
pub use every_element::EveryElementProcessor;
pub use grid::GridProcessor;
pub use hardcoded::HardCodedStringProcessor;

/// Errors a processor can raise. Errors from built-in rules abort the
/// document; errors from user-supplied rules are logged and swallowed so one
/// broken analyzer cannot take down the run.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("failed to inspect project resources: {0}")]
    Resource(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

/// Source of the numeric suffix appended to generated resource keys when an
/// element gives nothing better to derive a key from. Injected so tests can
/// pin the value.
pub trait KeySource: Send {
    fn numeric_suffix(&mut self) -> u32;
}

/// Random suffix in the range used for generated keys.
#[derive(Debug, Default)]
pub struct RandomKeySource;

impl KeySource for RandomKeySource {
    fn numeric_suffix(&mut self) -> u32 {
        rand::rng().random_range(1001..=8999)
    }
}

/// Fixed suffix, for deterministic tests.
#[derive(Debug)]
pub struct FixedKeySource(pub u32);

impl KeySource for FixedKeySource {
    fn numeric_suffix(&mut self) -> u32 {
        self.0
    }
}

/// Per-document state shared across processors during one scan.
pub struct AnalysisContext {
    pub framework: ProjectFramework,
    /// The file being analyzed
    pub file: PathBuf,
    pub resolver: Arc<dyn ProjectResolver>,
    pub keys: Box<dyn KeySource>,
    /// Every `x:Uid` value seen so far in this document, collected by the
    /// catch-all processor and consulted when generating new keys
    pub seen_uids: HashSet<String>,
}

impl AnalysisContext {
    pub fn new(
        framework: ProjectFramework,
        file: impl Into<PathBuf>,
        resolver: Arc<dyn ProjectResolver>,
    ) -> Self {
        Self {
            framework,
            file: file.into(),
            resolver,
            keys: Box::new(RandomKeySource),
            seen_uids: HashSet::new(),
        }
    }

    /// Swap in a different key source, mainly for tests
    pub fn with_key_source(mut self, keys: Box<dyn KeySource>) -> Self {
        self.keys = keys;
        self
    }
}

/// A rule that inspects one resolved element and proposes zero or more
/// actions. Implementations must not panic on malformed markup; return
/// `AnalysisActions::none()` when nothing applies.
pub trait XamlElementProcessor: Send + Sync {
    /// Short identifier used in logs when the processor fails
    fn name(&self) -> &str;

    fn process(
        &self,
        element: &XamlElement,
        doc: &XamlDocument,
        ctx: &mut AnalysisContext,
    ) -> Result<AnalysisActions, ProcessorError>;
}
