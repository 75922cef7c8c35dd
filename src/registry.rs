//! Processor registry and per-document dispatch
//!
//! Elements resolve in closing order from the scanner; each one is handed to
//! every processor registered for its bare or qualified name, then to the
//! catch-all processors. Errors from user-registered processors are logged
//! and swallowed so one broken analyzer cannot abort the run; errors from
//! built-in rules propagate.

use crate::document::XamlDocument;
use crate::element::{strip_namespace, XamlElement};
use crate::processors::{
    AnalysisContext, EveryElementProcessor, GridProcessor, HardCodedStringProcessor,
    MediaElementProcessor, ProcessorError, TextBoxInputScopeProcessor, XamlElementProcessor,
};
use crate::scanner;
use crate::tags::{self, Tag};
use std::sync::Arc;
use tracing::warn;

struct RegisteredProcessor {
    element: String,
    processor: Arc<dyn XamlElementProcessor>,
    custom: bool,
}

/// Maps element names to the processors interested in them.
pub struct ProcessorRegistry {
    entries: Vec<RegisteredProcessor>,
    catch_all: Vec<Arc<dyn XamlElementProcessor>>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            catch_all: Vec::new(),
        }
    }

    /// The built-in rule set.
    pub fn with_default_rules() -> Self {
        let mut registry = Self::new();
        registry.register("Grid", Arc::new(GridProcessor));
        registry.register(
            "TextBlock",
            Arc::new(HardCodedStringProcessor::new("TextBlock", "Text").with_default_content()),
        );
        registry.register(
            "TextBox",
            Arc::new(HardCodedStringProcessor::new("TextBox", "Header")),
        );
        registry.register("TextBox", Arc::new(TextBoxInputScopeProcessor));
        registry.register(
            "Button",
            Arc::new(HardCodedStringProcessor::new("Button", "Content").with_default_content()),
        );
        registry.register("MediaElement", Arc::new(MediaElementProcessor));
        registry.register_catch_all(Arc::new(EveryElementProcessor));
        registry
    }

    /// Register a built-in processor for an element name. Several
    /// processors may share a name; all of them run.
    pub fn register(&mut self, element: impl Into<String>, processor: Arc<dyn XamlElementProcessor>) {
        self.entries.push(RegisteredProcessor {
            element: element.into(),
            processor,
            custom: false,
        });
    }

    /// Register a user-supplied processor. Its errors are isolated.
    pub fn register_custom(
        &mut self,
        element: impl Into<String>,
        processor: Arc<dyn XamlElementProcessor>,
    ) {
        self.entries.push(RegisteredProcessor {
            element: element.into(),
            processor,
            custom: true,
        });
    }

    /// Register a processor that receives every resolved element.
    pub fn register_catch_all(&mut self, processor: Arc<dyn XamlElementProcessor>) {
        self.catch_all.push(processor);
    }

    /// Whether any registered processor wants this element name, matched
    /// exactly or after stripping a namespace prefix.
    pub fn is_of_interest(&self, name: &str) -> bool {
        let bare = strip_namespace(name);
        self.entries
            .iter()
            .any(|e| e.element == name || e.element == bare)
    }

    fn matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RegisteredProcessor> + 'a {
        let bare = strip_namespace(name);
        self.entries
            .iter()
            .filter(move |e| e.element == name || e.element == bare)
    }

    /// Scan one document and run every applicable processor, materializing
    /// the results into tags in element-closing order.
    pub fn process_document(
        &self,
        doc: &XamlDocument,
        ctx: &mut AnalysisContext,
    ) -> Result<Vec<Tag>, ProcessorError> {
        let scanned = scanner::scan(doc, |name| self.is_of_interest(name));
        let mut found_tags = Vec::new();

        for found in scanned {
            let raw = doc.slice(found.span.start, found.span.length).to_string();
            let line = doc.line_at(found.span.start);
            let padding: String = doc
                .source_line(line)
                .map(|l| l.chars().take_while(|c| c.is_whitespace()).collect())
                .unwrap_or_default();
            let element = XamlElement::new(found.name, found.span, raw, padding);

            if found.of_interest {
                for entry in self.matching(&element.name) {
                    match entry.processor.process(&element, doc, ctx) {
                        Ok(actions) if !actions.is_none() => {
                            found_tags.extend(tags::materialize(&actions, &element, doc));
                        }
                        Ok(_) => {}
                        Err(err) if entry.custom => {
                            warn!(
                                analyzer = entry.processor.name(),
                                element = %element.name,
                                error = %err,
                                "custom analyzer failed, skipping element"
                            );
                        }
                        Err(err) => return Err(err),
                    }
                }
            }

            for processor in &self.catch_all {
                let actions = processor.process(&element, doc, ctx)?;
                if !actions.is_none() {
                    found_tags.extend(tags::materialize(&actions, &element, doc));
                }
            }
        }

        Ok(found_tags)
    }
}
