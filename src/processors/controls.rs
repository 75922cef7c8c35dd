//! Control-specific rules that are not about hard-coded strings

use crate::actions::AnalysisActions;
use crate::document::XamlDocument;
use crate::element::XamlElement;
use crate::processors::{AnalysisContext, ProcessorError, XamlElementProcessor};
use crate::project::ProjectFramework;
use crate::tags::Severity;

/// RXT150: a UWP TextBox without an `InputScope` gets the default touch
/// keyboard, which is rarely the best fit for the field.
#[derive(Debug, Default)]
pub struct TextBoxInputScopeProcessor;

impl XamlElementProcessor for TextBoxInputScopeProcessor {
    fn name(&self) -> &str {
        "textbox-inputscope"
    }

    fn process(
        &self,
        element: &XamlElement,
        _doc: &XamlDocument,
        ctx: &mut AnalysisContext,
    ) -> Result<AnalysisActions, ProcessorError> {
        if ctx.framework != ProjectFramework::Uwp {
            return Ok(AnalysisActions::none());
        }
        if element.has_attribute("InputScope") {
            return Ok(AnalysisActions::none());
        }

        Ok(AnalysisActions::add_attribute(
            Severity::Suggestion,
            "RXT150",
            "TextBox does not specify an InputScope.",
            "Add the default InputScope",
            "InputScope",
            "Default",
        )
        .with_extended_message(
            "Setting an InputScope shows touch users the most appropriate keyboard.",
        ))
    }
}

/// RXT402: `MediaElement` is superseded by `MediaPlayerElement` on UWP.
#[derive(Debug, Default)]
pub struct MediaElementProcessor;

impl XamlElementProcessor for MediaElementProcessor {
    fn name(&self) -> &str {
        "media-element"
    }

    fn process(
        &self,
        _element: &XamlElement,
        _doc: &XamlDocument,
        ctx: &mut AnalysisContext,
    ) -> Result<AnalysisActions, ProcessorError> {
        if ctx.framework != ProjectFramework::Uwp {
            return Ok(AnalysisActions::none());
        }

        Ok(AnalysisActions::rename_element(
            Severity::Suggestion,
            "RXT402",
            "Use MediaPlayerElement in place of MediaElement.",
            "Rename to MediaPlayerElement",
            "MediaPlayerElement",
        ))
    }
}
