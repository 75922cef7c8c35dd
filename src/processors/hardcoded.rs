//! RXT200: hard-coded strings that should live in a resource file
//!
//! The fix differs per framework. UWP moves the string behind an `x:Uid`;
//! WPF and Xamarin.Forms replace the value with an `x:Static` reference to
//! the generated resource class, adding the xmlns when it is missing.

use crate::actions::AnalysisActions;
use crate::document::XamlDocument;
use crate::element::XamlElement;
use crate::processors::{AnalysisContext, ProcessorError, XamlElementProcessor};
use crate::project::{
    resource_class_name, resource_clr_namespace, resource_namespace_alias, ProjectFramework,
};
use crate::tags::Severity;

/// Checks one attribute of one element type for a hard-coded display string.
/// Registered once per (element, attribute) pair.
pub struct HardCodedStringProcessor {
    element: String,
    attribute: String,
    /// Also treat the element's default text content as the attribute value,
    /// e.g. `<Button>Click</Button>` for `Content`
    check_default_content: bool,
}

impl HardCodedStringProcessor {
    pub fn new(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            attribute: attribute.into(),
            check_default_content: false,
        }
    }

    pub fn with_default_content(mut self) -> Self {
        self.check_default_content = true;
        self
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    /// Pick the resource key for the extracted string:
    /// an existing `x:Uid` verbatim, then `Name`/`x:Name`, then a key derived
    /// from the value and element name, then the element name plus a numeric
    /// suffix. Derived keys that collide with a uid already in the document
    /// fall through to the suffixed form.
    fn resource_key(
        &self,
        element: &XamlElement,
        value: &str,
        ctx: &mut AnalysisContext,
    ) -> String {
        if let Some(uid) = element.attribute("x:Uid") {
            if !uid.value.is_empty() {
                return uid.value;
            }
        }
        for name_attr in ["Name", "x:Name"] {
            if let Some(attr) = element.attribute(name_attr) {
                if !attr.value.is_empty() {
                    return attr.value;
                }
            }
        }

        let bare = element.name_without_namespace();
        let derived = format!("{}{}", remove_non_alphanumeric(&title_case(value)), bare);
        if derived.len() > bare.len() && !ctx.seen_uids.contains(&derived) {
            return derived;
        }

        format!("{}{}", bare, ctx.keys.numeric_suffix())
    }
}

impl XamlElementProcessor for HardCodedStringProcessor {
    fn name(&self) -> &str {
        "hardcoded-string"
    }

    fn process(
        &self,
        element: &XamlElement,
        doc: &XamlDocument,
        ctx: &mut AnalysisContext,
    ) -> Result<AnalysisActions, ProcessorError> {
        let (value, from_attribute) = match element.attribute(&self.attribute) {
            Some(attr) => (attr.value, true),
            None if self.check_default_content => match element.content() {
                Some(content) => (content, false),
                None => return Ok(AnalysisActions::none()),
            },
            None => return Ok(AnalysisActions::none()),
        };

        let value = value.trim();
        if !is_candidate(value) {
            return Ok(AnalysisActions::none());
        }
        if ctx.framework == ProjectFramework::Unknown {
            return Ok(AnalysisActions::none());
        }

        let description = format!("Hard-coded string value '{}'.", value);
        let extended =
            "Strings shown to users should come from a resource file so they can be localized.";

        let Some(resource_file) = ctx.resolver.find_resource_file(ctx.framework) else {
            // Nowhere to move the string; flag it without a fix
            return Ok(AnalysisActions::highlight_only(
                Severity::Suggestion,
                "RXT200",
                description,
            )
            .with_extended_message(extended));
        };

        let key = self.resource_key(element, value, ctx);

        let mut actions = AnalysisActions::create_resource(
            Severity::Warning,
            "RXT200",
            description,
            "Move hard-coded string to the resource file",
            resource_file.clone(),
            key.clone(),
            value,
        )
        .with_extended_message(extended);

        match ctx.framework {
            ProjectFramework::Uwp => {
                if !element.has_attribute("x:Uid") {
                    actions = actions.and_add_attribute("x:Uid", &key);
                }
                actions = if from_attribute {
                    actions.and_remove_attribute(&self.attribute)
                } else {
                    actions.and_remove_default_value()
                };
            }
            ProjectFramework::Wpf | ProjectFramework::XamarinForms => {
                let class = resource_class_name(&resource_file);
                let namespace = resource_clr_namespace(&resource_file);
                // An alias the project already maps to the resource
                // namespace wins over the derived one
                let known = ctx
                    .resolver
                    .xmlns_aliases(&ctx.file)
                    .into_iter()
                    .find(|(_, ns)| *ns == namespace)
                    .map(|(alias, _)| alias);
                let alias = known
                    .clone()
                    .unwrap_or_else(|| resource_namespace_alias(&resource_file));
                let reference = format!("{{x:Static {}:{}.{}}}", alias, class, key);
                if !from_attribute {
                    actions = actions.and_remove_default_value();
                }
                actions = actions.and_add_attribute(&self.attribute, reference);
                if known.is_none() && !declares_alias(doc, &alias) {
                    actions = actions.and_add_xmlns(&alias, namespace);
                }
            }
            ProjectFramework::Unknown => {}
        }

        Ok(actions)
    }
}

/// A value is worth flagging when it is non-empty and starts with an
/// alphanumeric character. Markup extensions (`{Binding ...}`) and
/// already-extracted references start with `{` and are skipped.
fn is_candidate(value: &str) -> bool {
    value.chars().next().is_some_and(|c| c.is_alphanumeric())
}

fn declares_alias(doc: &XamlDocument, alias: &str) -> bool {
    doc.source().contains(&format!("xmlns:{}=", alias))
}

/// Uppercase the first letter of every whitespace-separated word.
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn remove_non_alphanumeric(value: &str) -> String {
    value.chars().filter(|c| c.is_alphanumeric()).collect()
}
