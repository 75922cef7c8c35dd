//! Catch-all processor run for every resolved element, interest or not.
//! Does the cheap document-wide bookkeeping (collecting `x:Uid` values) and
//! the identifier-casing checks that apply to any element.

use crate::actions::AnalysisActions;
use crate::document::XamlDocument;
use crate::element::XamlElement;
use crate::processors::{AnalysisContext, ProcessorError, XamlElementProcessor};
use crate::tags::Severity;

#[derive(Debug, Default)]
pub struct EveryElementProcessor;

impl XamlElementProcessor for EveryElementProcessor {
    fn name(&self) -> &str {
        "every-element"
    }

    fn process(
        &self,
        element: &XamlElement,
        _doc: &XamlDocument,
        ctx: &mut AnalysisContext,
    ) -> Result<AnalysisActions, ProcessorError> {
        let mut actions = AnalysisActions::none();

        if let Some(uid) = element.attribute("x:Uid") {
            if !uid.value.is_empty() {
                ctx.seen_uids.insert(uid.value.clone());

                if starts_lowercase(&uid.value) {
                    actions = actions.extend(AnalysisActions::add_attribute(
                        Severity::Suggestion,
                        "RXT451",
                        format!("x:Uid '{}' should begin with an uppercase letter.", uid.value),
                        "Capitalize the x:Uid value",
                        "x:Uid",
                        capitalize(&uid.value),
                    ));
                }
            }
        }

        for name_attr in ["Name", "x:Name"] {
            if let Some(attr) = element.attribute(name_attr) {
                if !attr.value.is_empty() && starts_lowercase(&attr.value) {
                    actions = actions.extend(AnalysisActions::add_attribute(
                        Severity::Suggestion,
                        "RXT452",
                        format!("{} '{}' should begin with an uppercase letter.", name_attr, attr.value),
                        "Capitalize the name",
                        name_attr,
                        capitalize(&attr.value),
                    ));
                }
                break;
            }
        }

        Ok(actions)
    }
}

fn starts_lowercase(value: &str) -> bool {
    value.chars().next().is_some_and(|c| c.is_lowercase())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionType;
    use crate::element::ElementSpan;
    use crate::project::{NullResolver, ProjectFramework};
    use std::sync::Arc;

    fn run(source: &str, name: &str) -> (AnalysisActions, AnalysisContext) {
        let doc = XamlDocument::new(source);
        let element = XamlElement::new(name, ElementSpan::new(0, source.len()), source, "");
        let mut ctx =
            AnalysisContext::new(ProjectFramework::Uwp, "Page.xaml", Arc::new(NullResolver));
        let actions = EveryElementProcessor
            .process(&element, &doc, &mut ctx)
            .unwrap();
        (actions, ctx)
    }

    #[test]
    fn test_uid_is_recorded() {
        let (actions, ctx) = run(r#"<TextBlock x:Uid="Greeting" Text="x" />"#, "TextBlock");
        assert!(actions.is_none());
        assert!(ctx.seen_uids.contains("Greeting"));
    }

    #[test]
    fn test_lowercase_uid_flagged() {
        let (actions, ctx) = run(r#"<TextBlock x:Uid="greeting" />"#, "TextBlock");
        assert!(ctx.seen_uids.contains("greeting"));
        assert_eq!(actions.actions().len(), 1);
        let action = &actions.actions()[0];
        assert_eq!(action.code, "RXT451");
        assert_eq!(action.action, ActionType::AddAttribute);
        assert_eq!(action.severity, Severity::Suggestion);
        assert_eq!(action.value.as_deref(), Some("Greeting"));
    }

    #[test]
    fn test_lowercase_name_flagged() {
        let (actions, _) = run(r#"<Button x:Name="submitButton" />"#, "Button");
        assert_eq!(actions.actions().len(), 1);
        assert_eq!(actions.actions()[0].code, "RXT452");
        assert_eq!(actions.actions()[0].value.as_deref(), Some("SubmitButton"));
    }

    #[test]
    fn test_uppercase_names_pass() {
        let (actions, _) = run(r#"<Button Name="Submit" x:Uid="SubmitLabel" />"#, "Button");
        assert!(actions.is_none());
    }

    #[test]
    fn test_both_checks_can_fire_together() {
        let (actions, _) = run(r#"<Button x:Uid="ok" Name="cancel" />"#, "Button");
        let codes: Vec<&str> = actions.actions().iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["RXT451", "RXT452"]);
    }
}
