//! Analysis actions - structured, composable descriptions of proposed fixes

use crate::tags::Severity;
use std::path::PathBuf;

/// The primary action variants a rule can propose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    AddAttribute,
    AddChild,
    RemoveAttribute,
    RemoveChild,
    ReplaceElement,
    RenameElement,
    CreateResourceEntry,
    HighlightOnly,
}

/// An entry to add to a resource file. Writing the file is the host's job;
/// this core only describes the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub key: String,
    pub value: String,
    pub file: PathBuf,
}

/// A follow-on effect chained to a primary action. Secondary actions never
/// carry their own severity or code; those come from the primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryAction {
    AddAttribute { name: String, value: String },
    RemoveAttribute { name: String },
    RemoveDefaultValue,
    AddXmlns { alias: String, namespace: String },
}

/// One proposed fix: a primary action plus chained secondaries and
/// diagnostic metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisAction {
    pub action: ActionType,
    /// Stable diagnostic code, e.g. "RXT200". Public contract.
    pub code: String,
    pub severity: Severity,
    /// Human-readable description of the issue
    pub description: String,
    /// Short text shown on the fix itself
    pub action_text: String,
    pub extended_message: Option<String>,
    /// Attribute name or rename target, depending on the variant
    pub name: Option<String>,
    /// Attribute value, depending on the variant
    pub value: Option<String>,
    /// Child or replacement markup, depending on the variant
    pub content: Option<String>,
    pub resource: Option<ResourceEntry>,
    /// Ordered chained effects applied as part of the same fix
    pub secondaries: Vec<SecondaryAction>,
    /// Whether user suppressions may hide the resulting diagnostic
    pub suppressible: bool,
}

impl AnalysisAction {
    fn new(
        action: ActionType,
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        action_text: impl Into<String>,
    ) -> Self {
        Self {
            action,
            code: code.into(),
            severity,
            description: description.into(),
            action_text: action_text.into(),
            extended_message: None,
            name: None,
            value: None,
            content: None,
            resource: None,
            secondaries: Vec::new(),
            suppressible: true,
        }
    }
}

/// The full outcome of analyzing one element: zero or more actions.
///
/// `AnalysisActions::none()` is the "no applicable fix, no diagnostic"
/// sentinel; it is distinct from a `HighlightOnly` action, which emits a
/// diagnostic with no fix attached.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisActions {
    actions: Vec<AnalysisAction>,
}

impl AnalysisActions {
    /// No diagnostic, no fix
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[AnalysisAction] {
        &self.actions
    }

    /// Emit a diagnostic with no fix attached
    pub fn highlight_only(
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let action = AnalysisAction::new(ActionType::HighlightOnly, severity, code, description, "");
        Self {
            actions: vec![action],
        }
    }

    /// Propose adding an inline attribute to the element
    pub fn add_attribute(
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        action_text: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut action =
            AnalysisAction::new(ActionType::AddAttribute, severity, code, description, action_text);
        action.name = Some(name.into());
        action.value = Some(value.into());
        Self {
            actions: vec![action],
        }
    }

    /// Propose adding child markup to the element
    pub fn add_child(
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        action_text: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut action =
            AnalysisAction::new(ActionType::AddChild, severity, code, description, action_text);
        action.content = Some(content.into());
        Self {
            actions: vec![action],
        }
    }

    /// Propose removing an attribute, in whichever form it appears
    pub fn remove_attribute(
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        action_text: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mut action = AnalysisAction::new(
            ActionType::RemoveAttribute,
            severity,
            code,
            description,
            action_text,
        );
        action.name = Some(name.into());
        Self {
            actions: vec![action],
        }
    }

    /// Propose removing child markup from the element
    pub fn remove_child(
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        action_text: impl Into<String>,
        child_markup: impl Into<String>,
    ) -> Self {
        let mut action =
            AnalysisAction::new(ActionType::RemoveChild, severity, code, description, action_text);
        action.content = Some(child_markup.into());
        Self {
            actions: vec![action],
        }
    }

    /// Propose replacing the whole element with new markup
    pub fn replace_element(
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        action_text: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        let mut action = AnalysisAction::new(
            ActionType::ReplaceElement,
            severity,
            code,
            description,
            action_text,
        );
        action.content = Some(replacement.into());
        Self {
            actions: vec![action],
        }
    }

    /// Propose renaming the element (child property-elements follow)
    pub fn rename_element(
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        action_text: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        let mut action = AnalysisAction::new(
            ActionType::RenameElement,
            severity,
            code,
            description,
            action_text,
        );
        action.name = Some(new_name.into());
        Self {
            actions: vec![action],
        }
    }

    /// Propose creating a resource entry. Key and value must be non-empty;
    /// key uniqueness is the resource writer's concern, not ours.
    pub fn create_resource(
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        action_text: impl Into<String>,
        file: impl Into<PathBuf>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut action = AnalysisAction::new(
            ActionType::CreateResourceEntry,
            severity,
            code,
            description,
            action_text,
        );
        action.resource = Some(ResourceEntry {
            key: key.into(),
            value: value.into(),
            file: file.into(),
        });
        Self {
            actions: vec![action],
        }
    }

    /// Add extended help text to the most recent action
    pub fn with_extended_message(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.actions.last_mut() {
            last.extended_message = Some(message.into());
        }
        self
    }

    /// Mark the most recent action as exempt from user suppressions
    pub fn non_suppressible(mut self) -> Self {
        if let Some(last) = self.actions.last_mut() {
            last.suppressible = false;
        }
        self
    }

    /// Chain an add-attribute effect onto the most recent action
    pub fn and_add_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.and(SecondaryAction::AddAttribute {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Chain a remove-attribute effect onto the most recent action
    pub fn and_remove_attribute(self, name: impl Into<String>) -> Self {
        self.and(SecondaryAction::RemoveAttribute { name: name.into() })
    }

    /// Chain removal of the element's default text content
    pub fn and_remove_default_value(self) -> Self {
        self.and(SecondaryAction::RemoveDefaultValue)
    }

    /// Chain adding a namespace declaration to the document root
    pub fn and_add_xmlns(self, alias: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.and(SecondaryAction::AddXmlns {
            alias: alias.into(),
            namespace: namespace.into(),
        })
    }

    /// Merge another set of actions after this one
    pub fn extend(mut self, other: AnalysisActions) -> Self {
        self.actions.extend(other.actions);
        self
    }

    fn and(mut self, secondary: SecondaryAction) -> Self {
        if let Some(last) = self.actions.last_mut() {
            last.secondaries.push(secondary);
        }
        self
    }
}
