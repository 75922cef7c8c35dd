//! Tag materialization - turning analysis actions into displayable
//! diagnostics with executable fixes

use crate::actions::{ActionType, AnalysisAction, AnalysisActions, ResourceEntry, SecondaryAction};
use crate::document::XamlDocument;
use crate::element::{ElementSpan, XamlElement};
use std::str::FromStr;

/// Severity level for a materialized diagnostic.
///
/// The names are part of the public diagnostic contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Worth considering, no action required
    #[default]
    Suggestion,
    /// Potential issue
    Warning,
    /// Definite problem
    Error,
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            _ => Ok(Severity::Suggestion),
        }
    }
}

impl Severity {
    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        }
    }

    /// Get colored display name for terminal output
    pub fn colored(&self) -> String {
        match self {
            Severity::Error => "\x1b[1;31merror\x1b[0m".to_string(),
            Severity::Warning => "\x1b[1;33mwarning\x1b[0m".to_string(),
            Severity::Suggestion => "\x1b[1;36msuggestion\x1b[0m".to_string(),
        }
    }
}

/// One line-scoped text replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Text to find on the line
    pub match_text: String,
    /// Replacement text (may contain newlines)
    pub replacement: String,
    /// 1-based line number
    pub line: usize,
}

/// An executable fix: ordered edits plus an optional resource entry for the
/// host to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    /// What the fix does, shown to the user
    pub description: String,
    /// Edits in document order
    pub edits: Vec<TextEdit>,
    pub resource: Option<ResourceEntry>,
}

/// A materialized diagnostic, ready for display and optional application
#[derive(Debug, Clone)]
pub struct Tag {
    /// Stable diagnostic code, e.g. "RXT200"
    pub code: String,
    pub severity: Severity,
    pub span: ElementSpan,
    /// 1-based line of the element's opening tag
    pub line: usize,
    pub description: String,
    pub extended_message: Option<String>,
    pub fix: Option<Fix>,
    /// Whether a user suppression may hide this tag
    pub suppressible: bool,
}

/// Materialize every action in the set into a Tag against the given element
pub fn materialize(
    actions: &AnalysisActions,
    element: &XamlElement,
    doc: &XamlDocument,
) -> Vec<Tag> {
    actions
        .actions()
        .iter()
        .map(|action| materialize_one(action, element, doc))
        .collect()
}

fn materialize_one(action: &AnalysisAction, element: &XamlElement, doc: &XamlDocument) -> Tag {
    let line = doc.line_at(element.span.start);
    let fix = build_fix(action, element, doc);

    Tag {
        code: action.code.clone(),
        severity: action.severity,
        span: element.span,
        line,
        description: action.description.clone(),
        extended_message: action.extended_message.clone(),
        fix,
        suppressible: action.suppressible,
    }
}

fn build_fix(action: &AnalysisAction, element: &XamlElement, doc: &XamlDocument) -> Option<Fix> {
    if action.action == ActionType::HighlightOnly {
        return None;
    }

    let mut edits = Vec::new();
    let mut resource = None;

    match action.action {
        ActionType::AddAttribute => {
            if let (Some(name), Some(value)) = (&action.name, &action.value) {
                edits.extend(add_attribute_edit(element, doc, name, value));
            }
        }
        ActionType::AddChild => {
            if let Some(content) = &action.content {
                edits.extend(add_child_edit(element, doc, content));
            }
        }
        ActionType::RemoveAttribute => {
            if let Some(name) = &action.name {
                edits.extend(remove_attribute_edit(element, doc, name));
            }
        }
        ActionType::RemoveChild => {
            if let Some(child) = &action.content {
                edits.extend(remove_child_edit(element, doc, child));
            }
        }
        ActionType::ReplaceElement => {
            if let Some(replacement) = &action.content {
                edits.push(TextEdit {
                    match_text: element.raw_text.clone(),
                    replacement: replacement.clone(),
                    line: doc.line_at(element.span.start),
                });
            }
        }
        ActionType::RenameElement => {
            if let Some(new_name) = &action.name {
                edits.extend(rename_edits(element, doc, new_name));
            }
        }
        ActionType::CreateResourceEntry => {
            resource = action.resource.clone();
        }
        ActionType::HighlightOnly => unreachable!(),
    }

    for secondary in &action.secondaries {
        match secondary {
            SecondaryAction::AddAttribute { name, value } => {
                edits.extend(add_attribute_edit(element, doc, name, value));
            }
            SecondaryAction::RemoveAttribute { name } => {
                edits.extend(remove_attribute_edit(element, doc, name));
            }
            SecondaryAction::RemoveDefaultValue => {
                edits.extend(remove_default_value_edit(element, doc));
            }
            SecondaryAction::AddXmlns { alias, namespace } => {
                edits.extend(add_xmlns_edit(doc, alias, namespace));
            }
        }
    }

    if edits.is_empty() && resource.is_none() {
        return None;
    }

    // Keep edits in document order for the executor
    edits.sort_by_key(|e| e.line);

    Some(Fix {
        description: if action.action_text.is_empty() {
            action.description.clone()
        } else {
            action.action_text.clone()
        },
        edits,
        resource,
    })
}

/// Adding an attribute that already exists replaces its value in place;
/// otherwise the attribute is inserted right after the element name.
fn add_attribute_edit(
    element: &XamlElement,
    doc: &XamlDocument,
    name: &str,
    value: &str,
) -> Option<TextEdit> {
    if let Some(existing) = element.attribute(name) {
        if existing.is_inline {
            return Some(TextEdit {
                match_text: format!("{}=\"{}\"", name, existing.value),
                replacement: format!("{}=\"{}\"", name, value),
                line: doc.line_at(element.span.start + existing.offset),
            });
        }
    }
    // Insert right after the element name, matching the tag however it is
    // written: `<TextBox `, `<TextBox/>`, or `<TextBox>`
    let open = format!("<{}", element.name);
    let opening = element.opening_tag();
    let (match_text, replacement) = if opening.starts_with(&format!("{} ", open)) {
        (
            format!("{} ", open),
            format!("{} {}=\"{}\" ", open, name, value),
        )
    } else if opening == format!("{}/>", open) {
        (
            format!("{}/>", open),
            format!("{} {}=\"{}\" />", open, name, value),
        )
    } else if opening.starts_with(&format!("{}>", open)) {
        (
            format!("{}>", open),
            format!("{} {}=\"{}\">", open, name, value),
        )
    } else {
        (open.clone(), format!("{} {}=\"{}\"", open, name, value))
    };
    Some(TextEdit {
        match_text,
        replacement,
        line: doc.line_at(element.span.start),
    })
}

fn remove_attribute_edit(
    element: &XamlElement,
    doc: &XamlDocument,
    name: &str,
) -> Option<TextEdit> {
    let attr = element.attribute(name)?;
    let line = doc.line_at(element.span.start + attr.offset);
    let match_text = if attr.is_inline {
        format!("{}=\"{}\"", attr.name, attr.value)
    } else {
        element.raw_text[attr.offset..attr.offset + attr.length].to_string()
    };
    Some(TextEdit {
        match_text,
        replacement: String::new(),
        line,
    })
}

fn add_child_edit(element: &XamlElement, doc: &XamlDocument, content: &str) -> Option<TextEdit> {
    let line = doc.line_at(element.span.start);
    if element.is_self_closing() {
        Some(TextEdit {
            match_text: "/>".to_string(),
            replacement: format!(
                ">\n{}\n{}</{}>",
                content, element.line_padding, element.name
            ),
            line,
        })
    } else {
        let opening = element.opening_tag().to_string();
        Some(TextEdit {
            match_text: opening.clone(),
            replacement: format!("{}\n{}", opening, content),
            line,
        })
    }
}

fn remove_child_edit(
    element: &XamlElement,
    doc: &XamlDocument,
    child_markup: &str,
) -> Option<TextEdit> {
    let offset = element.raw_text.find(child_markup)?;
    Some(TextEdit {
        match_text: child_markup.to_string(),
        replacement: String::new(),
        line: doc.line_at(element.span.start + offset),
    })
}

fn remove_default_value_edit(element: &XamlElement, doc: &XamlDocument) -> Option<TextEdit> {
    let content = element.content()?;
    let offset = element.raw_text.find(&content)?;
    Some(TextEdit {
        match_text: content,
        replacement: String::new(),
        line: doc.line_at(element.span.start + offset),
    })
}

/// Renaming touches the opening tag, the element's own closing tag, and both
/// markers of every child property-element prefixed by the old name - each as
/// an independent line-scoped replacement.
fn rename_edits(element: &XamlElement, doc: &XamlDocument, new_name: &str) -> Vec<TextEdit> {
    let old = &element.name;
    let mut edits = vec![TextEdit {
        match_text: format!("<{}", old),
        replacement: format!("<{}", new_name),
        line: doc.line_at(element.span.start),
    }];

    for attr in element.property_elements() {
        let open_line = doc.line_at(element.span.start + attr.offset);
        edits.push(TextEdit {
            match_text: format!("<{}.{}", old, attr.name),
            replacement: format!("<{}.{}", new_name, attr.name),
            line: open_line,
        });
        let close_marker = format!("</{}.{}>", old, attr.name);
        let close_offset = attr.offset + attr.length - close_marker.len();
        edits.push(TextEdit {
            match_text: close_marker,
            replacement: format!("</{}.{}>", new_name, attr.name),
            line: doc.line_at(element.span.start + close_offset),
        });
    }

    if !element.is_self_closing() {
        if let Some(close_offset) = element.raw_text.rfind(&format!("</{}", old)) {
            edits.push(TextEdit {
                match_text: format!("</{}", old),
                replacement: format!("</{}", new_name),
                line: doc.line_at(element.span.start + close_offset),
            });
        }
    }

    edits
}

/// The document's root element name and line, for xmlns insertion.
/// Skips the XML declaration and any leading comments.
fn root_element(doc: &XamlDocument) -> Option<(String, usize)> {
    let source = doc.source();
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            let rest = &source[i + 1..];
            if rest.starts_with('?') {
                i += source[i..].find("?>").map(|p| p + 2).unwrap_or(1);
                continue;
            }
            if rest.starts_with("!--") {
                i += source[i..].find("-->").map(|p| p + 3).unwrap_or(1);
                continue;
            }
            let name: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == ':' || *c == '_')
                .collect();
            if name.is_empty() {
                return None;
            }
            return Some((name, doc.line_at(i)));
        }
        i += 1;
    }
    None
}

fn add_xmlns_edit(doc: &XamlDocument, alias: &str, namespace: &str) -> Option<TextEdit> {
    let (root, line) = root_element(doc)?;
    Some(TextEdit {
        match_text: format!("<{}", root),
        replacement: format!("<{} xmlns:{}=\"{}\"", root, alias, namespace),
        line,
    })
}
