//! RXT101-RXT104: Grid row and column assignments that exceed the
//! declared definitions

use crate::actions::AnalysisActions;
use crate::document::XamlDocument;
use crate::element::XamlElement;
use crate::processors::{AnalysisContext, ProcessorError, XamlElementProcessor};
use crate::tags::Severity;
use once_cell::sync::Lazy;
use regex::Regex;

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Grid\.(Row|Column|RowSpan|ColumnSpan)\s*=\s*"(\d+)""#).unwrap()
});

#[derive(Debug, Default)]
pub struct GridProcessor;

#[derive(Debug, Default)]
struct Assignments {
    max_row: Option<u32>,
    max_column: Option<u32>,
    /// Greatest `Grid.Row + Grid.RowSpan` seen on a single child
    max_row_reach: Option<u32>,
    max_column_reach: Option<u32>,
}

impl XamlElementProcessor for GridProcessor {
    fn name(&self) -> &str {
        "grid-definitions"
    }

    fn process(
        &self,
        element: &XamlElement,
        _doc: &XamlDocument,
        _ctx: &mut AnalysisContext,
    ) -> Result<AnalysisActions, ProcessorError> {
        let assignments = collect_assignments(element);
        let rows = count_definitions(element, "RowDefinitions", "<RowDefinition");
        let columns = count_definitions(element, "ColumnDefinitions", "<ColumnDefinition");

        let mut actions = AnalysisActions::none();

        if let Some(max_row) = assignments.max_row {
            if max_row >= effective(rows) {
                let description = format!(
                    "Grid.Row value {} used but only {} row(s) are defined.",
                    max_row,
                    effective(rows)
                );
                actions = actions.extend(missing_definition(
                    element,
                    "RXT101",
                    "Row",
                    description,
                    max_row + 1,
                    rows,
                ));
            }
        }
        if let Some(max_column) = assignments.max_column {
            if max_column >= effective(columns) {
                let description = format!(
                    "Grid.Column value {} used but only {} column(s) are defined.",
                    max_column,
                    effective(columns)
                );
                actions = actions.extend(missing_definition(
                    element,
                    "RXT102",
                    "Column",
                    description,
                    max_column + 1,
                    columns,
                ));
            }
        }
        if let Some(reach) = assignments.max_row_reach {
            if reach > effective(rows) {
                let description = format!(
                    "Grid.RowSpan reaches row {} but only {} row(s) are defined.",
                    reach,
                    effective(rows)
                );
                actions = actions.extend(missing_definition(
                    element,
                    "RXT103",
                    "Row",
                    description,
                    reach,
                    rows,
                ));
            }
        }
        if let Some(reach) = assignments.max_column_reach {
            if reach > effective(columns) {
                let description = format!(
                    "Grid.ColumnSpan reaches column {} but only {} column(s) are defined.",
                    reach,
                    effective(columns)
                );
                actions = actions.extend(missing_definition(
                    element,
                    "RXT104",
                    "Column",
                    description,
                    reach,
                    columns,
                ));
            }
        }

        Ok(actions)
    }
}

/// A grid with no definitions still has one implicit row and column
fn effective(defined: u32) -> u32 {
    defined.max(1)
}

/// Count declared definitions, in either the property-element form or the
/// WinUI inline shorthand (`RowDefinitions="Auto,*"`).
fn count_definitions(element: &XamlElement, attribute: &str, marker: &str) -> u32 {
    match element.attribute(attribute) {
        Some(attr) if attr.is_inline => attr.value.split(',').filter(|p| !p.trim().is_empty()).count() as u32,
        Some(attr) => attr.value.matches(marker).count() as u32,
        None => 0,
    }
}

/// Scan the grid's body for `Grid.Row` style assignments on direct and
/// indirect children, skipping anything inside a nested grid - those
/// assignments address the inner grid's definitions.
fn collect_assignments(element: &XamlElement) -> Assignments {
    let body_start = element.opening_tag().len();
    let nested = nested_grid_ranges(&element.raw_text, body_start);

    let mut out = Assignments::default();
    let mut row_at: Option<(usize, u32)> = None;
    let mut column_at: Option<(usize, u32)> = None;

    for capture in ASSIGNMENT.captures_iter(&element.raw_text) {
        let whole = capture.get(0).map(|m| m.range()).unwrap_or_default();
        if whole.start < body_start || nested.iter().any(|r| r.contains(&whole.start)) {
            continue;
        }
        let value: u32 = match capture[2].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match &capture[1] {
            "Row" => {
                out.max_row = Some(out.max_row.map_or(value, |m| m.max(value)));
                row_at = Some((whole.start, value));
            }
            "Column" => {
                out.max_column = Some(out.max_column.map_or(value, |m| m.max(value)));
                column_at = Some((whole.start, value));
            }
            "RowSpan" => {
                // Pair the span with the row assignment on the same tag; a
                // span with no row assignment spans from row zero
                let base = row_at
                    .filter(|(pos, _)| same_tag(&element.raw_text, *pos, whole.start))
                    .map_or(0, |(_, v)| v);
                let reach = base + value;
                out.max_row_reach = Some(out.max_row_reach.map_or(reach, |m| m.max(reach)));
            }
            "ColumnSpan" => {
                let base = column_at
                    .filter(|(pos, _)| same_tag(&element.raw_text, *pos, whole.start))
                    .map_or(0, |(_, v)| v);
                let reach = base + value;
                out.max_column_reach = Some(out.max_column_reach.map_or(reach, |m| m.max(reach)));
            }
            _ => {}
        }
    }

    out
}

/// Two attribute offsets belong to the same tag when no `<` or `>` sits
/// between them.
fn same_tag(raw: &str, earlier: usize, later: usize) -> bool {
    !raw[earlier..later].contains(['<', '>'])
}

/// Byte ranges of nested grids' bodies within this grid's body, found by
/// depth counting. Only the body is excluded: `Grid.Row` and friends on the
/// nested grid's own opening tag address THIS grid's definitions, so they
/// must stay visible. A self-closing nested grid has no body at all.
fn nested_grid_ranges(raw: &str, body_start: usize) -> Vec<std::ops::Range<usize>> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut body_from = 0usize;
    let mut i = body_start;

    while i < raw.len() {
        let rest = &raw[i..];
        if rest.starts_with("<Grid")
            && rest[5..]
                .chars()
                .next()
                .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
        {
            let tag_end = rest.find('>').map(|p| i + p).unwrap_or(raw.len());
            // Self-closing nested grids close immediately and contribute
            // no body
            if !raw[i..tag_end].trim_end().ends_with('/') {
                if depth == 0 {
                    body_from = (tag_end + 1).min(raw.len());
                }
                depth += 1;
            }
            i = tag_end;
        } else if rest.starts_with("</Grid>") {
            if depth > 0 {
                depth -= 1;
                if depth == 0 {
                    ranges.push(body_from..i + "</Grid>".len());
                }
            }
            i += "</Grid>".len();
            continue;
        }
        i += 1;
    }

    ranges
}

/// The fix inserts a full definitions block sized to the greatest
/// requirement; when the grid already declares some definitions the
/// diagnostic is raised without a fix rather than guessing where to splice
/// extra ones.
fn missing_definition(
    element: &XamlElement,
    code: &str,
    axis: &str,
    description: String,
    required: u32,
    defined: u32,
) -> AnalysisActions {
    if defined > 0 {
        return AnalysisActions::highlight_only(Severity::Warning, code, description);
    }

    let pad = &element.line_padding;
    let size_attr = if axis == "Row" { "Height" } else { "Width" };
    let mut block = format!("{}    <Grid.{}Definitions>\n", pad, axis);
    for _ in 0..required {
        block.push_str(&format!(
            "{}        <{}Definition {}=\"*\" />\n",
            pad, axis, size_attr
        ));
    }
    block.push_str(&format!("{}    </Grid.{}Definitions>", pad, axis));

    AnalysisActions::add_child(
        Severity::Warning,
        code,
        description,
        format!("Add the missing {}Definitions", axis),
        block,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionType;
    use crate::element::ElementSpan;
    use crate::project::{NullResolver, ProjectFramework};
    use std::sync::Arc;

    fn grid_from(source: &str) -> (XamlDocument, XamlElement) {
        let doc = XamlDocument::new(source);
        let element = XamlElement::new("Grid", ElementSpan::new(0, source.len()), source, "");
        (doc, element)
    }

    fn ctx() -> AnalysisContext {
        AnalysisContext::new(ProjectFramework::Uwp, "Page.xaml", Arc::new(NullResolver))
    }

    #[test]
    fn test_grid_within_definitions_is_clean() {
        let source = concat!(
            "<Grid>\n",
            "    <Grid.RowDefinitions>\n",
            "        <RowDefinition Height=\"Auto\" />\n",
            "        <RowDefinition Height=\"*\" />\n",
            "    </Grid.RowDefinitions>\n",
            "    <TextBlock Grid.Row=\"1\" />\n",
            "</Grid>"
        );
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert!(actions.is_none());
    }

    #[test]
    fn test_row_beyond_definitions_without_block_offers_fix() {
        let source = "<Grid>\n    <TextBlock Grid.Row=\"2\" />\n</Grid>";
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert_eq!(actions.actions().len(), 1);
        let action = &actions.actions()[0];
        assert_eq!(action.code, "RXT101");
        assert_eq!(action.action, ActionType::AddChild);
        let content = action.content.as_ref().unwrap();
        assert_eq!(content.matches("<RowDefinition").count(), 3);
    }

    #[test]
    fn test_row_beyond_existing_definitions_highlights_only() {
        let source = concat!(
            "<Grid>\n",
            "    <Grid.RowDefinitions>\n",
            "        <RowDefinition Height=\"*\" />\n",
            "    </Grid.RowDefinitions>\n",
            "    <TextBlock Grid.Row=\"1\" />\n",
            "</Grid>"
        );
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert_eq!(actions.actions().len(), 1);
        assert_eq!(actions.actions()[0].code, "RXT101");
        assert_eq!(actions.actions()[0].action, ActionType::HighlightOnly);
    }

    #[test]
    fn test_inline_shorthand_definitions_are_counted() {
        let source = "<Grid RowDefinitions=\"Auto,*,*\">\n    <TextBlock Grid.Row=\"2\" />\n</Grid>";
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert!(actions.is_none());
    }

    #[test]
    fn test_column_beyond_definitions() {
        let source = "<Grid ColumnDefinitions=\"*,*\">\n    <TextBlock Grid.Column=\"2\" />\n</Grid>";
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert_eq!(actions.actions()[0].code, "RXT102");
    }

    #[test]
    fn test_implicit_single_row_allows_row_zero() {
        let source = "<Grid>\n    <TextBlock Grid.Row=\"0\" />\n</Grid>";
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert!(actions.is_none());
    }

    #[test]
    fn test_nested_grid_assignments_are_excluded() {
        let source = concat!(
            "<Grid RowDefinitions=\"*\">\n",
            "    <Grid RowDefinitions=\"*,*,*\">\n",
            "        <TextBlock Grid.Row=\"2\" />\n",
            "    </Grid>\n",
            "</Grid>"
        );
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert!(actions.is_none());
    }

    #[test]
    fn test_nested_grid_own_assignment_addresses_outer_grid() {
        // Grid.Row on the nested grid's opening tag places the nested grid
        // in THIS grid's rows
        let source = concat!(
            "<Grid RowDefinitions=\"*\">\n",
            "    <Grid Grid.Row=\"5\" RowDefinitions=\"*,*,*,*,*,*\">\n",
            "        <TextBlock Grid.Row=\"5\" />\n",
            "    </Grid>\n",
            "</Grid>"
        );
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert_eq!(actions.actions().len(), 1);
        assert_eq!(actions.actions()[0].code, "RXT101");
    }

    #[test]
    fn test_self_closing_nested_grid_assignment_counts() {
        let source = "<Grid>\n    <Grid Grid.Row=\"2\" />\n</Grid>";
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert_eq!(actions.actions().len(), 1);
        assert_eq!(actions.actions()[0].code, "RXT101");
        assert_eq!(actions.actions()[0].action, ActionType::AddChild);
    }

    #[test]
    fn test_row_span_overflow() {
        let source = concat!(
            "<Grid RowDefinitions=\"*,*\">\n",
            "    <TextBlock Grid.Row=\"1\" Grid.RowSpan=\"2\" />\n",
            "</Grid>"
        );
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert_eq!(actions.actions().len(), 1);
        assert_eq!(actions.actions()[0].code, "RXT103");
        assert_eq!(actions.actions()[0].action, ActionType::HighlightOnly);
    }

    #[test]
    fn test_row_span_overflow_without_definitions_offers_fix() {
        let source = "<Grid>\n    <TextBlock Grid.RowSpan=\"2\" />\n</Grid>";
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert_eq!(actions.actions().len(), 1);
        let action = &actions.actions()[0];
        assert_eq!(action.code, "RXT103");
        assert_eq!(action.action, ActionType::AddChild);
        let content = action.content.as_ref().unwrap();
        assert_eq!(content.matches("<RowDefinition").count(), 2);
    }

    #[test]
    fn test_column_span_within_bounds() {
        let source = concat!(
            "<Grid ColumnDefinitions=\"*,*,*\">\n",
            "    <TextBlock Grid.Column=\"1\" Grid.ColumnSpan=\"2\" />\n",
            "</Grid>"
        );
        let (doc, element) = grid_from(source);
        let actions = GridProcessor.process(&element, &doc, &mut ctx()).unwrap();
        assert!(actions.is_none());
    }
}
