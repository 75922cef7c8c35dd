//! Fix application against an abstract text buffer
//!
//! The executor wraps every fix in an undo scope and guarantees the scope is
//! released even when an edit fails partway, so a host editor never ends up
//! with a dangling undo transaction.

use crate::actions::ResourceEntry;
use crate::tags::Fix;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("fix already applied (executor state: {0})")]
    NotIdle(ExecutorState),

    #[error("undo scope failed: {0}")]
    UndoScope(String),

    #[error("edit target failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The editing surface a fix is applied to. Implemented by the in-memory
/// [`BufferEditor`] here and by editor integrations elsewhere.
pub trait TextManipulation {
    fn open_undo_scope(&mut self, name: &str) -> Result<(), EditError>;

    fn close_undo_scope(&mut self) -> Result<(), EditError>;

    /// Replace the first occurrence of `find` on the 1-based `line`.
    /// Returns whether a replacement happened; a stale fix whose text no
    /// longer matches is a no-op, not an error.
    fn replace_on_line(&mut self, line: usize, find: &str, replace: &str)
        -> Result<bool, EditError>;

    fn add_resource_entry(&mut self, entry: &ResourceEntry) -> Result<(), EditError>;
}

/// Lifecycle of one fix application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    UndoScopeOpen,
    Applying,
    Closed,
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutorState::Idle => "idle",
            ExecutorState::UndoScopeOpen => "undo-scope-open",
            ExecutorState::Applying => "applying",
            ExecutorState::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}

/// Applies one fix, once. Create a fresh executor per fix.
#[derive(Debug)]
pub struct ActionExecutor {
    state: ExecutorState,
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionExecutor {
    pub fn new() -> Self {
        Self {
            state: ExecutorState::Idle,
        }
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    /// Apply every edit of the fix inside a single undo scope and report how
    /// many edits actually changed text. The scope is closed on every path
    /// once it has been opened.
    pub fn apply<T: TextManipulation>(
        &mut self,
        fix: &Fix,
        target: &mut T,
    ) -> Result<usize, EditError> {
        if self.state != ExecutorState::Idle {
            return Err(EditError::NotIdle(self.state));
        }

        self.state = ExecutorState::UndoScopeOpen;
        if let Err(err) = target.open_undo_scope(&fix.description) {
            self.state = ExecutorState::Closed;
            return Err(err);
        }

        self.state = ExecutorState::Applying;
        let result = Self::apply_edits(fix, target);
        let close_result = target.close_undo_scope();
        self.state = ExecutorState::Closed;

        let applied = result?;
        close_result?;
        Ok(applied)
    }

    fn apply_edits<T: TextManipulation>(fix: &Fix, target: &mut T) -> Result<usize, EditError> {
        let mut applied = 0;
        for edit in &fix.edits {
            if target.replace_on_line(edit.line, &edit.match_text, &edit.replacement)? {
                applied += 1;
            }
        }
        if let Some(entry) = &fix.resource {
            target.add_resource_entry(entry)?;
        }
        Ok(applied)
    }
}

/// In-memory edit target over the document's lines. Replacement text may
/// span several lines; it stays inside the addressed line's cell so the
/// line numbers of later edits keep addressing the original lines.
#[derive(Debug)]
pub struct BufferEditor {
    lines: Vec<String>,
    open_scopes: usize,
    resources: Vec<ResourceEntry>,
}

impl BufferEditor {
    pub fn new(source: &str) -> Self {
        Self {
            lines: source.split('\n').map(String::from).collect(),
            open_scopes: 0,
            resources: Vec::new(),
        }
    }

    /// The edited text
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    /// Resource entries collected during application, for the caller to
    /// persist
    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    pub fn open_scopes(&self) -> usize {
        self.open_scopes
    }
}

impl TextManipulation for BufferEditor {
    fn open_undo_scope(&mut self, _name: &str) -> Result<(), EditError> {
        self.open_scopes += 1;
        Ok(())
    }

    fn close_undo_scope(&mut self) -> Result<(), EditError> {
        self.open_scopes = self.open_scopes.saturating_sub(1);
        Ok(())
    }

    fn replace_on_line(
        &mut self,
        line: usize,
        find: &str,
        replace: &str,
    ) -> Result<bool, EditError> {
        let Some(cell) = line.checked_sub(1).and_then(|i| self.lines.get_mut(i)) else {
            return Ok(false);
        };
        match cell.find(find) {
            Some(pos) => {
                cell.replace_range(pos..pos + find.len(), replace);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn add_resource_entry(&mut self, entry: &ResourceEntry) -> Result<(), EditError> {
        self.resources.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TextEdit;
    use std::path::PathBuf;

    fn fix_with(edits: Vec<TextEdit>) -> Fix {
        Fix {
            description: "test fix".to_string(),
            edits,
            resource: None,
        }
    }

    fn edit(line: usize, find: &str, replace: &str) -> TextEdit {
        TextEdit {
            match_text: find.to_string(),
            replacement: replace.to_string(),
            line,
        }
    }

    #[test]
    fn test_apply_simple_edit() {
        let mut buffer = BufferEditor::new("<Grid>\n    <TextBox />\n</Grid>");
        let fix = fix_with(vec![edit(2, "<TextBox ", "<TextBox InputScope=\"Default\" ")]);
        let mut executor = ActionExecutor::new();
        let applied = executor.apply(&fix, &mut buffer).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(
            buffer.contents(),
            "<Grid>\n    <TextBox InputScope=\"Default\" />\n</Grid>"
        );
        assert_eq!(executor.state(), ExecutorState::Closed);
        assert_eq!(buffer.open_scopes(), 0);
    }

    #[test]
    fn test_multiline_replacement_keeps_later_lines_addressable() {
        let mut buffer = BufferEditor::new("<Grid />\n<TextBox Header=\"x\" />");
        let fix = fix_with(vec![
            edit(1, "/>", ">\n    <Grid.RowDefinitions />\n</Grid>"),
            edit(2, "Header=\"x\"", "Header=\"y\""),
        ]);
        let applied = ActionExecutor::new().apply(&fix, &mut buffer).unwrap();
        assert_eq!(applied, 2);
        let contents = buffer.contents();
        assert!(contents.contains("<Grid.RowDefinitions />"));
        assert!(contents.contains("Header=\"y\""));
    }

    #[test]
    fn test_stale_edit_is_a_noop() {
        let mut buffer = BufferEditor::new("<Grid />");
        let fix = fix_with(vec![edit(1, "<StackPanel", "<Panel")]);
        let applied = ActionExecutor::new().apply(&fix, &mut buffer).unwrap();
        assert_eq!(applied, 0);
        assert_eq!(buffer.contents(), "<Grid />");
    }

    #[test]
    fn test_out_of_range_line_is_a_noop() {
        let mut buffer = BufferEditor::new("<Grid />");
        let fix = fix_with(vec![edit(99, "<Grid", "<Panel")]);
        let applied = ActionExecutor::new().apply(&fix, &mut buffer).unwrap();
        assert_eq!(applied, 0);
    }

    #[test]
    fn test_executor_is_single_use() {
        let mut buffer = BufferEditor::new("<Grid />");
        let fix = fix_with(vec![]);
        let mut executor = ActionExecutor::new();
        executor.apply(&fix, &mut buffer).unwrap();
        let again = executor.apply(&fix, &mut buffer);
        assert!(matches!(again, Err(EditError::NotIdle(ExecutorState::Closed))));
    }

    #[test]
    fn test_resource_entry_is_collected() {
        let mut buffer = BufferEditor::new("<TextBlock Text=\"Hi\" />");
        let fix = Fix {
            description: "move to resources".to_string(),
            edits: vec![edit(1, "Text=\"Hi\"", "x:Uid=\"Hi\"")],
            resource: Some(ResourceEntry {
                key: "Hi".to_string(),
                value: "Hi".to_string(),
                file: PathBuf::from("Resources.resw"),
            }),
        };
        ActionExecutor::new().apply(&fix, &mut buffer).unwrap();
        assert_eq!(buffer.resources().len(), 1);
        assert_eq!(buffer.resources()[0].key, "Hi");
    }

    struct FailingTarget {
        scope_open: bool,
        scope_closed: bool,
    }

    impl TextManipulation for FailingTarget {
        fn open_undo_scope(&mut self, _name: &str) -> Result<(), EditError> {
            self.scope_open = true;
            Ok(())
        }

        fn close_undo_scope(&mut self) -> Result<(), EditError> {
            self.scope_closed = true;
            Ok(())
        }

        fn replace_on_line(
            &mut self,
            _line: usize,
            _find: &str,
            _replace: &str,
        ) -> Result<bool, EditError> {
            Err(EditError::Io(std::io::Error::other("buffer gone")))
        }

        fn add_resource_entry(&mut self, _entry: &ResourceEntry) -> Result<(), EditError> {
            Ok(())
        }
    }

    #[test]
    fn test_undo_scope_released_when_an_edit_fails() {
        let mut target = FailingTarget {
            scope_open: false,
            scope_closed: false,
        };
        let fix = fix_with(vec![edit(1, "a", "b")]);
        let mut executor = ActionExecutor::new();
        let result = executor.apply(&fix, &mut target);
        assert!(result.is_err());
        assert!(target.scope_open);
        assert!(target.scope_closed);
        assert_eq!(executor.state(), ExecutorState::Closed);
    }
}
