//! Cells: one (record, column) pair with a display/editing state machine.
//!
//! A cell is either displaying its value or editing it. Editing is possible
//! only when the column is editable, the record is writable and the column's
//! [`CellKind`] owns an editor; requests on any other cell are ignored. While
//! editing, input goes to an [`Editor`]; on a save or navigation command the
//! buffered text is parsed by the kind and either written to the record or
//! reported back as a commit for the host to persist.
//!
//! Cells hold no reference to their column or record. Both are passed in on
//! every call by the owning grid.

mod editor;
mod kind;

#[cfg(test)]
mod tests;

pub use editor::{Editor, EditorKeyMap};
pub use kind::{Affordance, CellContext, CellKind, CellView, Tone};

use crate::column::Column;
use crate::command::Command;
use crate::error::ValidationError;
use crate::record::{Record, Value};
use bubbletea_rs::KeyMsg;
use tracing::debug;

/// Where a parsed value goes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellWrite {
    /// Set directly on an unsaved record.
    Set(Value),
    /// Persisted record; the host must commit the change.
    Commit(Value),
}

/// Result of a save or navigation command on an editing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The cell was not editing, or the command does not end an edit.
    Ignored,
    /// The input failed validation; the cell stays in edit mode.
    Invalid(ValidationError),
    /// The edit finished. `write` is `None` when the value is unchanged or
    /// the edit was cancelled.
    Edited {
        /// Command that ended the edit.
        command: Command,
        /// Value to write, if any.
        write: Option<CellWrite>,
    },
}

/// One grid cell.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    edit_mode: bool,
    row_editing: bool,
    editor: Option<Editor>,
    error: Option<ValidationError>,
}

impl Cell {
    /// Creates a display-mode cell. A cell created inside a row that is
    /// already in row edit mode starts editing when it can.
    pub fn new(column: &Column, record: &Record, row_editing: bool) -> Self {
        let mut cell = Self::default();
        cell.set_row_editing(row_editing, column, record);
        cell
    }

    /// Whether this (column, record) pair may enter edit mode.
    pub fn is_editable(column: &Column, record: &Record) -> bool {
        column.editable
            && record.is_writable()
            && !record.is_placeholder()
            && column.kind.supports_editing()
    }

    /// The cell's own edit flag, independent of row edit mode.
    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// True while an editor is live.
    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    /// The live editor.
    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    /// Last validation failure, cleared on exit and on the next edit.
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    fn open_editor(&mut self, column: &Column, record: &Record) {
        if self.editor.is_none() {
            let text = column.kind.format(record.get(&column.name));
            self.editor = Some(Editor::new(&text).with_char_limit(column.max_length));
        }
    }

    /// Display → Editing. Returns false, changing nothing, when the cell is
    /// not editable.
    pub fn enter_edit_mode(&mut self, column: &Column, record: &Record) -> bool {
        if !Self::is_editable(column, record) {
            return false;
        }
        self.edit_mode = true;
        self.open_editor(column, record);
        debug!(column = %column.name, record = %record.key(), "cell entered edit mode");
        true
    }

    /// Editing → Display, unless the row keeps the cell editing.
    pub fn exit_edit_mode(&mut self) {
        self.edit_mode = false;
        if !self.row_editing {
            self.editor = None;
            self.error = None;
        }
    }

    /// Follows the owning row in or out of row edit mode.
    pub fn set_row_editing(&mut self, editing: bool, column: &Column, record: &Record) {
        self.row_editing = editing;
        if editing && Self::is_editable(column, record) {
            self.open_editor(column, record);
        } else if !self.edit_mode {
            self.editor = None;
            self.error = None;
        }
    }

    /// Sends a key to the editor. Returns true when it was consumed.
    pub fn handle_key(&mut self, msg: &KeyMsg) -> bool {
        match self.editor.as_mut() {
            Some(editor) => {
                let consumed = editor.handle_key(msg);
                if consumed {
                    self.error = None;
                }
                consumed
            }
            None => false,
        }
    }

    /// Ends or attempts to end an edit.
    ///
    /// `Cancel` discards the buffer. Every other command parses the buffer;
    /// invalid input keeps the cell editing with an error and writes
    /// nothing. Valid input becomes a [`CellWrite::Set`] for unsaved records
    /// and a [`CellWrite::Commit`] for persisted ones, or no write when the
    /// value is unchanged. The caller applies the write and performs the
    /// navigation.
    pub fn save_or_cancel(&mut self, command: Command, column: &Column, record: &Record) -> EditOutcome {
        let Some(editor) = self.editor.as_ref() else {
            return EditOutcome::Ignored;
        };
        if command == Command::Cancel {
            self.error = None;
            return EditOutcome::Edited {
                command,
                write: None,
            };
        }
        match column.kind.parse(&editor.value(), column) {
            Err(err) => {
                debug!(column = %column.name, error = %err, "cell input rejected");
                self.error = Some(err.clone());
                EditOutcome::Invalid(err)
            }
            Ok(value) => {
                self.error = None;
                let write = if &value == record.get(&column.name) {
                    None
                } else if record.is_new() {
                    Some(CellWrite::Set(value))
                } else {
                    Some(CellWrite::Commit(value))
                };
                EditOutcome::Edited { command, write }
            }
        }
    }

    /// Reloads a live editor from the record, e.g. after a revert.
    pub fn refresh(&mut self, column: &Column, record: &Record) {
        if let Some(editor) = self.editor.as_mut() {
            editor.set_value(&column.kind.format(record.get(&column.name)));
        }
        self.error = None;
    }

    /// Display-mode rendering.
    pub fn view(&self, column: &Column, record: &Record, ctx: CellContext) -> CellView {
        let editable = Self::is_editable(column, record);
        column.kind.render(column, record, editable, ctx)
    }

    /// Natural width of the cell's content.
    pub fn text_width(&self, column: &Column, record: &Record) -> usize {
        match &self.editor {
            Some(editor) => {
                use unicode_width::UnicodeWidthStr;
                editor.value().width() + 1
            }
            None => column.kind.natural_width(column, record),
        }
    }
}
