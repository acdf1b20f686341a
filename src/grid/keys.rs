//! Display-mode key bindings.

use super::Grid;
use crate::key::{new_binding, with_help, with_keys_str, Binding, KeyMap};

/// Bindings used while no cell is editing.
///
/// Editing cells use [`CommandKeyMap`](crate::command::CommandKeyMap)
/// instead, and so does structural edit mode, where save commits a rename,
/// cancel leaves the mode and tab/shift-tab move between header inputs.
#[derive(Debug, Clone)]
pub struct GridKeyMap {
    /// Cursor up one row.
    pub up: Binding,
    /// Cursor down one row.
    pub down: Binding,
    /// Cursor one column left.
    pub left: Binding,
    /// Cursor one column right.
    pub right: Binding,
    /// Edit the cell under the cursor.
    pub edit: Binding,
    /// Edit the cell, or activate the row when it cannot edit.
    pub activate: Binding,
    /// Ask for a new record.
    pub add_record: Binding,
    /// Ask to delete the record under the cursor.
    pub delete_record: Binding,
    /// Activate the header of the cursor column.
    pub sort: Binding,
    /// Toggle selection of the cursor row.
    pub select_row: Binding,
    /// Toggle the select-all box.
    pub select_all: Binding,
    /// Enter or leave structural edit mode.
    pub structure_edit: Binding,
    /// Ask for a new column.
    pub add_column: Binding,
    /// Ask to delete the cursor column.
    pub delete_column: Binding,
    /// Toggle uniqueness of the cursor column's field.
    pub toggle_unique: Binding,
}

impl Default for GridKeyMap {
    fn default() -> Self {
        Self {
            up: new_binding(vec![with_keys_str(&["up", "k"]), with_help("↑/k", "up")]),
            down: new_binding(vec![with_keys_str(&["down", "j"]), with_help("↓/j", "down")]),
            left: new_binding(vec![with_keys_str(&["left", "h"]), with_help("←/h", "left")]),
            right: new_binding(vec![with_keys_str(&["right", "l"]), with_help("→/l", "right")]),
            edit: new_binding(vec![with_keys_str(&["e"]), with_help("e", "edit")]),
            activate: new_binding(vec![with_keys_str(&["enter"]), with_help("enter", "open")]),
            add_record: new_binding(vec![with_keys_str(&["a"]), with_help("a", "add record")]),
            delete_record: new_binding(vec![
                with_keys_str(&["d"]),
                with_help("d", "delete record"),
            ]),
            sort: new_binding(vec![with_keys_str(&["s"]), with_help("s", "sort")]),
            select_row: new_binding(vec![with_keys_str(&["space"]), with_help("space", "select")]),
            select_all: new_binding(vec![
                with_keys_str(&["ctrl+a"]),
                with_help("ctrl+a", "select all"),
            ]),
            structure_edit: new_binding(vec![
                with_keys_str(&["ctrl+e"]),
                with_help("ctrl+e", "edit structure"),
            ]),
            add_column: new_binding(vec![
                with_keys_str(&["ctrl+n"]),
                with_help("ctrl+n", "add column"),
            ]),
            delete_column: new_binding(vec![
                with_keys_str(&["ctrl+x"]),
                with_help("ctrl+x", "delete column"),
            ]),
            toggle_unique: new_binding(vec![
                with_keys_str(&["ctrl+u"]),
                with_help("ctrl+u", "toggle unique"),
            ]),
        }
    }
}

impl KeyMap for GridKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.up, &self.down, &self.edit, &self.add_record, &self.sort]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![&self.up, &self.down, &self.left, &self.right],
            vec![&self.edit, &self.activate, &self.sort],
            vec![&self.add_record, &self.delete_record, &self.select_row, &self.select_all],
            vec![
                &self.structure_edit,
                &self.add_column,
                &self.delete_column,
                &self.toggle_unique,
            ],
        ]
    }
}

impl Grid {
    fn editor_bindings(&self) -> Option<&crate::cell::EditorKeyMap> {
        let (row, col) = self.active_editor()?;
        let editor = self.body.row(row)?.as_data()?.cell(col)?.editor()?;
        Some(&editor.key_map)
    }

    fn has_pages(&self) -> bool {
        self.collection.has_previous() || self.collection.has_next()
    }
}

/// Help follows the input mode: structural edit, an active editor, or
/// display mode.
impl KeyMap for Grid {
    fn short_help(&self) -> Vec<&Binding> {
        if self.header.is_structure_editing() {
            return vec![
                &self.command_keys.save,
                &self.command_keys.cancel,
                &self.keymap.toggle_unique,
                &self.keymap.delete_column,
            ];
        }
        if let Some(editor) = self.editor_bindings() {
            let mut bindings = self.command_keys.short_help();
            bindings.extend(editor.short_help());
            return bindings;
        }
        let mut bindings = self.keymap.short_help();
        if self.has_pages() {
            bindings.extend(self.paginator.keymap.short_help());
        }
        bindings
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        if self.header.is_structure_editing() {
            let mut groups = self.command_keys.full_help();
            groups.push(vec![
                &self.keymap.structure_edit,
                &self.keymap.add_column,
                &self.keymap.delete_column,
                &self.keymap.toggle_unique,
            ]);
            return groups;
        }
        if let Some(editor) = self.editor_bindings() {
            let mut groups = self.command_keys.full_help();
            groups.extend(editor.full_help());
            return groups;
        }
        let mut groups = self.keymap.full_help();
        if self.has_pages() {
            groups.extend(self.paginator.keymap.full_help());
        }
        groups
    }
}
