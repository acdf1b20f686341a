//! Header row: one header cell per column.
//!
//! Header cells carry the sort direction of their column and, while the
//! header row is in structural edit mode, an inline rename editor for
//! writable field columns.

use crate::cell::Editor;
use crate::column::{Column, ColumnEvent};
use crate::record::{SortDirection, SortOrder};
use bubbletea_rs::KeyMsg;
use std::collections::HashMap;
use tracing::debug;

/// Header cell variant of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderKind {
    /// Column label; sorts on activation, renames in structural edit.
    #[default]
    Label,
    /// Requests a new record.
    AddRecord,
    /// Requests a new column.
    AddColumn,
    /// Leaves structural edit mode.
    ApplyStructure,
    /// Selects or unselects every record.
    SelectAll,
}

/// Result of activating a sortable header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortChange {
    /// The column is not sortable.
    Unchanged,
    /// Install this comparator.
    Sorted(SortOrder),
    /// Restore insertion order.
    Unsorted,
}

/// One header cell.
#[derive(Debug, Clone)]
pub struct HeaderCell {
    name: String,
    kind: HeaderKind,
    direction: Option<SortDirection>,
    rename: Option<Editor>,
    width: usize,
}

impl HeaderCell {
    fn new(column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            kind: column.header,
            direction: None,
            rename: None,
            width: 0,
        }
    }

    /// Header variant.
    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    /// Current sort direction, `None` when unsorted.
    pub fn direction(&self) -> Option<SortDirection> {
        self.direction
    }

    /// Live rename editor in structural edit mode.
    pub fn rename_editor(&self) -> Option<&Editor> {
        self.rename.as_ref()
    }

    /// Laid-out width.
    pub fn width(&self) -> usize {
        self.width
    }

    fn is_renamable(column: &Column) -> bool {
        column.header == HeaderKind::Label && column.writable && !column.is_structural()
    }
}

/// The header: a row of [`HeaderCell`]s parallel to the columns.
#[derive(Debug, Clone, Default)]
pub struct Header {
    cells: Vec<HeaderCell>,
    edit_mode: bool,
}

impl Header {
    /// Creates a header for `columns`.
    pub fn new(columns: &[Column]) -> Self {
        Self {
            cells: columns.iter().map(HeaderCell::new).collect(),
            edit_mode: false,
        }
    }

    /// Header cells in column order.
    pub fn cells(&self) -> &[HeaderCell] {
        &self.cells
    }

    /// Header cell at `index`.
    pub fn cell(&self, index: usize) -> Option<&HeaderCell> {
        self.cells.get(index)
    }

    fn make_cell(&self, column: &Column) -> HeaderCell {
        let mut cell = HeaderCell::new(column);
        if self.edit_mode && HeaderCell::is_renamable(column) {
            cell.rename = Some(Editor::new(&column.label));
        }
        cell
    }

    /// Mirrors a column mutation.
    pub fn on_column_event(&mut self, event: &ColumnEvent, columns: &[Column]) {
        match event {
            ColumnEvent::Added { index } => {
                if let Some(column) = columns.get(*index) {
                    let cell = self.make_cell(column);
                    self.cells.insert((*index).min(self.cells.len()), cell);
                }
            }
            ColumnEvent::Removed { index, .. } => {
                if *index < self.cells.len() {
                    self.cells.remove(*index);
                }
            }
            ColumnEvent::Reset => {
                let directions: HashMap<String, SortDirection> = self
                    .cells
                    .iter()
                    .filter_map(|c| c.direction.map(|d| (c.name.clone(), d)))
                    .collect();
                self.cells = columns
                    .iter()
                    .map(|column| {
                        let mut cell = self.make_cell(column);
                        cell.direction = directions.get(&column.name).copied();
                        cell
                    })
                    .collect();
            }
            ColumnEvent::Changed { index } => {
                if let (Some(column), Some(cell)) = (columns.get(*index), self.cells.get_mut(*index)) {
                    cell.kind = column.header;
                    let renamable = self.edit_mode && HeaderCell::is_renamable(column);
                    match (renamable, cell.rename.is_some()) {
                        (true, false) => cell.rename = Some(Editor::new(&column.label)),
                        (false, true) => cell.rename = None,
                        _ => {}
                    }
                    if !column.sortable {
                        cell.direction = None;
                    }
                }
            }
        }
    }

    /// Cycles the sort direction of the column at `index`:
    /// unsorted → ascending → descending → unsorted. Every other header is
    /// reset to unsorted.
    pub fn toggle_sort(&mut self, index: usize, columns: &[Column]) -> SortChange {
        let Some(column) = columns.get(index).filter(|c| c.sortable) else {
            return SortChange::Unchanged;
        };
        let Some(current) = self.cells.get(index).map(|c| c.direction) else {
            return SortChange::Unchanged;
        };
        let next = match current {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        };
        for (i, cell) in self.cells.iter_mut().enumerate() {
            cell.direction = if i == index { next } else { None };
        }
        debug!(column = %column.name, direction = ?next, "sort toggled");
        match next {
            Some(direction) => SortChange::Sorted(SortOrder {
                attr: column.name.clone(),
                direction,
            }),
            None => SortChange::Unsorted,
        }
    }

    /// True while the header row is in structural edit mode.
    pub fn is_structure_editing(&self) -> bool {
        self.edit_mode
    }

    /// Enters or leaves structural edit mode. Writable field headers gain a
    /// rename editor seeded with the label.
    pub fn set_structure_editing(&mut self, editing: bool, columns: &[Column]) {
        self.edit_mode = editing;
        for (cell, column) in self.cells.iter_mut().zip(columns) {
            cell.rename = (editing && HeaderCell::is_renamable(column))
                .then(|| Editor::new(&column.label));
        }
    }

    /// Sends a key to the rename editor at `index`.
    pub fn rename_key(&mut self, index: usize, msg: &KeyMsg) -> bool {
        self.cells
            .get_mut(index)
            .and_then(|c| c.rename.as_mut())
            .is_some_and(|editor| editor.handle_key(msg))
    }

    /// Trimmed rename input at `index` when it differs from the column's
    /// label. Blank input is refused and the editor is reset to the label.
    pub fn commit_rename(&mut self, index: usize, column: &Column) -> Option<String> {
        let editor = self.cells.get_mut(index)?.rename.as_mut()?;
        let value = editor.value().trim().to_string();
        if value.is_empty() {
            editor.set_value(&column.label);
            return None;
        }
        (value != column.label).then_some(value)
    }

    /// Applies laid-out widths.
    pub fn set_widths(&mut self, widths: &[usize]) {
        for (cell, width) in self.cells.iter_mut().zip(widths) {
            cell.width = *width;
        }
    }

    /// Widths currently applied.
    pub fn widths(&self) -> Vec<usize> {
        self.cells.iter().map(|c| c.width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn field(name: &str) -> Column {
        let mut column = Column::new(name, name.to_uppercase())
            .with_kind(CellKind::Text)
            .with_sortable(true);
        column.writable = true;
        column.field = Some(name.to_string());
        column
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("add", "").with_header(HeaderKind::AddRecord),
            field("a"),
            field("b"),
        ]
    }

    #[test]
    fn test_sort_cycle() {
        let columns = columns();
        let mut header = Header::new(&columns);
        let asc = header.toggle_sort(1, &columns);
        assert_eq!(
            asc,
            SortChange::Sorted(SortOrder {
                attr: "a".into(),
                direction: SortDirection::Ascending
            })
        );
        assert!(matches!(
            header.toggle_sort(1, &columns),
            SortChange::Sorted(SortOrder {
                direction: SortDirection::Descending,
                ..
            })
        ));
        assert_eq!(header.toggle_sort(1, &columns), SortChange::Unsorted);
        assert_eq!(header.cell(1).unwrap().direction(), None);
    }

    #[test]
    fn test_sorting_one_column_clears_others() {
        let columns = columns();
        let mut header = Header::new(&columns);
        header.toggle_sort(1, &columns);
        header.toggle_sort(2, &columns);
        assert_eq!(header.cell(1).unwrap().direction(), None);
        assert_eq!(header.cell(2).unwrap().direction(), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_unsortable_column_is_unchanged() {
        let columns = columns();
        let mut header = Header::new(&columns);
        assert_eq!(header.toggle_sort(0, &columns), SortChange::Unchanged);
        assert_eq!(header.toggle_sort(7, &columns), SortChange::Unchanged);
    }

    #[test]
    fn test_structure_edit_renames_writable_fields() {
        let mut columns = columns();
        columns[2].writable = false;
        let mut header = Header::new(&columns);
        header.set_structure_editing(true, &columns);
        assert!(header.cell(0).unwrap().rename_editor().is_none());
        assert!(header.cell(1).unwrap().rename_editor().is_some());
        assert!(header.cell(2).unwrap().rename_editor().is_none());

        for c in "x ".chars() {
            header.rename_key(
                1,
                &KeyMsg {
                    key: KeyCode::Char(c),
                    modifiers: KeyModifiers::NONE,
                },
            );
        }
        assert_eq!(header.commit_rename(1, &columns[1]), Some("Ax".to_string()));

        header.set_structure_editing(false, &columns);
        assert!(header.cell(1).unwrap().rename_editor().is_none());
    }

    #[test]
    fn test_blank_rename_is_refused() {
        let columns = columns();
        let mut header = Header::new(&columns);
        header.set_structure_editing(true, &columns);
        header.rename_key(
            1,
            &KeyMsg {
                key: KeyCode::Char('u'),
                modifiers: KeyModifiers::CONTROL,
            },
        );
        assert_eq!(header.commit_rename(1, &columns[1]), None);
        assert_eq!(
            header.cell(1).unwrap().rename_editor().map(Editor::value),
            Some("A".to_string())
        );
    }

    #[test]
    fn test_column_events_keep_cells_parallel() {
        let mut columns = columns();
        let mut header = Header::new(&columns);
        header.toggle_sort(2, &columns);

        columns.insert(1, field("z"));
        header.on_column_event(&ColumnEvent::Added { index: 1 }, &columns);
        assert_eq!(header.cells().len(), 4);
        assert_eq!(header.cell(3).unwrap().direction(), Some(SortDirection::Ascending));

        columns.remove(1);
        header.on_column_event(
            &ColumnEvent::Removed {
                index: 1,
                name: "z".into(),
            },
            &columns,
        );
        header.on_column_event(&ColumnEvent::Reset, &columns);
        assert_eq!(header.cells().len(), 3);
        assert_eq!(header.cell(2).unwrap().direction(), Some(SortDirection::Ascending));
    }
}
