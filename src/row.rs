//! Rows: one per record, holding one cell per column.

use crate::cell::{Cell, EditOutcome};
use crate::column::Column;
use crate::command::Command;
use crate::record::{Record, RecordKey};
use tracing::debug;

/// A row bound to a data record.
#[derive(Debug, Clone)]
pub struct DataRow {
    key: RecordKey,
    cells: Vec<Cell>,
    edit_mode: bool,
    checked: bool,
    pinned: bool,
    focus: Option<usize>,
}

impl DataRow {
    /// Creates a row with one display-mode cell per column.
    pub fn new(record: &Record, columns: &[Column]) -> Self {
        Self {
            key: record.key(),
            cells: columns.iter().map(|c| Cell::new(c, record, false)).collect(),
            edit_mode: false,
            checked: false,
            pinned: false,
            focus: None,
        }
    }

    /// Key of the bound record.
    pub fn key(&self) -> RecordKey {
        self.key
    }

    /// Cells in column order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at column `index`.
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Mutable cell at column `index`.
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// Instantiates the cell for `column`, following the row's edit mode.
    pub fn make_cell(&self, column: &Column, record: &Record) -> Cell {
        Cell::new(column, record, self.edit_mode)
    }

    /// Inserts a cell for a newly added column.
    pub fn insert_cell(&mut self, index: usize, column: &Column, record: &Record) {
        let cell = self.make_cell(column, record);
        let index = index.min(self.cells.len());
        self.cells.insert(index, cell);
        if let Some(focus) = self.focus.as_mut() {
            if *focus >= index {
                *focus += 1;
            }
        }
    }

    /// Removes the cell of a removed column, dropping any edit in progress.
    pub fn remove_cell(&mut self, index: usize) -> Option<Cell> {
        if index >= self.cells.len() {
            return None;
        }
        let cell = self.cells.remove(index);
        self.focus = match self.focus {
            Some(f) if f == index => None,
            Some(f) if f > index => Some(f - 1),
            other => other,
        };
        Some(cell)
    }

    /// Rebuilds every cell.
    pub fn reset_cells(&mut self, columns: &[Column], record: &Record) {
        self.cells = columns.iter().map(|c| self.make_cell(c, record)).collect();
        self.focus = if self.edit_mode {
            first_editable(columns, record, 0..columns.len())
        } else {
            None
        };
    }

    /// Re-derives the cell of a changed column. A cell that can no longer
    /// edit is rebuilt in display mode.
    pub fn change_cell(&mut self, index: usize, column: &Column, record: &Record) {
        let edit_mode = self.edit_mode;
        if let Some(cell) = self.cells.get_mut(index) {
            if !Cell::is_editable(column, record) {
                *cell = Cell::new(column, record, edit_mode);
            }
        }
    }

    /// True while the whole row is editing.
    pub fn is_editing(&self) -> bool {
        self.edit_mode
    }

    /// Puts every editable cell into editing and focuses the first one.
    pub fn enter_edit_mode(&mut self, columns: &[Column], record: &Record) {
        self.edit_mode = true;
        for (cell, column) in self.cells.iter_mut().zip(columns) {
            cell.set_row_editing(true, column, record);
        }
        self.focus = first_editable(columns, record, 0..columns.len());
        debug!(record = %self.key, "row entered edit mode");
    }

    /// Returns every cell to display mode.
    pub fn exit_edit_mode(&mut self, columns: &[Column], record: &Record) {
        self.edit_mode = false;
        for (cell, column) in self.cells.iter_mut().zip(columns) {
            cell.exit_edit_mode();
            cell.set_row_editing(false, column, record);
        }
        self.focus = None;
        debug!(record = %self.key, "row left edit mode");
    }

    /// Column index of the focused editor in row edit mode.
    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Moves row-local editor focus to `index` when that cell is editing.
    pub fn set_focus(&mut self, index: usize) -> bool {
        if self.cells.get(index).is_some_and(Cell::is_editing) {
            self.focus = Some(index);
            true
        } else {
            false
        }
    }

    /// Moves row-local editor focus to the next editable cell; stays put at
    /// the end of the row.
    pub fn focus_next(&mut self, columns: &[Column], record: &Record) -> bool {
        let start = self.focus.map_or(0, |f| f + 1);
        match first_editable(columns, record, start..columns.len()) {
            Some(next) => {
                self.focus = Some(next);
                true
            }
            None => false,
        }
    }

    /// Moves row-local editor focus to the previous editable cell; stays put
    /// at the start of the row.
    pub fn focus_prev(&mut self, columns: &[Column], record: &Record) -> bool {
        let end = self.focus.unwrap_or(0);
        match (0..end).rev().find(|&i| is_navigable(&columns[i], record)) {
            Some(prev) => {
                self.focus = Some(prev);
                true
            }
            None => false,
        }
    }

    /// Saves every live editor, as done before an apply. Outcomes are
    /// returned by column index; the caller applies the writes.
    pub fn flush(&mut self, columns: &[Column], record: &Record) -> Vec<(usize, EditOutcome)> {
        self.cells
            .iter_mut()
            .zip(columns)
            .enumerate()
            .filter(|(_, (cell, _))| cell.is_editing())
            .map(|(index, (cell, column))| (index, cell.save_or_cancel(Command::Save, column, record)))
            .collect()
    }

    /// Selection state.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Sets the selection state.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    /// Pin marker state.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Sets the pin marker.
    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }
}

fn is_navigable(column: &Column, record: &Record) -> bool {
    column.renderable && Cell::is_editable(column, record)
}

fn first_editable(
    columns: &[Column],
    record: &Record,
    mut range: std::ops::Range<usize>,
) -> Option<usize> {
    range.find(|&i| is_navigable(&columns[i], record))
}

/// Stand-in row for a placeholder record, rendered as one merged cell.
#[derive(Debug, Clone)]
pub struct PlaceholderRow {
    key: RecordKey,
    text: Option<String>,
}

impl PlaceholderRow {
    /// Key of the placeholder record.
    pub fn key(&self) -> RecordKey {
        self.key
    }

    /// Text to show; `None` means the default unmatched text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// The synthetic row shown while the collection is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyRow {
    /// Loading or no-results text.
    pub text: String,
}

/// A body row.
#[derive(Debug, Clone)]
pub enum Row {
    /// Regular record row.
    Data(DataRow),
    /// Placeholder record row.
    Placeholder(PlaceholderRow),
    /// Synthetic empty-collection row.
    Empty(EmptyRow),
}

impl Row {
    /// Builds the row variant matching `record`.
    pub fn for_record(record: &Record, columns: &[Column]) -> Self {
        match record.kind() {
            crate::record::RecordKind::Placeholder { text } => Row::Placeholder(PlaceholderRow {
                key: record.key(),
                text: text.clone(),
            }),
            crate::record::RecordKind::Data => Row::Data(DataRow::new(record, columns)),
        }
    }

    /// Key of the bound record; `None` for the synthetic empty row.
    pub fn key(&self) -> Option<RecordKey> {
        match self {
            Row::Data(row) => Some(row.key),
            Row::Placeholder(row) => Some(row.key),
            Row::Empty(_) => None,
        }
    }

    /// The data row, if this is one.
    pub fn as_data(&self) -> Option<&DataRow> {
        match self {
            Row::Data(row) => Some(row),
            _ => None,
        }
    }

    /// The mutable data row, if this is one.
    pub fn as_data_mut(&mut self) -> Option<&mut DataRow> {
        match self {
            Row::Data(row) => Some(row),
            _ => None,
        }
    }

    /// True for the synthetic empty row.
    pub fn is_empty_row(&self) -> bool {
        matches!(self, Row::Empty(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;

    fn columns() -> Vec<Column> {
        let mut out = vec![Column::new("delete", "").with_kind(CellKind::Delete)];
        for name in ["a", "b", "c"] {
            let mut column = Column::new(name, name).with_kind(CellKind::Text).with_editable(true);
            column.field = Some(name.into());
            out.push(column);
        }
        out[2].editable = false;
        out
    }

    #[test]
    fn test_one_cell_per_column() {
        let columns = columns();
        let record = Record::persisted("1");
        let row = DataRow::new(&record, &columns);
        assert_eq!(row.cells().len(), 4);
    }

    #[test]
    fn test_row_edit_focuses_first_editable_cell() {
        let columns = columns();
        let record = Record::new();
        let mut row = DataRow::new(&record, &columns);
        row.enter_edit_mode(&columns, &record);
        assert_eq!(row.focus(), Some(1));
        assert!(row.cell(1).unwrap().is_editing());
        assert!(!row.cell(2).unwrap().is_editing());

        assert!(row.focus_next(&columns, &record));
        assert_eq!(row.focus(), Some(3));
        assert!(!row.focus_next(&columns, &record));
        assert_eq!(row.focus(), Some(3));
        assert!(row.focus_prev(&columns, &record));
        assert_eq!(row.focus(), Some(1));
        assert!(!row.focus_prev(&columns, &record));

        row.exit_edit_mode(&columns, &record);
        assert!(row.cells().iter().all(|c| !c.is_editing()));
        assert_eq!(row.focus(), None);
    }

    #[test]
    fn test_inserted_cell_follows_row_edit_mode() {
        let mut columns = columns();
        let record = Record::new();
        let mut row = DataRow::new(&record, &columns);
        row.enter_edit_mode(&columns, &record);

        let mut extra = Column::new("z", "z").with_kind(CellKind::Text).with_editable(true);
        extra.field = Some("z".into());
        columns.insert(1, extra);
        row.insert_cell(1, &columns[1], &record);
        assert!(row.cell(1).unwrap().is_editing());
        assert_eq!(row.focus(), Some(2));
    }

    #[test]
    fn test_remove_cell_drops_focus_on_it() {
        let columns = columns();
        let record = Record::new();
        let mut row = DataRow::new(&record, &columns);
        row.enter_edit_mode(&columns, &record);
        row.remove_cell(1);
        assert_eq!(row.focus(), None);
        assert_eq!(row.cells().len(), 3);
        assert!(row.remove_cell(9).is_none());
    }

    #[test]
    fn test_placeholder_record_builds_placeholder_row() {
        let record = Record::placeholder(Some("unmatched".into()));
        let row = Row::for_record(&record, &columns());
        match row {
            Row::Placeholder(p) => assert_eq!(p.text(), Some("unmatched")),
            _ => panic!("expected placeholder row"),
        }
    }
}
