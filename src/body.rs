//! The body: rows kept parallel to the record collection, plus keyboard
//! navigation between editing cells.
//!
//! The body owns at most one cell in edit mode at a time. Entering edit on
//! any cell first exits the current one, so the single-editor rule holds
//! after every call.

use crate::cell::Cell;
use crate::column::{Column, ColumnEvent};
use crate::command::Command;
use crate::error::{GridError, Result};
use crate::record::{CollectionEvent, RecordCollection, RecordKey};
use crate::row::{EmptyRow, Row};
use tracing::{debug, trace};

/// Where focus went after a save or navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// A cancelled unsaved record must be removed from the collection.
    RemoveRecord(RecordKey),
    /// An unsaved record asked to be applied.
    Apply(RecordKey),
    /// Another cell entered edit mode.
    Moved {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },
    /// Row-local editor focus moved inside an unsaved record's row.
    Focused {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },
    /// Nothing else entered edit mode.
    Stayed,
}

/// Rows bound to the collection.
#[derive(Debug, Clone)]
pub struct Body {
    rows: Vec<Row>,
    editing: Option<(usize, usize)>,
    use_empty_text: bool,
    empty_text: String,
    loading_text: String,
}

impl Body {
    /// Builds one row per record, or the synthetic empty row.
    pub fn new(
        collection: &RecordCollection,
        columns: &[Column],
        empty_text: impl Into<String>,
        loading_text: impl Into<String>,
    ) -> Self {
        let mut body = Self {
            rows: Vec::new(),
            editing: None,
            use_empty_text: collection.is_synced(),
            empty_text: empty_text.into(),
            loading_text: loading_text.into(),
        };
        body.refresh(collection, columns);
        body
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row at `index`.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Mutable row at `index`.
    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    /// Number of rows, the synthetic empty row included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the only row is the synthetic empty row.
    pub fn shows_empty_row(&self) -> bool {
        self.rows.first().is_some_and(Row::is_empty_row)
    }

    /// Index of the row bound to `key`.
    pub fn row_index(&self, key: RecordKey) -> Option<usize> {
        self.rows.iter().position(|r| r.key() == Some(key))
    }

    /// `(row, column)` of the cell in edit mode.
    pub fn editing(&self) -> Option<(usize, usize)> {
        self.editing
    }

    fn empty_row(&self) -> Row {
        let text = if self.use_empty_text {
            &self.empty_text
        } else {
            &self.loading_text
        };
        Row::Empty(EmptyRow { text: text.clone() })
    }

    fn unshift_empty_row_maybe(&mut self) {
        if self.rows.is_empty() {
            let row = self.empty_row();
            self.rows.push(row);
        }
    }

    /// Rebuilds every row from the collection.
    pub fn refresh(&mut self, collection: &RecordCollection, columns: &[Column]) {
        self.rows = collection.iter().map(|r| Row::for_record(r, columns)).collect();
        self.editing = None;
        self.unshift_empty_row_maybe();
        debug!(rows = self.rows.len(), "body refreshed");
    }

    /// Switches the empty row from loading text to no-results text. Runs
    /// once; later calls change nothing.
    pub fn update_empty_text(&mut self) {
        if self.use_empty_text {
            return;
        }
        self.use_empty_text = true;
        if let [Row::Empty(row)] = self.rows.as_mut_slice() {
            row.text = self.empty_text.clone();
        }
    }

    /// Mirrors a collection mutation.
    pub fn on_collection_event(
        &mut self,
        event: &CollectionEvent,
        collection: &RecordCollection,
        columns: &[Column],
    ) {
        match event {
            CollectionEvent::Added { key, index } => {
                let Some(record) = collection.get(*key) else {
                    return;
                };
                if self.shows_empty_row() {
                    self.rows.remove(0);
                }
                let index = (*index).min(self.rows.len());
                self.rows.insert(index, Row::for_record(record, columns));
                if let Some((row, _)) = self.editing.as_mut() {
                    if *row >= index {
                        *row += 1;
                    }
                }
                debug!(record = %key, index, "row inserted");
            }
            CollectionEvent::Removed { key, .. } => {
                let Some(index) = self.row_index(*key) else {
                    return;
                };
                self.rows.remove(index);
                self.editing = match self.editing {
                    Some((row, _)) if row == index => None,
                    Some((row, col)) if row > index => Some((row - 1, col)),
                    other => other,
                };
                self.unshift_empty_row_maybe();
                debug!(record = %key, index, "row removed");
            }
            CollectionEvent::Sorted => self.refresh(collection, columns),
            CollectionEvent::Reset => {
                self.update_empty_text();
                self.refresh(collection, columns);
            }
            CollectionEvent::Synced => self.update_empty_text(),
            CollectionEvent::StateChanged => {}
        }
    }

    /// Mirrors a column mutation in every row. An edit in progress on a
    /// removed column is dropped.
    pub fn on_column_event(
        &mut self,
        event: &ColumnEvent,
        collection: &RecordCollection,
        columns: &[Column],
    ) {
        for row in self.rows.iter_mut() {
            let Some(data) = row.as_data_mut() else {
                continue;
            };
            let Some(record) = collection.get(data.key()) else {
                continue;
            };
            match event {
                ColumnEvent::Added { index } => {
                    if let Some(column) = columns.get(*index) {
                        data.insert_cell(*index, column, record);
                    }
                }
                ColumnEvent::Removed { index, .. } => {
                    data.remove_cell(*index);
                }
                ColumnEvent::Reset => data.reset_cells(columns, record),
                ColumnEvent::Changed { index } => {
                    if let Some(column) = columns.get(*index) {
                        data.change_cell(*index, column, record);
                    }
                }
            }
        }

        self.editing = match (self.editing, event) {
            (Some((row, col)), ColumnEvent::Added { index }) if col >= *index => Some((row, col + 1)),
            (Some((_, col)), ColumnEvent::Removed { index, .. }) if col == *index => None,
            (Some((row, col)), ColumnEvent::Removed { index, .. }) if col > *index => {
                Some((row, col - 1))
            }
            (Some(_), ColumnEvent::Reset) => None,
            (Some((row, col)), ColumnEvent::Changed { index }) if col == *index => self
                .rows
                .get(row)
                .and_then(Row::as_data)
                .and_then(|r| r.cell(col))
                .filter(|c| c.edit_mode())
                .map(|_| (row, col)),
            (other, _) => other,
        };
    }

    /// Puts the cell at (`row`, `col`) into edit mode after exiting the
    /// current one. Returns false when the cell cannot edit.
    pub fn enter_edit(
        &mut self,
        row: usize,
        col: usize,
        collection: &RecordCollection,
        columns: &[Column],
    ) -> bool {
        let Some(column) = columns.get(col) else {
            return false;
        };
        let Some(data) = self.rows.get(row).and_then(Row::as_data) else {
            return false;
        };
        let Some(record) = collection.get(data.key()) else {
            return false;
        };
        if !Cell::is_editable(column, record) {
            return false;
        }
        self.exit_edit();
        let entered = self
            .rows
            .get_mut(row)
            .and_then(Row::as_data_mut)
            .and_then(|r| r.cell_mut(col))
            .is_some_and(|cell| cell.enter_edit_mode(column, record));
        if entered {
            self.editing = Some((row, col));
        }
        entered
    }

    /// Returns the editing cell, if any, to display mode.
    pub fn exit_edit(&mut self) {
        if let Some((row, col)) = self.editing.take() {
            if let Some(cell) = self
                .rows
                .get_mut(row)
                .and_then(Row::as_data_mut)
                .and_then(|r| r.cell_mut(col))
            {
                cell.exit_edit_mode();
            }
        }
    }

    fn exit_cell(&mut self, row: usize, col: usize) {
        if self.editing == Some((row, col)) {
            self.exit_edit();
        } else if let Some(cell) = self
            .rows
            .get_mut(row)
            .and_then(Row::as_data_mut)
            .and_then(|r| r.cell_mut(col))
        {
            cell.exit_edit_mode();
        }
    }

    /// Moves focus after an edit ended on (`key`, `col`) with `command`.
    ///
    /// Unsaved records never navigate between rows: cancel asks for the
    /// record's removal, save asks for it to be applied, left and right move
    /// the row-local editor focus. Otherwise the originating cell leaves edit
    /// mode and up/down enter the same column one row away while left/right
    /// scan the flattened `row * columns + col` offsets for the next
    /// renderable, editable cell.
    pub fn move_to_next_cell(
        &mut self,
        key: RecordKey,
        col: usize,
        command: Command,
        collection: &RecordCollection,
        columns: &[Column],
    ) -> Result<Navigation> {
        let record = collection.get(key).ok_or(GridError::UnknownRecord(key))?;
        let row = self.row_index(key).ok_or(GridError::UnknownRecord(key))?;

        if record.is_new() {
            let Some(data) = self.rows.get_mut(row).and_then(Row::as_data_mut) else {
                return Ok(Navigation::Stayed);
            };
            return Ok(match command {
                Command::Cancel => Navigation::RemoveRecord(key),
                Command::Save => Navigation::Apply(key),
                Command::MoveLeft | Command::MoveRight => {
                    if data.focus().is_none() {
                        data.set_focus(col);
                    }
                    let moved = if command == Command::MoveRight {
                        data.focus_next(columns, record)
                    } else {
                        data.focus_prev(columns, record)
                    };
                    match (moved, data.focus()) {
                        (true, Some(col)) => Navigation::Focused { row, col },
                        _ => Navigation::Stayed,
                    }
                }
                Command::MoveUp | Command::MoveDown => Navigation::Stayed,
            });
        }

        self.exit_cell(row, col);

        match command {
            Command::MoveUp | Command::MoveDown => {
                let target = if command == Command::MoveUp {
                    row.checked_sub(1)
                } else {
                    Some(row + 1)
                };
                match target {
                    Some(target) if self.enter_edit(target, col, collection, columns) => {
                        Ok(Navigation::Moved { row: target, col })
                    }
                    _ => Ok(Navigation::Stayed),
                }
            }
            Command::MoveLeft | Command::MoveRight => {
                let width = columns.len();
                let max_offset = (width * self.rows.len()) as isize;
                let step: isize = if command == Command::MoveRight { 1 } else { -1 };
                let mut offset = (row * width + col) as isize + step;
                while offset >= 0 && offset < max_offset {
                    let m = offset as usize / width;
                    let n = offset as usize % width;
                    trace!(offset, row = m, col = n, "navigation scan");
                    if self.is_navigable(m, n, collection, columns)
                        && self.enter_edit(m, n, collection, columns)
                    {
                        return Ok(Navigation::Moved { row: m, col: n });
                    }
                    offset += step;
                }
                Ok(Navigation::Stayed)
            }
            Command::Save | Command::Cancel => Ok(Navigation::Stayed),
        }
    }

    fn is_navigable(
        &self,
        row: usize,
        col: usize,
        collection: &RecordCollection,
        columns: &[Column],
    ) -> bool {
        let Some(column) = columns.get(col) else {
            return false;
        };
        self.rows
            .get(row)
            .and_then(Row::as_data)
            .and_then(|r| collection.get(r.key()))
            .is_some_and(|record| column.renderable && Cell::is_editable(column, record))
    }

    /// Widest cell content per column, over every data row.
    pub fn natural_widths(&self, collection: &RecordCollection, columns: &[Column]) -> Vec<usize> {
        let mut widths = vec![0; columns.len()];
        for data in self.rows.iter().filter_map(Row::as_data) {
            let Some(record) = collection.get(data.key()) else {
                continue;
            };
            for (i, (cell, column)) in data.cells().iter().zip(columns).enumerate() {
                widths[i] = widths[i].max(cell.text_width(column, record));
            }
        }
        widths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;
    use crate::record::Record;

    fn columns() -> Vec<Column> {
        let mut out = vec![Column::new("delete", "").with_kind(CellKind::Delete)];
        for name in ["a", "b"] {
            let mut column = Column::new(name, name).with_kind(CellKind::Text).with_editable(true);
            column.field = Some(name.into());
            out.push(column);
        }
        out
    }

    fn collection(n: usize) -> RecordCollection {
        let records = (0..n)
            .map(|i| Record::persisted(i.to_string()).with("a", format!("a{i}")))
            .collect();
        RecordCollection::new().with_records(records)
    }

    fn editing_cells(body: &Body) -> usize {
        body.rows()
            .iter()
            .filter_map(Row::as_data)
            .flat_map(|r| r.cells())
            .filter(|c| c.edit_mode())
            .count()
    }

    fn key_at(collection: &RecordCollection, i: usize) -> RecordKey {
        collection.at(i).map(Record::key).unwrap()
    }

    #[test]
    fn test_empty_row_text_swaps_once() {
        let mut collection = RecordCollection::new();
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "No results", "Loading");
        assert!(matches!(body.row(0), Some(Row::Empty(r)) if r.text == "Loading"));

        let event = collection.mark_synced();
        body.on_collection_event(&event, &collection, &columns);
        assert!(matches!(body.row(0), Some(Row::Empty(r)) if r.text == "No results"));

        let event = collection.add(Record::persisted("1"));
        body.on_collection_event(&event, &collection, &columns);
        assert_eq!(body.len(), 1);
        assert!(!body.shows_empty_row());

        let key = key_at(&collection, 0);
        let (_, event) = collection.remove(key).unwrap();
        body.on_collection_event(&event, &collection, &columns);
        assert!(matches!(body.row(0), Some(Row::Empty(r)) if r.text == "No results"));
    }

    #[test]
    fn test_first_reset_swaps_empty_text() {
        let mut collection = RecordCollection::new();
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "No results", "Loading");

        let event = collection.reset(Vec::new());
        body.on_collection_event(&event, &collection, &columns);
        assert!(matches!(body.row(0), Some(Row::Empty(r)) if r.text == "No results"));

        // Sorting never switches back.
        let event = collection.sort_by(None);
        body.on_collection_event(&event, &collection, &columns);
        assert!(matches!(body.row(0), Some(Row::Empty(r)) if r.text == "No results"));
    }

    #[test]
    fn test_add_inserts_at_record_index() {
        let mut collection = collection(2);
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "", "");
        let event = collection.insert(1, Record::persisted("x"));
        body.on_collection_event(&event, &collection, &columns);
        assert_eq!(body.row(1).and_then(Row::key), collection.at(1).map(Record::key));
    }

    #[test]
    fn test_move_right_wraps_to_next_row() {
        let collection = collection(2);
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "", "");
        assert!(body.enter_edit(0, 2, &collection, &columns));

        let nav = body
            .move_to_next_cell(key_at(&collection, 0), 2, Command::MoveRight, &collection, &columns)
            .unwrap();
        assert_eq!(nav, Navigation::Moved { row: 1, col: 1 });
        assert_eq!(editing_cells(&body), 1);
    }

    #[test]
    fn test_move_right_from_last_editable_cell_stays() {
        let collection = collection(2);
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "", "");
        body.enter_edit(1, 2, &collection, &columns);
        let nav = body
            .move_to_next_cell(key_at(&collection, 1), 2, Command::MoveRight, &collection, &columns)
            .unwrap();
        assert_eq!(nav, Navigation::Stayed);
        assert_eq!(body.editing(), None);
    }

    #[test]
    fn test_move_left_from_first_editable_cell_stays() {
        let collection = collection(2);
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "", "");
        body.enter_edit(0, 1, &collection, &columns);
        let nav = body
            .move_to_next_cell(key_at(&collection, 0), 1, Command::MoveLeft, &collection, &columns)
            .unwrap();
        assert_eq!(nav, Navigation::Stayed);
        assert_eq!(editing_cells(&body), 0);
    }

    #[test]
    fn test_vertical_moves_do_not_wrap() {
        let collection = collection(2);
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "", "");
        body.enter_edit(0, 1, &collection, &columns);
        let up = body
            .move_to_next_cell(key_at(&collection, 0), 1, Command::MoveUp, &collection, &columns)
            .unwrap();
        assert_eq!(up, Navigation::Stayed);

        body.enter_edit(0, 1, &collection, &columns);
        let down = body
            .move_to_next_cell(key_at(&collection, 0), 1, Command::MoveDown, &collection, &columns)
            .unwrap();
        assert_eq!(down, Navigation::Moved { row: 1, col: 1 });

        let down = body
            .move_to_next_cell(key_at(&collection, 1), 1, Command::MoveDown, &collection, &columns)
            .unwrap();
        assert_eq!(down, Navigation::Stayed);
        assert_eq!(editing_cells(&body), 0);
    }

    #[test]
    fn test_readonly_records_are_skipped() {
        let records = vec![
            Record::persisted("0"),
            Record::persisted("1").with_writable(false),
            Record::persisted("2"),
        ];
        let collection = RecordCollection::new().with_records(records);
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "", "");
        body.enter_edit(0, 2, &collection, &columns);
        let nav = body
            .move_to_next_cell(key_at(&collection, 0), 2, Command::MoveRight, &collection, &columns)
            .unwrap();
        assert_eq!(nav, Navigation::Moved { row: 2, col: 1 });
    }

    #[test]
    fn test_new_record_navigation() {
        let mut collection = collection(1);
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "", "");
        let event = collection.add(Record::new());
        body.on_collection_event(&event, &collection, &columns);
        let key = key_at(&collection, 1);
        let record = collection.get(key).unwrap().clone();
        body.row_mut(1)
            .and_then(Row::as_data_mut)
            .unwrap()
            .enter_edit_mode(&columns, &record);

        let nav = |body: &mut Body, command| {
            body.move_to_next_cell(key, 1, command, &collection, &columns).unwrap()
        };
        assert_eq!(nav(&mut body, Command::MoveRight), Navigation::Focused { row: 1, col: 2 });
        assert_eq!(nav(&mut body, Command::MoveUp), Navigation::Stayed);
        assert_eq!(nav(&mut body, Command::Save), Navigation::Apply(key));
        assert_eq!(nav(&mut body, Command::Cancel), Navigation::RemoveRecord(key));
    }

    #[test]
    fn test_removing_editing_column_drops_edit() {
        let collection = collection(2);
        let mut columns = columns();
        let mut body = Body::new(&collection, &columns, "", "");
        body.enter_edit(1, 2, &collection, &columns);

        columns.remove(1);
        body.on_column_event(
            &ColumnEvent::Removed {
                index: 1,
                name: "a".into(),
            },
            &collection,
            &columns,
        );
        assert_eq!(body.editing(), Some((1, 1)));

        columns.remove(1);
        body.on_column_event(
            &ColumnEvent::Removed {
                index: 1,
                name: "b".into(),
            },
            &collection,
            &columns,
        );
        assert_eq!(body.editing(), None);
        assert_eq!(editing_cells(&body), 0);
        for row in body.rows().iter().filter_map(Row::as_data) {
            assert_eq!(row.cells().len(), 1);
        }
    }

    #[test]
    fn test_unknown_record() {
        let collection = collection(1);
        let columns = columns();
        let mut body = Body::new(&collection, &columns, "", "");
        let stray = Record::new().key();
        assert_eq!(
            body.move_to_next_cell(stray, 0, Command::Save, &collection, &columns),
            Err(GridError::UnknownRecord(stray))
        );
    }
}
