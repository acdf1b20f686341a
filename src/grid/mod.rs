//! The grid component.
//!
//! [`Grid`] owns the schema, the record collection and everything derived
//! from them: the column model, the header, the body rows, the paginator and
//! the select-all tracker. Every mutation goes through the grid, which
//! routes the resulting [`SchemaEvent`], [`ColumnEvent`] and
//! [`CollectionEvent`] to the parts that mirror them, so rows and header
//! cells never outlive their column or record.
//!
//! The grid performs no I/O. Requests for the host are reported as
//! [`GridEvent`]s, delivered to subscribers immediately and returned from
//! [`Grid::update`] as a command resolving to an [`EventsMsg`].
//!
//! ```rust
//! use bubbletea_datagrid::grid::{Grid, GridConfig};
//! use bubbletea_datagrid::record::{Record, RecordCollection};
//! use bubbletea_datagrid::schema::{Field, Schema};
//!
//! let schema = Schema::new().with_fields(vec![
//!     Field::new("name", "Name"),
//!     Field::new("email", "Email"),
//! ]);
//! let records = RecordCollection::new()
//!     .with_records(vec![Record::persisted("1").with("name", "Ada")]);
//!
//! let mut grid = Grid::new(schema, records, GridConfig::default());
//! let layout = grid.resize(80);
//! assert_eq!(layout.widths.len(), 3);
//! assert!(grid.view().contains("Ada"));
//! ```

mod config;
mod keys;
mod layout;
mod view;


pub use config::{delete_column, select_column, GridConfig};
pub use keys::GridKeyMap;
pub use layout::{distribute, ColumnLayout, WidthSpec};

pub use crate::error::Result;

use crate::body::{Body, Navigation};
use crate::cell::{CellKind, CellWrite, EditOutcome};
use crate::column::{ColumnEvent, Columns};
use crate::command::{Command, CommandKeyMap};
use crate::error::GridError;
use crate::event::{CommitId, EventsMsg, GridEvent, Signal, SubscriptionId};
use crate::header::{Header, HeaderKind, SortChange};
use crate::paginator::{self, PageRequest};
use crate::record::{CollectionEvent, PagingState, Record, RecordCollection, RecordKey, Value};
use crate::row::{DataRow, Row};
use crate::schema::{Field, Schema, SchemaEvent};
use crate::select_all::SelectAll;
use crate::style::GridStyles;
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Model as BubbleTeaModel, Msg};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone)]
struct PendingCommit {
    record: RecordKey,
    column: String,
    previous: Value,
    // A newer edit of the same cell was confirmed.
    superseded: bool,
}

impl PendingCommit {
    fn same_cell(&self, other: &PendingCommit) -> bool {
        self.record == other.record && self.column == other.column
    }
}

/// An editable data grid.
#[derive(Debug)]
pub struct Grid {
    config: GridConfig,
    schema: Schema,
    columns: Columns,
    collection: RecordCollection,
    header: Header,
    body: Body,
    paginator: paginator::Model,
    select_all: SelectAll,
    layout: ColumnLayout,
    container_width: Option<usize>,
    cursor: (usize, usize),
    focused: bool,
    pending: BTreeMap<CommitId, PendingCommit>,
    pinned: BTreeSet<RecordKey>,
    next_commit: u64,
    outbox: Vec<GridEvent>,
    observers: Signal<GridEvent>,
    /// Display-mode bindings.
    pub keymap: GridKeyMap,
    /// Bindings of editing cells and structural edit mode.
    pub command_keys: CommandKeyMap,
    /// Styles used by [`Grid::view`].
    pub styles: GridStyles,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(Schema::new(), RecordCollection::new(), GridConfig::default())
    }
}

impl Grid {
    /// Builds a grid over `collection` with columns derived from `schema`.
    /// The grid starts blurred; call [`Component::focus`] to route keys.
    pub fn new(schema: Schema, collection: RecordCollection, config: GridConfig) -> Self {
        let columns = Columns::from_schema(&schema, config.pre_columns.clone(), config.column_defaults());
        let header = Header::new(columns.as_slice());
        let body = Body::new(
            &collection,
            columns.as_slice(),
            config.empty_text.clone(),
            config.loading_text.clone(),
        );
        let paginator = paginator::Model::new()
            .with_window_size(config.window_size)
            .with_fast_forward(config.fast_forward.clone())
            .with_state(*collection.state());
        let mut grid = Self {
            config,
            schema,
            columns,
            collection,
            header,
            body,
            paginator,
            select_all: SelectAll::new(),
            layout: ColumnLayout::default(),
            container_width: None,
            cursor: (0, 0),
            focused: false,
            pending: BTreeMap::new(),
            pinned: BTreeSet::new(),
            next_commit: 1,
            outbox: Vec::new(),
            observers: Signal::new(),
            keymap: GridKeyMap::default(),
            command_keys: CommandKeyMap::default(),
            styles: GridStyles::default(),
        };
        grid.relayout();
        grid
    }

    /// Replaces the styles (builder pattern).
    pub fn with_styles(mut self, styles: GridStyles) -> Self {
        self.styles = styles;
        self.relayout();
        self
    }

    /// Replaces the display-mode bindings (builder pattern).
    pub fn with_keymap(mut self, keymap: GridKeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Replaces the editing bindings (builder pattern).
    pub fn with_command_keys(mut self, command_keys: CommandKeyMap) -> Self {
        self.command_keys = command_keys;
        self
    }

    /// The configuration the grid was built with.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The field schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The column model.
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// The record collection.
    pub fn collection(&self) -> &RecordCollection {
        &self.collection
    }

    /// The header row.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The body rows.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The paginator.
    pub fn paginator(&self) -> &paginator::Model {
        &self.paginator
    }

    /// Current column widths.
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Cursor position as `(row, column)`.
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Moves the cursor. Out-of-range positions are refused.
    pub fn set_cursor(&mut self, row: usize, col: usize) -> bool {
        if row < self.body.len() && col < self.columns.len() {
            self.cursor = (row, col);
            true
        } else {
            false
        }
    }

    // Events

    /// Registers an observer called synchronously for every event.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&GridEvent) + Send + 'static,
    {
        self.observers.connect(observer)
    }

    /// Removes an observer.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.disconnect(id)
    }

    /// Drains events produced since the last `update` or drain.
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, event: GridEvent) {
        self.observers.emit(&event);
        self.outbox.push(event);
    }

    fn flush_events(&mut self) -> Option<Cmd> {
        if self.outbox.is_empty() {
            return None;
        }
        let events = std::mem::take(&mut self.outbox);
        Some(Box::pin(async move { Some(Msg::from(EventsMsg(events))) }))
    }

    // Schema

    /// Appends a field; a visible field gains its column.
    pub fn add_field(&mut self, field: Field) -> Result<()> {
        let event = self.schema.add(field)?;
        self.on_schema_event(event)
    }

    /// Inserts a field at `index` in the schema.
    pub fn insert_field(&mut self, index: usize, field: Field) -> Result<()> {
        let event = self.schema.insert(index, field)?;
        self.on_schema_event(event)
    }

    /// Removes a field and its column. Every row loses the matching cell.
    pub fn remove_field(&mut self, id: &str) -> Result<()> {
        let event = self.schema.remove(id)?;
        self.on_schema_event(event)
    }

    /// Replaces every field and rebuilds the columns.
    pub fn reset_fields(&mut self, fields: Vec<Field>) -> Result<()> {
        let event = self.schema.reset(fields);
        self.on_schema_event(event)
    }

    /// Edits a field in place and re-derives its column.
    pub fn change_field<F>(&mut self, id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Field),
    {
        let event = self.schema.change(id, edit)?;
        self.on_schema_event(event)
    }

    /// Highlights the column of `field`, clearing any other highlight.
    pub fn set_selected_field(&mut self, field: Option<&str>) {
        for event in self.columns.set_selected(field) {
            self.on_column_event(event);
        }
    }

    fn on_schema_event(&mut self, event: SchemaEvent) -> Result<()> {
        let column_event = match event {
            SchemaEvent::Added { id } => self.columns.add_column(&self.schema, &id)?,
            SchemaEvent::Removed { field } => self.columns.remove_column(&field.id),
            SchemaEvent::Reset => Some(self.columns.reset_from(&self.schema)),
            SchemaEvent::Changed { id } => self.columns.change_column(&self.schema, &id)?,
        };
        if let Some(event) = column_event {
            self.on_column_event(event);
        }
        Ok(())
    }

    fn on_column_event(&mut self, event: ColumnEvent) {
        let columns = self.columns.as_slice();
        self.header.on_column_event(&event, columns);
        self.body.on_column_event(&event, &self.collection, columns);
        self.clamp_cursor();
        self.relayout();
    }

    // Records

    /// Adds a record at its sorted position. An unsaved record starts in row
    /// edit mode with the cursor on its first editable cell.
    pub fn add_record(&mut self, record: Record) -> RecordKey {
        let key = record.key();
        let starts_editing = record.is_new() && !record.is_placeholder();
        let event = self.collection.add(record);
        self.on_collection_event(event);
        if starts_editing {
            if let Err(err) = self.start_row_edit(key) {
                warn!(record = %key, error = %err, "row edit not started");
            }
        }
        key
    }

    /// Inserts a record at `index`, ignoring any sort order.
    pub fn insert_record(&mut self, index: usize, record: Record) -> RecordKey {
        let key = record.key();
        let event = self.collection.insert(index, record);
        self.on_collection_event(event);
        key
    }

    /// Removes a record and its row. Pending commits on it are dropped.
    pub fn remove_record(&mut self, key: RecordKey) -> Result<Record> {
        let (record, event) = self
            .collection
            .remove(key)
            .ok_or(GridError::UnknownRecord(key))?;
        self.pending.retain(|_, p| p.record != key);
        self.on_collection_event(event);
        Ok(record)
    }

    /// Replaces every record. Rows are rebuilt.
    pub fn reset_records(&mut self, records: Vec<Record>) {
        let event = self.collection.reset(records);
        self.on_collection_event(event);
    }

    /// Edits a record in place, e.g. after the host refreshed it.
    pub fn update_record<F>(&mut self, key: RecordKey, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Record),
    {
        let record = self
            .collection
            .get_mut(key)
            .ok_or(GridError::UnknownRecord(key))?;
        edit(record);
        self.refresh_row(key);
        self.relayout();
        Ok(())
    }

    /// Marks an applied record as persisted under `id` and ends its row
    /// edit mode.
    pub fn record_saved(&mut self, key: RecordKey, id: impl Into<String>) -> Result<()> {
        let record = self
            .collection
            .get_mut(key)
            .ok_or(GridError::UnknownRecord(key))?;
        record.set_id(id);
        self.stop_row_edit(key)?;
        self.refresh_row(key);
        debug!(record = %key, "record saved");
        Ok(())
    }

    /// Marks the collection as synced; the empty row switches to the
    /// no-results text.
    pub fn mark_synced(&mut self) {
        let event = self.collection.mark_synced();
        self.on_collection_event(event);
    }

    /// Replaces the paging state shown by the paginator.
    pub fn set_paging_state(&mut self, state: PagingState) {
        if let Some(event) = self.collection.set_state(state) {
            self.on_collection_event(event);
        }
    }

    /// Asks the host for another page.
    pub fn request_page(&mut self, request: PageRequest) {
        debug!(?request, "page requested");
        self.emit(GridEvent::PageRequested(request));
    }

    fn on_collection_event(&mut self, event: CollectionEvent) {
        self.body
            .on_collection_event(&event, &self.collection, self.columns.as_slice());
        match event {
            CollectionEvent::Removed { key, .. } => {
                self.select_all.forget(key);
                self.pinned.remove(&key);
            }
            CollectionEvent::Sorted | CollectionEvent::Reset => self.reapply_row_marks(),
            CollectionEvent::StateChanged => self.paginator.set_state(*self.collection.state()),
            CollectionEvent::Added { .. } | CollectionEvent::Synced => {}
        }
        self.clamp_cursor();
        self.relayout();
    }

    fn refresh_row(&mut self, key: RecordKey) {
        let Some(record) = self.collection.get(key) else {
            return;
        };
        let Some(row) = self
            .body
            .row_index(key)
            .and_then(|i| self.body.row_mut(i))
            .and_then(Row::as_data_mut)
        else {
            return;
        };
        for (index, column) in self.columns.iter().enumerate() {
            row.change_cell(index, column, record);
        }
    }

    fn data_keys(&self) -> Vec<RecordKey> {
        self.body
            .rows()
            .iter()
            .filter_map(Row::as_data)
            .map(DataRow::key)
            .collect()
    }

    fn cursor_key(&self) -> Option<RecordKey> {
        self.body
            .row(self.cursor.0)
            .and_then(Row::as_data)
            .map(DataRow::key)
    }

    fn clamp_cursor(&mut self) {
        let rows = self.body.len().saturating_sub(1);
        let cols = self.columns.len().saturating_sub(1);
        self.cursor = (self.cursor.0.min(rows), self.cursor.1.min(cols));
    }

    fn move_cursor(&mut self, rows: isize, cols: isize) {
        let row = self.cursor.0.saturating_add_signed(rows);
        let col = self.cursor.1.saturating_add_signed(cols);
        self.cursor = (row, col);
        self.clamp_cursor();
    }

    // Editing

    /// Puts the cell at (`row`, `col`) into edit mode. Any other editing
    /// cell leaves edit mode first. Returns false when the cell cannot edit.
    pub fn enter_edit(&mut self, row: usize, col: usize) -> bool {
        let entered = self
            .body
            .enter_edit(row, col, &self.collection, self.columns.as_slice());
        if entered {
            self.cursor = (row, col);
            self.relayout();
        }
        entered
    }

    /// Returns the editing cell to display mode without saving.
    pub fn exit_edit(&mut self) {
        self.body.exit_edit();
        self.relayout();
    }

    /// Puts every editable cell of a record's row into edit mode.
    pub fn start_row_edit(&mut self, key: RecordKey) -> Result<()> {
        let record = self
            .collection
            .get(key)
            .ok_or(GridError::UnknownRecord(key))?;
        let index = self.body.row_index(key).ok_or(GridError::UnknownRecord(key))?;
        self.body.exit_edit();
        let row = self
            .body
            .row_mut(index)
            .and_then(Row::as_data_mut)
            .ok_or(GridError::UnknownRecord(key))?;
        row.enter_edit_mode(self.columns.as_slice(), record);
        self.cursor = (index, row.focus().unwrap_or(self.cursor.1));
        self.relayout();
        Ok(())
    }

    /// Ends row edit mode, dropping unsaved input.
    pub fn stop_row_edit(&mut self, key: RecordKey) -> Result<()> {
        let record = self
            .collection
            .get(key)
            .ok_or(GridError::UnknownRecord(key))?;
        let index = self.body.row_index(key).ok_or(GridError::UnknownRecord(key))?;
        if let Some(row) = self.body.row_mut(index).and_then(Row::as_data_mut) {
            if row.is_editing() {
                row.exit_edit_mode(self.columns.as_slice(), record);
            }
        }
        self.relayout();
        Ok(())
    }

    /// `(row, column)` of the editor receiving input: the cell in edit mode,
    /// or the focused editor of a row in row edit mode under the cursor.
    pub fn active_editor(&self) -> Option<(usize, usize)> {
        if let Some(position) = self.body.editing() {
            return Some(position);
        }
        let row = self.cursor.0;
        let data = self.body.row(row)?.as_data()?;
        if data.is_editing() {
            data.focus().map(|col| (row, col))
        } else {
            None
        }
    }

    /// Runs an editing command on the cell at (`row`, `col`): saves or
    /// cancels its input, applies the write and moves focus.
    pub fn apply_command(&mut self, row: usize, col: usize, command: Command) -> Result<()> {
        let key = self
            .body
            .row(row)
            .and_then(Row::key)
            .ok_or(GridError::UnknownRow(row))?;
        let column = self
            .columns
            .get(col)
            .cloned()
            .ok_or_else(|| GridError::UnknownColumn(col.to_string()))?;
        let record = self
            .collection
            .get(key)
            .ok_or(GridError::UnknownRecord(key))?;
        let outcome = match self
            .body
            .row_mut(row)
            .and_then(Row::as_data_mut)
            .and_then(|r| r.cell_mut(col))
        {
            Some(cell) => cell.save_or_cancel(command, &column, record),
            None => EditOutcome::Ignored,
        };

        match outcome {
            EditOutcome::Ignored => return Ok(()),
            EditOutcome::Invalid(error) => {
                self.emit(GridEvent::ValidationFailed {
                    record: key,
                    column: column.name,
                    error,
                });
                return Ok(());
            }
            EditOutcome::Edited { command, write } => {
                if let Some(write) = write {
                    self.apply_write(key, &column.name, write)?;
                }
                let navigation = self.body.move_to_next_cell(
                    key,
                    col,
                    command,
                    &self.collection,
                    self.columns.as_slice(),
                )?;
                self.follow(navigation, &column.name)?;
            }
        }
        self.relayout();
        Ok(())
    }

    fn apply_write(&mut self, key: RecordKey, attr: &str, write: CellWrite) -> Result<()> {
        let record = self
            .collection
            .get_mut(key)
            .ok_or(GridError::UnknownRecord(key))?;
        match write {
            CellWrite::Set(value) => {
                record.set(attr, value.clone());
                self.emit(GridEvent::ValueSet {
                    record: key,
                    column: attr.to_string(),
                    value,
                });
            }
            CellWrite::Commit(value) => {
                let previous = record.set(attr, value.clone());
                let commit = CommitId(self.next_commit);
                self.next_commit += 1;
                self.pending.insert(
                    commit,
                    PendingCommit {
                        record: key,
                        column: attr.to_string(),
                        previous: previous.clone(),
                        superseded: false,
                    },
                );
                debug!(%commit, record = %key, column = attr, "commit requested");
                self.emit(GridEvent::CommitRequested {
                    commit,
                    record: key,
                    column: attr.to_string(),
                    value,
                    previous,
                });
            }
        }
        Ok(())
    }

    fn follow(&mut self, navigation: Navigation, scope: &str) -> Result<()> {
        match navigation {
            Navigation::RemoveRecord(key) => {
                self.remove_record(key)?;
                debug!(record = %key, "unsaved record discarded");
            }
            Navigation::Apply(key) => self.apply_record(key, Some(scope.to_string()))?,
            Navigation::Moved { row, col } | Navigation::Focused { row, col } => {
                self.cursor = (row, col);
            }
            Navigation::Stayed => {}
        }
        Ok(())
    }

    /// Flushes every editor of an unsaved record's row and asks the host to
    /// create it. When any input fails validation nothing is requested and
    /// focus moves to the first invalid cell.
    pub fn apply_record(&mut self, key: RecordKey, scope: Option<String>) -> Result<()> {
        let record = self
            .collection
            .get(key)
            .ok_or(GridError::UnknownRecord(key))?;
        let index = self.body.row_index(key).ok_or(GridError::UnknownRecord(key))?;
        let outcomes = match self.body.row_mut(index).and_then(Row::as_data_mut) {
            Some(row) => row.flush(self.columns.as_slice(), record),
            None => Vec::new(),
        };

        let mut first_invalid = None;
        for (col, outcome) in outcomes {
            let name = self
                .columns
                .get(col)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            match outcome {
                EditOutcome::Invalid(error) => {
                    first_invalid.get_or_insert(col);
                    self.emit(GridEvent::ValidationFailed {
                        record: key,
                        column: name,
                        error,
                    });
                }
                EditOutcome::Edited {
                    write: Some(write), ..
                } => self.apply_write(key, &name, write)?,
                EditOutcome::Edited { write: None, .. } | EditOutcome::Ignored => {}
            }
        }

        if let Some(col) = first_invalid {
            if let Some(row) = self.body.row_mut(index).and_then(Row::as_data_mut) {
                row.set_focus(col);
            }
            self.cursor = (index, col);
            return Ok(());
        }
        debug!(record = %key, "record apply requested");
        self.emit(GridEvent::RecordApply { record: key, scope });
        Ok(())
    }

    /// Confirms or rejects a pending commit.
    ///
    /// A rejection restores the value the commit replaced, emits
    /// [`GridEvent::CommitReverted`] and is reported back as
    /// [`GridError::CommitRejected`]. Stacked edits of one cell are
    /// resolved in order: rejecting a commit that a newer pending edit
    /// already overwrote hands the old value on to that edit, and rejecting
    /// one a newer confirmed edit overwrote restores nothing. Neither case
    /// touches the record, so both return `Ok`.
    pub fn resolve_commit(
        &mut self,
        commit: CommitId,
        outcome: std::result::Result<(), String>,
    ) -> Result<()> {
        let pending = self
            .pending
            .remove(&commit)
            .ok_or(GridError::UnknownCommit(commit.0))?;
        let reason = match outcome {
            Ok(()) => {
                for (_, older) in self.pending.range_mut(..commit) {
                    if older.same_cell(&pending) {
                        older.superseded = true;
                    }
                }
                debug!(%commit, "commit confirmed");
                return Ok(());
            }
            Err(reason) => reason,
        };
        if pending.superseded {
            debug!(%commit, %reason, "rejected commit already superseded");
            return Ok(());
        }
        if let Some((newer_id, newer)) = self
            .pending
            .range_mut(commit..)
            .find(|(_, p)| p.same_cell(&pending))
        {
            debug!(%commit, newer = %newer_id, %reason, "rejected commit overwritten by a pending edit");
            newer.previous = pending.previous;
            return Ok(());
        }

        warn!(
            %commit,
            record = %pending.record,
            column = %pending.column,
            %reason,
            "commit rejected, restoring previous value"
        );
        if let Some(record) = self.collection.get_mut(pending.record) {
            record.set(pending.column.clone(), pending.previous);
        }
        self.refresh_cell(pending.record, &pending.column);
        self.relayout();
        self.emit(GridEvent::CommitReverted {
            commit,
            record: pending.record,
            column: pending.column.clone(),
            reason: reason.clone(),
        });
        Err(GridError::CommitRejected {
            record: pending.record,
            column: pending.column,
            reason,
        })
    }

    /// Number of commits awaiting the host's verdict.
    pub fn pending_commits(&self) -> usize {
        self.pending.len()
    }

    fn refresh_cell(&mut self, key: RecordKey, attr: &str) {
        let (Some(record), Some(col)) = (self.collection.get(key), self.columns.index_of(attr))
        else {
            return;
        };
        let Some(column) = self.columns.get(col) else {
            return;
        };
        if let Some(cell) = self
            .body
            .row_index(key)
            .and_then(|i| self.body.row_mut(i))
            .and_then(Row::as_data_mut)
            .and_then(|r| r.cell_mut(col))
        {
            cell.refresh(column, record);
        }
    }

    /// Target of a link cell, with `{attr}` placeholders expanded.
    pub fn link_target(&self, row: usize, col: usize) -> Option<String> {
        let column = self.columns.get(col)?;
        let key = self.body.row(row)?.as_data()?.key();
        column.kind.link_target(self.collection.get(key)?)
    }

    // Header

    /// Activates the header cell of column `col`: label headers sort, the
    /// special headers perform their action.
    pub fn activate_header(&mut self, col: usize) -> Result<()> {
        let header = self
            .columns
            .get(col)
            .map(|c| c.header)
            .ok_or_else(|| GridError::UnknownColumn(col.to_string()))?;
        match header {
            HeaderKind::Label => self.sort_by_column(col),
            HeaderKind::AddRecord => {
                self.request_add_record();
            }
            HeaderKind::AddColumn => {
                self.request_add_column();
            }
            HeaderKind::ApplyStructure => {
                self.set_structure_editing(false);
            }
            HeaderKind::SelectAll => self.toggle_select_all(),
        }
        Ok(())
    }

    fn sort_by_column(&mut self, col: usize) {
        let Some(name) = self.columns.get(col).map(|c| c.name.clone()) else {
            return;
        };
        let (order, direction) = match self.header.toggle_sort(col, self.columns.as_slice()) {
            SortChange::Unchanged => return,
            SortChange::Sorted(order) => {
                let direction = order.direction;
                (Some(order), Some(direction))
            }
            SortChange::Unsorted => (None, None),
        };
        self.body.exit_edit();
        let event = self.collection.sort_by(order);
        self.on_collection_event(event);
        self.emit(GridEvent::Sorted {
            column: name,
            direction,
        });
    }

    /// Asks the host for a new record. Refused while the collection is not
    /// writable or the header is in structural edit mode.
    pub fn request_add_record(&mut self) -> bool {
        if !self.collection.is_writable() || self.header.is_structure_editing() {
            return false;
        }
        self.emit(GridEvent::RecordAdd);
        true
    }

    /// Asks the host to delete a persisted, writable record.
    pub fn request_delete_record(&mut self, key: RecordKey) -> bool {
        let deletable = self.columns.iter().any(|c| c.kind == CellKind::Delete && c.editable);
        let allowed = self
            .collection
            .get(key)
            .is_some_and(|r| r.is_writable() && !r.is_new() && !r.is_placeholder());
        if !(deletable && allowed) {
            return false;
        }
        self.emit(GridEvent::RecordDelete(key));
        true
    }

    // Selection

    /// Selected records.
    pub fn selected_records(&self) -> Vec<RecordKey> {
        self.select_all.selected().collect()
    }

    /// Whether the select-all box is checked.
    pub fn is_all_selected(&self) -> bool {
        self.select_all.is_checked()
    }

    /// Selects or unselects one record.
    pub fn set_record_selected(&mut self, key: RecordKey, selected: bool) -> Result<()> {
        let index = self.body.row_index(key).ok_or(GridError::UnknownRecord(key))?;
        let total = self.data_keys().len();
        self.select_all.set_selected(key, selected, total);
        if let Some(row) = self.body.row_mut(index).and_then(Row::as_data_mut) {
            row.set_checked(selected);
        }
        self.emit_selection();
        Ok(())
    }

    /// Toggles the select-all box.
    pub fn toggle_select_all(&mut self) {
        let keys = self.data_keys();
        let checked = self.select_all.toggle_all(&keys);
        for index in 0..self.body.len() {
            if let Some(row) = self.body.row_mut(index).and_then(Row::as_data_mut) {
                row.set_checked(checked);
            }
        }
        self.emit_selection();
    }

    /// Sets or clears the pin marker of one record's row. The marker
    /// survives sorting and is dropped with the record.
    pub fn set_record_pinned(&mut self, key: RecordKey, pinned: bool) -> Result<()> {
        let index = self.body.row_index(key).ok_or(GridError::UnknownRecord(key))?;
        if pinned {
            self.pinned.insert(key);
        } else {
            self.pinned.remove(&key);
        }
        if let Some(row) = self.body.row_mut(index).and_then(Row::as_data_mut) {
            row.set_pinned(pinned);
        }
        Ok(())
    }

    /// Pinned records.
    pub fn pinned_records(&self) -> Vec<RecordKey> {
        self.pinned.iter().copied().collect()
    }

    // Rebuilt rows start unchecked and unpinned.
    fn reapply_row_marks(&mut self) {
        let present = self.data_keys();
        let keys = self.select_all.refresh(&present);
        self.pinned.retain(|key| present.contains(key));
        for index in 0..self.body.len() {
            if let Some(row) = self.body.row_mut(index).and_then(Row::as_data_mut) {
                let key = row.key();
                row.set_checked(keys.contains(&key));
                row.set_pinned(self.pinned.contains(&key));
            }
        }
    }

    fn emit_selection(&mut self) {
        self.emit(GridEvent::SelectionChanged {
            selected: self.select_all.len(),
            all: self.select_all.is_checked(),
        });
    }

    // Structure

    /// True while the header is in structural edit mode.
    pub fn is_structure_editing(&self) -> bool {
        self.header.is_structure_editing()
    }

    /// Enters or leaves structural edit mode. Entering is refused unless
    /// the grid is configured as structure-writable. Returns whether the
    /// mode changed.
    pub fn set_structure_editing(&mut self, editing: bool) -> bool {
        if editing == self.header.is_structure_editing()
            || (editing && !self.config.structure_writable)
        {
            return false;
        }
        self.body.exit_edit();
        self.header.set_structure_editing(editing, self.columns.as_slice());
        if editing {
            if let Some(col) = self.next_renamable(0, true) {
                self.cursor.1 = col;
            }
        }
        debug!(editing, "structural edit toggled");
        self.emit(GridEvent::StructuralEditToggled(editing));
        true
    }

    fn next_renamable(&self, from: usize, forward: bool) -> Option<usize> {
        let cells = self.header.cells();
        let has_editor = |i: &usize| cells.get(*i).is_some_and(|c| c.rename_editor().is_some());
        if forward {
            (from..cells.len()).find(has_editor)
        } else {
            (0..=from.min(cells.len().saturating_sub(1))).rev().find(has_editor)
        }
    }

    /// Commits the rename input of column `col`. Returns whether the field
    /// was renamed; blank or unchanged input renames nothing.
    pub fn rename_column(&mut self, col: usize) -> Result<bool> {
        let column = self
            .columns
            .get(col)
            .ok_or_else(|| GridError::UnknownColumn(col.to_string()))?;
        let Some(field) = column.field.clone() else {
            return Ok(false);
        };
        let Some(name) = self.header.commit_rename(col, column) else {
            return Ok(false);
        };
        let renamed = name.clone();
        self.change_field(&field, move |f| f.name = renamed)?;
        debug!(field = %field, name = %name, "column renamed");
        self.emit(GridEvent::ColumnRenamed { field, name });
        Ok(true)
    }

    /// Flips the uniqueness flag of the field behind column `col`. Only
    /// available in structural edit mode and never for primary fields.
    pub fn toggle_unique(&mut self, col: usize) -> Result<bool> {
        if !self.header.is_structure_editing() {
            return Ok(false);
        }
        let column = self
            .columns
            .get(col)
            .ok_or_else(|| GridError::UnknownColumn(col.to_string()))?;
        let Some(field) = column.field.clone().filter(|_| !column.primary) else {
            return Ok(false);
        };
        let unique = !column.unique;
        self.change_field(&field, |f| f.unique = unique)?;
        self.emit(GridEvent::UniqueToggled { field, unique });
        Ok(true)
    }

    /// Asks the host for a new column.
    pub fn request_add_column(&mut self) -> bool {
        if !self.config.structure_writable {
            return false;
        }
        self.emit(GridEvent::ColumnAddRequested);
        true
    }

    /// Asks the host to delete the field behind column `col`. Only writable,
    /// non-primary fields qualify, and only in structural edit mode.
    pub fn request_delete_column(&mut self, col: usize) -> bool {
        if !self.header.is_structure_editing() {
            return false;
        }
        let Some(field) = self
            .columns
            .get(col)
            .filter(|c| c.writable && !c.primary)
            .and_then(|c| c.field.clone())
        else {
            return false;
        };
        self.emit(GridEvent::ColumnDeleteRequested(field));
        true
    }

    // Layout

    /// Lays the columns out in `width` terminal cells, gutter and
    /// separators included.
    pub fn resize(&mut self, width: usize) -> &ColumnLayout {
        self.container_width = Some(width);
        self.relayout();
        &self.layout
    }

    /// Cells taken by the row gutter and column separators.
    pub fn chrome_width(&self) -> usize {
        let separators = self.columns.len().saturating_sub(1);
        view::GUTTER_WIDTH + separators * self.styles.separator.width()
    }

    fn relayout(&mut self) {
        let columns = self.columns.as_slice();
        let natural = self.body.natural_widths(&self.collection, columns);
        self.layout = match self.container_width {
            Some(width) => {
                let specs: Vec<WidthSpec> = columns
                    .iter()
                    .zip(&natural)
                    .map(|(column, &natural)| match column.width {
                        Some(fixed) => WidthSpec::Fixed(fixed),
                        None => WidthSpec::Natural(natural),
                    })
                    .collect();
                let available = width.saturating_sub(self.chrome_width());
                distribute(&specs, available, self.config.min_column_width)
            }
            None => ColumnLayout {
                widths: columns
                    .iter()
                    .zip(&natural)
                    .map(|(column, &natural)| {
                        column
                            .width
                            .unwrap_or_else(|| natural.max(column.label.width() + 2).max(1))
                    })
                    .collect(),
                overflow: false,
            },
        };
        self.header.set_widths(&self.layout.widths);
        debug!(
            container = ?self.container_width,
            widths = ?self.layout.widths,
            overflow = self.layout.overflow,
            "columns laid out"
        );
    }

    // Input

    /// Handles a message. Keys are routed only while focused; events
    /// produced since the last call are returned as an [`EventsMsg`]
    /// command.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.focused {
                if let Err(err) = self.handle_key(key_msg) {
                    warn!(error = %err, "key not handled");
                }
            }
        }
        self.flush_events()
    }

    fn handle_key(&mut self, msg: &KeyMsg) -> Result<()> {
        if self.header.is_structure_editing() {
            return self.handle_structure_key(msg);
        }
        if let Some((row, col)) = self.active_editor() {
            if let Some(command) = self.command_keys.command(msg) {
                return self.apply_command(row, col, command);
            }
            if let Some(cell) = self
                .body
                .row_mut(row)
                .and_then(Row::as_data_mut)
                .and_then(|r| r.cell_mut(col))
            {
                cell.handle_key(msg);
            }
            return Ok(());
        }
        if let Some(request) = self.paginator.handle_key(msg) {
            self.request_page(request);
            return Ok(());
        }

        if self.keymap.up.matches(msg) {
            self.move_cursor(-1, 0);
        } else if self.keymap.down.matches(msg) {
            self.move_cursor(1, 0);
        } else if self.keymap.left.matches(msg) {
            self.move_cursor(0, -1);
        } else if self.keymap.right.matches(msg) {
            self.move_cursor(0, 1);
        } else if self.keymap.edit.matches(msg) {
            let (row, col) = self.cursor;
            self.enter_edit(row, col);
        } else if self.keymap.activate.matches(msg) {
            let (row, col) = self.cursor;
            if !self.enter_edit(row, col) {
                if let Some(key) = self.cursor_key() {
                    self.emit(GridEvent::RowActivated(key));
                }
            }
        } else if self.keymap.add_record.matches(msg) {
            self.request_add_record();
        } else if self.keymap.delete_record.matches(msg) {
            if let Some(key) = self.cursor_key() {
                self.request_delete_record(key);
            }
        } else if self.keymap.sort.matches(msg) {
            self.activate_header(self.cursor.1)?;
        } else if self.keymap.select_row.matches(msg) {
            if let Some(key) = self.cursor_key() {
                let selected = !self.select_all.is_selected(key);
                self.set_record_selected(key, selected)?;
            }
        } else if self.keymap.select_all.matches(msg) {
            self.toggle_select_all();
        } else if self.keymap.structure_edit.matches(msg) {
            self.set_structure_editing(true);
        } else if self.keymap.add_column.matches(msg) {
            self.request_add_column();
        }
        Ok(())
    }

    fn handle_structure_key(&mut self, msg: &KeyMsg) -> Result<()> {
        let col = self.cursor.1;
        if self.keymap.structure_edit.matches(msg) {
            self.set_structure_editing(false);
            return Ok(());
        }
        if self.keymap.add_column.matches(msg) {
            self.request_add_column();
            return Ok(());
        }
        if self.keymap.delete_column.matches(msg) {
            self.request_delete_column(col);
            return Ok(());
        }
        if self.keymap.toggle_unique.matches(msg) {
            self.toggle_unique(col)?;
            return Ok(());
        }
        match self.command_keys.command(msg) {
            Some(Command::Save) => {
                self.rename_column(col)?;
            }
            Some(Command::Cancel) => {
                self.set_structure_editing(false);
            }
            Some(Command::MoveRight) => {
                self.rename_column(col)?;
                if let Some(next) = self.next_renamable(col + 1, true) {
                    self.cursor.1 = next;
                }
            }
            Some(Command::MoveLeft) => {
                self.rename_column(col)?;
                if let Some(prev) = col.checked_sub(1).and_then(|c| self.next_renamable(c, false)) {
                    self.cursor.1 = prev;
                }
            }
            Some(Command::MoveUp | Command::MoveDown) | None => {
                self.header.rename_key(col, msg);
            }
        }
        Ok(())
    }
}

impl Component for Grid {
    fn focus(&mut self) -> Option<Cmd> {
        self.focused = true;
        None
    }

    fn blur(&mut self) {
        self.focused = false;
    }

    fn focused(&self) -> bool {
        self.focused
    }
}

impl BubbleTeaModel for Grid {
    fn init() -> (Self, Option<Cmd>) {
        let mut grid = Grid::default();
        let cmd = grid.focus();
        (grid, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}
