//! Grid-wide settings.

use crate::cell::CellKind;
use crate::column::{Column, ColumnDefaults};
use crate::header::HeaderKind;
use crate::paginator::FastForward;

/// Settings applied when a [`Grid`](super::Grid) is built.
///
/// ```rust
/// use bubbletea_datagrid::grid::GridConfig;
///
/// let config = GridConfig::default()
///     .with_min_column_width(8)
///     .with_empty_text("Nothing here")
///     .with_sortable(false);
/// assert_eq!(config.min_column_width, 8);
/// ```
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Narrowest width a distributed column may get.
    pub min_column_width: usize,
    /// Numbered page handles around the current page.
    pub window_size: usize,
    /// Fast-forward paginator handles.
    pub fast_forward: FastForward,
    /// Empty-row text once the collection has synced.
    pub empty_text: String,
    /// Empty-row text before the first sync.
    pub loading_text: String,
    /// Text of placeholder rows that carry none of their own.
    pub unmatched_text: String,
    /// Field columns may be edited.
    pub editable: bool,
    /// Field columns may be sorted.
    pub sortable: bool,
    /// Structure editing (rename, unique, column add/delete) is offered.
    pub structure_writable: bool,
    /// Field whose column is highlighted.
    pub selected_field: Option<String>,
    /// Cell kind of field columns.
    pub cell_kind: CellKind,
    /// Structural columns placed before the field columns.
    pub pre_columns: Vec<Column>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_column_width: 12,
            window_size: 10,
            fast_forward: FastForward::default(),
            empty_text: "No results".to_string(),
            loading_text: "Loading…".to_string(),
            unmatched_text: "Unmatched".to_string(),
            editable: true,
            sortable: true,
            structure_writable: false,
            selected_field: None,
            cell_kind: CellKind::OptionalText { empty_text: None },
            pre_columns: vec![delete_column()],
        }
    }
}

/// The row-delete column with the add-record header.
pub fn delete_column() -> Column {
    Column::new("_delete", "")
        .with_kind(CellKind::Delete)
        .with_header(HeaderKind::AddRecord)
        .with_editable(true)
        .with_width(3)
}

/// The row-select column with the select-all header.
pub fn select_column() -> Column {
    Column::new("_select", "")
        .with_kind(CellKind::Select)
        .with_header(HeaderKind::SelectAll)
        .with_width(3)
}

impl GridConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum distributed column width (builder pattern).
    pub fn with_min_column_width(mut self, width: usize) -> Self {
        self.min_column_width = width;
        self
    }

    /// Sets the paginator window size (builder pattern).
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Sets the fast-forward handles (builder pattern).
    pub fn with_fast_forward(mut self, fast_forward: FastForward) -> Self {
        self.fast_forward = fast_forward;
        self
    }

    /// Sets the no-results text (builder pattern).
    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    /// Sets the loading text (builder pattern).
    pub fn with_loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    /// Sets the default placeholder text (builder pattern).
    pub fn with_unmatched_text(mut self, text: impl Into<String>) -> Self {
        self.unmatched_text = text.into();
        self
    }

    /// Sets whether field columns are editable (builder pattern).
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets whether field columns are sortable (builder pattern).
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Offers structure editing (builder pattern).
    pub fn with_structure_writable(mut self, writable: bool) -> Self {
        self.structure_writable = writable;
        self
    }

    /// Highlights the column of `field` (builder pattern).
    pub fn with_selected_field(mut self, field: impl Into<String>) -> Self {
        self.selected_field = Some(field.into());
        self
    }

    /// Sets the cell kind of field columns (builder pattern).
    pub fn with_cell_kind(mut self, kind: CellKind) -> Self {
        self.cell_kind = kind;
        self
    }

    /// Replaces the structural pre-columns (builder pattern).
    pub fn with_pre_columns(mut self, columns: Vec<Column>) -> Self {
        self.pre_columns = columns;
        self
    }

    pub(crate) fn column_defaults(&self) -> ColumnDefaults {
        ColumnDefaults {
            kind: self.cell_kind.clone(),
            editable: self.editable,
            sortable: self.sortable,
            selected_field: self.selected_field.clone(),
        }
    }
}
